use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

const CREATE_REVIEWS: &str = "\
    CREATE TABLE IF NOT EXISTS reviews ( \
        id INTEGER PRIMARY KEY AUTOINCREMENT, \
        mention_id TEXT NOT NULL, \
        content TEXT NOT NULL CHECK (length(content) > 0), \
        review_date TEXT NOT NULL, \
        source TEXT NOT NULL, \
        sentiment TEXT NOT NULL CHECK (sentiment IN ('positive', 'neutral', 'negative')), \
        score REAL NOT NULL CHECK (score >= 0.0 AND score <= 1.0), \
        entity TEXT NOT NULL CHECK (entity IN ('Quality', 'Service', 'Price', 'Ambiance', 'Location', 'General')), \
        uploaded_at TEXT NOT NULL \
    )";

const CREATE_INDEXES: [&str; 2] = [
    "CREATE INDEX IF NOT EXISTS idx_reviews_review_date ON reviews (review_date)",
    "CREATE INDEX IF NOT EXISTS idx_reviews_sentiment ON reviews (sentiment)",
];

/// Creates and returns a SQLite connection pool, creating the database file
/// (and its parent directory) on first run.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to SQLite...");

    if let Some(path) = database_url.strip_prefix("sqlite://") {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating database directory {}", parent.display()))?;
            }
        }
    }

    let options = SqliteConnectOptions::from_str(database_url)
        .context("DATABASE_URL is not a valid SQLite URL")?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("connecting to SQLite")?;

    info!("SQLite connection pool established");
    Ok(pool)
}

/// Applies the schema. Every statement is idempotent, so this runs on every
/// startup and on every test pool.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_REVIEWS)
        .execute(pool)
        .await
        .context("creating reviews table")?;
    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .context("creating index")?;
    }
    info!("Database migrations applied");
    Ok(())
}

/// In-memory pool for tests. A single connection keeps every query on the
/// same in-memory database.
#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory SQLite pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}
