/// Aggregation Queries — read-side views over stored reviews.
///
/// All reads are computed directly against current durable state; nothing is
/// cached, so two reads with no write in between always agree.
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};

use crate::models::review::{Sentiment, StoredReviewRow};

pub const DEFAULT_TOPIC_LIMIT: i64 = 5;
pub const DEFAULT_TREND_MONTHS: u32 = 6;

const SUMMARY_SQL: &str = "\
    SELECT COUNT(*) AS total, \
           COALESCE(SUM(CASE WHEN sentiment = 'positive' THEN 1 ELSE 0 END), 0) AS positive, \
           COALESCE(SUM(CASE WHEN sentiment = 'neutral'  THEN 1 ELSE 0 END), 0) AS neutral, \
           COALESCE(SUM(CASE WHEN sentiment = 'negative' THEN 1 ELSE 0 END), 0) AS negative, \
           MAX(uploaded_at) AS last_upload_at \
    FROM reviews";

const TOPICS_SQL: &str = "\
    SELECT entity, \
           COUNT(*) AS total, \
           SUM(CASE WHEN sentiment = 'positive' THEN 1 ELSE 0 END) AS positive, \
           SUM(CASE WHEN sentiment = 'neutral'  THEN 1 ELSE 0 END) AS neutral, \
           SUM(CASE WHEN sentiment = 'negative' THEN 1 ELSE 0 END) AS negative \
    FROM reviews \
    GROUP BY entity \
    ORDER BY total DESC, entity ASC \
    LIMIT ?";

const TRENDS_SQL: &str = "\
    SELECT substr(review_date, 1, 7) AS month, \
           COUNT(*) AS total, \
           SUM(CASE WHEN sentiment = 'positive' THEN 1 ELSE 0 END) AS positive, \
           SUM(CASE WHEN sentiment = 'neutral'  THEN 1 ELSE 0 END) AS neutral, \
           SUM(CASE WHEN sentiment = 'negative' THEN 1 ELSE 0 END) AS negative \
    FROM reviews \
    WHERE review_date >= ? AND review_date < ? \
    GROUP BY month \
    ORDER BY month ASC";

const LIST_SQL: &str = "\
    SELECT id, mention_id, content, review_date, source, sentiment, score, entity, uploaded_at \
    FROM reviews \
    ORDER BY review_date DESC, id DESC";

const LIST_FILTERED_SQL: &str = "\
    SELECT id, mention_id, content, review_date, source, sentiment, score, entity, uploaded_at \
    FROM reviews \
    WHERE sentiment = ? \
    ORDER BY review_date DESC, id DESC";

#[derive(Debug, FromRow)]
struct SummaryRow {
    total: i64,
    positive: i64,
    neutral: i64,
    negative: i64,
    last_upload_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub total: i64,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
    /// (positive - negative) / total, as a percentage. 0 for an empty store.
    pub net_sentiment: f64,
    pub last_upload_at: Option<DateTime<Utc>>,
}

#[derive(Debug, PartialEq, Serialize, FromRow)]
pub struct TopicReport {
    pub entity: String,
    pub total: i64,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

#[derive(Debug, PartialEq, Serialize, FromRow)]
pub struct TrendPoint {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub total: i64,
    pub positive: i64,
    pub neutral: i64,
    pub negative: i64,
}

/// Sentiment counts across all stored rows plus the latest upload timestamp.
pub async fn get_summary(pool: &SqlitePool) -> Result<SummaryReport, sqlx::Error> {
    let row: SummaryRow = sqlx::query_as(SUMMARY_SQL).fetch_one(pool).await?;
    let net_sentiment = if row.total == 0 {
        0.0
    } else {
        (row.positive - row.negative) as f64 * 100.0 / row.total as f64
    };
    Ok(SummaryReport {
        total: row.total,
        positive: row.positive,
        neutral: row.neutral,
        negative: row.negative,
        net_sentiment,
        last_upload_at: row.last_upload_at,
    })
}

/// Per-entity rollup, largest topics first, alphabetical on ties.
pub async fn get_topics(pool: &SqlitePool, limit: i64) -> Result<Vec<TopicReport>, sqlx::Error> {
    sqlx::query_as(TOPICS_SQL).bind(limit).fetch_all(pool).await
}

/// Monthly rollup over a trailing window that ends at the current calendar
/// month. Months with no reviews are omitted; rows dated past the current
/// month fall outside the window.
pub async fn get_trends(
    pool: &SqlitePool,
    window_months: u32,
) -> Result<Vec<TrendPoint>, sqlx::Error> {
    let today = Utc::now().date_naive();
    let start = window_start(today, window_months);
    let end = month_after(today);
    sqlx::query_as(TRENDS_SQL)
        .bind(start.format("%Y-%m-%d").to_string())
        .bind(end.format("%Y-%m-%d").to_string())
        .fetch_all(pool)
        .await
}

/// All stored rows, newest review date first, optionally one sentiment only.
pub async fn list_reviews(
    pool: &SqlitePool,
    sentiment: Option<Sentiment>,
) -> Result<Vec<StoredReviewRow>, sqlx::Error> {
    match sentiment {
        Some(s) => {
            sqlx::query_as(LIST_FILTERED_SQL)
                .bind(s.as_str())
                .fetch_all(pool)
                .await
        }
        None => sqlx::query_as(LIST_SQL).fetch_all(pool).await,
    }
}

/// Deletes every stored review and resets the id sequence so the next insert
/// starts from 1 again. Irreversible. Returns the number of rows removed.
pub async fn clear_all(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM reviews")
        .execute(&mut *tx)
        .await?
        .rows_affected();

    // sqlite_sequence only exists once an AUTOINCREMENT insert has happened.
    let has_sequence: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'",
    )
    .fetch_one(&mut *tx)
    .await?;
    if has_sequence > 0 {
        sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'reviews'")
            .execute(&mut *tx)
            .await?;
    }

    tx.commit().await?;
    Ok(deleted)
}

/// First day of the oldest month inside a trailing window of
/// `window_months` calendar months ending at (and including) `today`'s month.
/// A window longer than the calendar clamps to the earliest supported date.
fn window_start(today: NaiveDate, window_months: u32) -> NaiveDate {
    let months_back = i64::from(window_months.saturating_sub(1));
    first_of_month(total_months(today) - months_back, NaiveDate::MIN)
}

/// First day of the month after `today`'s month; the window's exclusive upper
/// bound, so future-dated rows never produce trend buckets.
fn month_after(today: NaiveDate) -> NaiveDate {
    first_of_month(total_months(today) + 1, NaiveDate::MAX)
}

/// Months since the calendar epoch (January of year 0 is month 0).
fn total_months(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn first_of_month(total: i64, out_of_range: NaiveDate) -> NaiveDate {
    let year = total.div_euclid(12);
    let month0 = total.rem_euclid(12) as u32;
    i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month0 + 1, 1))
        .unwrap_or(out_of_range)
}
