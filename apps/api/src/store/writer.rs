/// Persistence Writer — bulk insert of one upload's classified reviews.
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

use crate::models::review::{NormalizedReview, SentimentResult};

const INSERT_SQL: &str = "INSERT INTO reviews \
    (mention_id, content, review_date, source, sentiment, score, entity, uploaded_at) \
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)";

/// Inserts all pairs inside one transaction and returns how many rows made
/// it in. A failed insert aborts only its own statement, never the
/// transaction: the row is logged and skipped and the rest still commits.
/// Accepted tradeoff: an upload can land partially when individual rows are
/// rejected, and readers see the committed subset.
pub async fn insert_upload(
    pool: &SqlitePool,
    pairs: &[(NormalizedReview, SentimentResult)],
) -> Result<u64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let uploaded_at = Utc::now();
    let mut stored = 0u64;

    for (review, result) in pairs {
        let outcome = sqlx::query(INSERT_SQL)
            .bind(&result.mention_id)
            .bind(&review.content)
            .bind(&review.date)
            .bind(&review.source)
            .bind(result.sentiment.as_str())
            .bind(result.score)
            .bind(result.entity.as_str())
            .bind(uploaded_at)
            .execute(&mut *tx)
            .await;

        match outcome {
            Ok(_) => stored += 1,
            Err(e) => warn!("skipping review {}: {e}", review.id),
        }
    }

    tx.commit().await?;
    Ok(stored)
}
