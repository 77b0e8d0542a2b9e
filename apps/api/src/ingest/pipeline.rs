/// Upload pipeline — runs one CSV upload end to end: stream, classify, store.
use std::sync::Arc;

use bytes::Bytes;
use futures::{pin_mut, Stream, StreamExt};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::classify::batcher::ClassificationBatcher;
use crate::classify::classifier::SentimentClassifier;
use crate::errors::AppError;
use crate::ingest::stream::review_stream;
use crate::llm_client::CompletionModel;
use crate::store::writer;

#[derive(Debug)]
pub struct UploadOutcome {
    /// Reviews that survived normalization.
    pub parsed: usize,
    /// Rows actually written.
    pub stored: u64,
}

/// A parse error anywhere in the stream aborts the upload before any
/// classification or persistence runs. Classification failures never abort:
/// they degrade to neutral defaults and the upload still succeeds.
pub async fn process_upload<S, E>(
    db: &SqlitePool,
    model: Arc<dyn CompletionModel>,
    source: &str,
    body: S,
) -> Result<UploadOutcome, AppError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: std::fmt::Display,
{
    let upload_id = Uuid::new_v4();
    info!("Upload {upload_id}: ingesting CSV for source '{source}'");

    let stream = review_stream(body, source.to_string());
    pin_mut!(stream);
    let mut reviews = Vec::new();
    while let Some(item) = stream.next().await {
        reviews.push(item?);
    }
    info!("Upload {upload_id}: parsed {} reviews", reviews.len());

    if reviews.is_empty() {
        return Ok(UploadOutcome {
            parsed: 0,
            stored: 0,
        });
    }

    let batcher = ClassificationBatcher::new(SentimentClassifier::new(model));
    let results = batcher.run(&reviews).await;

    let pairs: Vec<_> = reviews.into_iter().zip(results).collect();
    let parsed = pairs.len();
    let stored = writer::insert_upload(db, &pairs).await?;
    info!("Upload {upload_id}: stored {stored}/{parsed} rows");

    Ok(UploadOutcome { parsed, stored })
}
