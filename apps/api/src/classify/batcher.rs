/// Classification Batcher — fixed-size batches dispatched strictly one after
/// another, with a cooldown between dispatches.
///
/// The external API budget is 5 batch calls per minute, shared by nothing
/// else in the process, so batches within one upload must never overlap.
/// Dispatch progress is an explicit state machine over the tokio clock, which
/// the time-paused tests drive without real waits.
use std::time::Duration;

use tokio::time::Instant;
use tracing::info;

use crate::classify::classifier::SentimentClassifier;
use crate::models::review::{NormalizedReview, SentimentResult};

/// Reviews per external call.
pub const BATCH_SIZE: usize = 15;
/// Pause between consecutive batch dispatches.
pub const BATCH_COOLDOWN: Duration = Duration::from_secs(12);

/// Dispatch progress for one upload.
enum BatchPhase {
    Dispatching(usize),
    Waiting { next: usize, until: Instant },
    Done,
}

pub struct ClassificationBatcher {
    classifier: SentimentClassifier,
}

impl ClassificationBatcher {
    pub fn new(classifier: SentimentClassifier) -> Self {
        Self { classifier }
    }

    /// Classifies a whole upload's reviews, returning one result per review
    /// in input order. Empty input completes immediately with no external
    /// calls.
    pub async fn run(&self, reviews: &[NormalizedReview]) -> Vec<SentimentResult> {
        if reviews.is_empty() {
            return Vec::new();
        }

        let batches: Vec<&[NormalizedReview]> = reviews.chunks(BATCH_SIZE).collect();
        let mut results = Vec::with_capacity(reviews.len());
        let mut phase = BatchPhase::Dispatching(0);

        loop {
            phase = match phase {
                BatchPhase::Dispatching(index) => {
                    info!(
                        "classifying batch {}/{} ({} reviews)",
                        index + 1,
                        batches.len(),
                        batches[index].len()
                    );
                    let mut batch_results = self.classifier.classify_batch(batches[index]).await;
                    results.append(&mut batch_results);

                    if index + 1 < batches.len() {
                        BatchPhase::Waiting {
                            next: index + 1,
                            until: Instant::now() + BATCH_COOLDOWN,
                        }
                    } else {
                        BatchPhase::Done
                    }
                }
                BatchPhase::Waiting { next, until } => {
                    tokio::time::sleep_until(until).await;
                    BatchPhase::Dispatching(next)
                }
                BatchPhase::Done => break,
            };
        }

        results
    }
}
