/// Sentiment Classifier — one prompt per batch, tolerant decoding of whatever
/// the model sends back.
///
/// The model's output is untrusted. Decoding runs in two stages: a structural
/// parse that either produces candidate elements or nothing, then a per-field
/// coercion into the closed domains. No parse failure escapes this module;
/// degraded batches come back as neutral/General defaults instead.
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::classify::prompts::{CLASSIFY_PROMPT_TEMPLATE, CLASSIFY_SYSTEM};
use crate::llm_client::{strip_json_fences, CompletionModel, LlmError};
use crate::models::review::{Entity, NormalizedReview, Sentiment, SentimentResult};

/// Retries per batch after the initial attempt, rate-limit signals only.
pub const MAX_RETRIES: u32 = 3;
/// First retry delay; doubles on each subsequent retry (15s, 30s, 60s).
pub const BACKOFF_BASE: Duration = Duration::from_secs(15);

pub struct SentimentClassifier {
    model: Arc<dyn CompletionModel>,
}

impl SentimentClassifier {
    pub fn new(model: Arc<dyn CompletionModel>) -> Self {
        Self { model }
    }

    /// Classifies one batch, returning exactly one result per input review in
    /// input order. Infallible: every failure mode degrades to defaults.
    pub async fn classify_batch(&self, batch: &[NormalizedReview]) -> Vec<SentimentResult> {
        let prompt = build_prompt(batch);

        let raw = match self.call_with_retry(&prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    "classification call failed for batch of {}: {e}; falling back to neutral",
                    batch.len()
                );
                return batch
                    .iter()
                    .map(|r| SentimentResult::fallback(&r.id))
                    .collect();
            }
        };

        match parse_classifications(&raw) {
            Some(items) => reconcile(batch, &items),
            None => {
                warn!(
                    "unparseable classification response; falling back for batch of {}",
                    batch.len()
                );
                batch
                    .iter()
                    .map(|r| SentimentResult::fallback(&r.id))
                    .collect()
            }
        }
    }

    /// One initial attempt plus up to [`MAX_RETRIES`] retries, retrying only
    /// on rate-limit signals with a doubling delay.
    async fn call_with_retry(&self, prompt: &str) -> Result<String, LlmError> {
        let mut attempt = 0;
        loop {
            match self.model.complete(prompt, CLASSIFY_SYSTEM).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_rate_limit() && attempt < MAX_RETRIES => {
                    let delay = BACKOFF_BASE * 2u32.pow(attempt);
                    warn!(
                        "rate limited; retry {}/{} in {}s",
                        attempt + 1,
                        MAX_RETRIES,
                        delay.as_secs()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Prompt assembly
// ─────────────────────────────────────────────────────────────────────────────

fn build_prompt(batch: &[NormalizedReview]) -> String {
    let review_lines = batch
        .iter()
        .map(|r| format!("- mentionId: {} | review: {}", r.id, r.content))
        .collect::<Vec<_>>()
        .join("\n");
    CLASSIFY_PROMPT_TEMPLATE.replace("{review_lines}", &review_lines)
}

// ─────────────────────────────────────────────────────────────────────────────
// Response decoding
// ─────────────────────────────────────────────────────────────────────────────

/// One element of the model's response array, before coercion. Every field is
/// optional and loosely typed; anything stricter would turn model sloppiness
/// into batch failures.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawClassification {
    mention_id: Option<String>,
    sentiment: Option<Value>,
    score: Option<Value>,
    entity: Option<Value>,
}

/// Structural stage: fence-strip, parse, and require a top-level array.
/// `None` fails the whole batch; elements that are not objects are dropped
/// individually (their reviews get defaults during reconciliation).
fn parse_classifications(raw: &str) -> Option<Vec<RawClassification>> {
    let text = strip_json_fences(raw);
    let value: Value = serde_json::from_str(text).ok()?;
    let items = value.as_array()?;
    debug!("classification response parsed: {} elements", items.len());
    Some(
        items
            .iter()
            .filter_map(|el| serde_json::from_value(el.clone()).ok())
            .collect(),
    )
}

/// Coercion stage: exactly one result per input review, in input order. The
/// first response element with a matching `mentionId` wins; unmatched reviews
/// fall back to defaults.
fn reconcile(batch: &[NormalizedReview], items: &[RawClassification]) -> Vec<SentimentResult> {
    batch
        .iter()
        .map(|review| {
            let matched = items
                .iter()
                .find(|item| item.mention_id.as_deref() == Some(review.id.as_str()));
            match matched {
                Some(item) => SentimentResult {
                    mention_id: review.id.clone(),
                    sentiment: coerce_sentiment(item.sentiment.as_ref()),
                    score: coerce_score(item.score.as_ref()),
                    entity: coerce_entity(item.entity.as_ref()),
                },
                None => SentimentResult::fallback(&review.id),
            }
        })
        .collect()
}

fn coerce_sentiment(value: Option<&Value>) -> Sentiment {
    value
        .and_then(Value::as_str)
        .and_then(Sentiment::parse)
        .unwrap_or(Sentiment::Neutral)
}

fn coerce_entity(value: Option<&Value>) -> Entity {
    value
        .and_then(Value::as_str)
        .and_then(Entity::parse)
        .unwrap_or(Entity::General)
}

/// Accepts a JSON number or a numeric string; anything outside `[0.0, 1.0]`
/// collapses to the neutral midpoint.
fn coerce_score(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(score) if (0.0..=1.0).contains(&score) => score,
        _ => 0.5,
    }
}
