use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Closed sentiment domain. Anything else the model emits is coerced to `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }

    /// Tolerant parse of a model-supplied label. `None` means "not in the domain";
    /// the caller decides the default.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "positive" => Some(Sentiment::Positive),
            "neutral" => Some(Sentiment::Neutral),
            "negative" => Some(Sentiment::Negative),
            _ => None,
        }
    }
}

/// Topic/aspect taxonomy for a review. Fixed set; invalid or missing labels
/// coerce to `General`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Entity {
    Quality,
    Service,
    Price,
    Ambiance,
    Location,
    General,
}

impl Entity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Entity::Quality => "Quality",
            Entity::Service => "Service",
            Entity::Price => "Price",
            Entity::Ambiance => "Ambiance",
            Entity::Location => "Location",
            Entity::General => "General",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "quality" => Some(Entity::Quality),
            "service" => Some(Entity::Service),
            "price" => Some(Entity::Price),
            "ambiance" => Some(Entity::Ambiance),
            "location" => Some(Entity::Location),
            "general" => Some(Entity::General),
            _ => None,
        }
    }
}

/// One review extracted from a CSV row, ready for classification.
///
/// `id` is `csv-row-<n>` where `n` is the 1-based position of the row within
/// the upload — unique per upload only, not across uploads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReview {
    pub id: String,
    pub content: String,
    /// Always `YYYY-MM-DD`.
    pub date: String,
    /// Platform label for the whole upload (one per upload, not per row).
    pub source: String,
}

/// Classification verdict for one review. The classifier guarantees exactly
/// one of these per submitted review, with every field already coerced into
/// its closed domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub mention_id: String,
    pub sentiment: Sentiment,
    /// In `[0.0, 1.0]`; 0.5 is the neutral midpoint and the fallback value.
    pub score: f64,
    pub entity: Entity,
}

impl SentimentResult {
    /// The neutral/General fallback used whenever the external model fails or
    /// omits a review from its response.
    pub fn fallback(mention_id: &str) -> Self {
        Self {
            mention_id: mention_id.to_string(),
            sentiment: Sentiment::Neutral,
            score: 0.5,
            entity: Entity::General,
        }
    }
}

/// A persisted review as read back from the `reviews` table.
/// Serialized in camelCase for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StoredReviewRow {
    pub id: i64,
    pub mention_id: String,
    pub content: String,
    pub review_date: String,
    pub source: String,
    pub sentiment: String,
    pub score: f64,
    pub entity: String,
    pub uploaded_at: DateTime<Utc>,
}
