/// HTTP surface for analytics reads and the destructive clear-all.
use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::review::{Sentiment, StoredReviewRow};
use crate::state::AppState;
use crate::store::queries::{
    self, SummaryReport, TopicReport, TrendPoint, DEFAULT_TOPIC_LIMIT, DEFAULT_TREND_MONTHS,
};

#[derive(Debug, Deserialize)]
pub struct TopicsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct TrendsQuery {
    pub months: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub sentiment: Option<String>,
}

/// GET /api/v1/analytics/summary
pub async fn handle_summary(
    State(state): State<AppState>,
) -> Result<Json<SummaryReport>, AppError> {
    Ok(Json(queries::get_summary(&state.db).await?))
}

/// GET /api/v1/analytics/topics?limit=5
pub async fn handle_topics(
    State(state): State<AppState>,
    Query(query): Query<TopicsQuery>,
) -> Result<Json<Vec<TopicReport>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOPIC_LIMIT);
    if limit < 1 {
        return Err(AppError::Validation("limit must be at least 1".to_string()));
    }
    Ok(Json(queries::get_topics(&state.db, limit).await?))
}

/// GET /api/v1/analytics/trends?months=6
pub async fn handle_trends(
    State(state): State<AppState>,
    Query(query): Query<TrendsQuery>,
) -> Result<Json<Vec<TrendPoint>>, AppError> {
    let months = query.months.unwrap_or(DEFAULT_TREND_MONTHS);
    if months == 0 {
        return Err(AppError::Validation(
            "months must be at least 1".to_string(),
        ));
    }
    Ok(Json(queries::get_trends(&state.db, months).await?))
}

/// GET /api/v1/reviews?sentiment=negative
pub async fn handle_list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<StoredReviewRow>>, AppError> {
    let filter = match &query.sentiment {
        Some(raw) => Some(Sentiment::parse(raw).ok_or_else(|| {
            AppError::Validation(format!(
                "unknown sentiment '{raw}' (expected positive, neutral or negative)"
            ))
        })?),
        None => None,
    };
    Ok(Json(queries::list_reviews(&state.db, filter).await?))
}

/// DELETE /api/v1/reviews
/// Destructive and irreversible: drops every stored review and resets ids.
pub async fn handle_clear_all(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let deleted = queries::clear_all(&state.db).await?;
    Ok(Json(json!({ "deleted": deleted })))
}
