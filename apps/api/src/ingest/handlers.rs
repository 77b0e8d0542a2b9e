/// HTTP surface for CSV upload.
use axum::body::Body;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::ingest::pipeline::process_upload;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub source: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub source: String,
    pub parsed: usize,
    pub stored: u64,
}

/// POST /api/v1/reviews/upload?source=<platform>
/// The raw request body is the CSV file. It is decoded as it arrives; the
/// payload is never buffered whole.
pub async fn handle_upload(
    State(state): State<AppState>,
    Query(query): Query<UploadQuery>,
    body: Body,
) -> Result<Json<UploadResponse>, AppError> {
    let source = query.source.trim().to_string();
    if source.is_empty() {
        return Err(AppError::Validation(
            "query parameter 'source' must not be empty".to_string(),
        ));
    }

    let outcome = process_upload(
        &state.db,
        state.model.clone(),
        &source,
        body.into_data_stream(),
    )
    .await?;

    Ok(Json(UploadResponse {
        source,
        parsed: outcome.parsed,
        stored: outcome.stored,
    }))
}
