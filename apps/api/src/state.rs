use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::Config;
use crate::llm_client::CompletionModel;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    /// The external classification model. A trait object so tests can wire in
    /// a scripted fake instead of the real client.
    pub model: Arc<dyn CompletionModel>,
    pub config: Config,
}
