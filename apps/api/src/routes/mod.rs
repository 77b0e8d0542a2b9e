pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::ingest::handlers as ingest_handlers;
use crate::state::AppState;
use crate::store::handlers as store_handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Upload: the body is the CSV itself and may be arbitrarily large;
        // it is streamed, so the default body cap is lifted for this route.
        .route(
            "/api/v1/reviews/upload",
            post(ingest_handlers::handle_upload).layer(DefaultBodyLimit::disable()),
        )
        // Reviews
        .route(
            "/api/v1/reviews",
            get(store_handlers::handle_list_reviews).delete(store_handlers::handle_clear_all),
        )
        // Analytics
        .route(
            "/api/v1/analytics/summary",
            get(store_handlers::handle_summary),
        )
        .route(
            "/api/v1/analytics/topics",
            get(store_handlers::handle_topics),
        )
        .route(
            "/api/v1/analytics/trends",
            get(store_handlers::handle_trends),
        )
        .with_state(state)
}
