// Ulasan — CSV review ingestion, batched LLM sentiment classification, and
// analytics over the stored results.
//
// Exposed as a library so integration tests can build the router against an
// in-memory database and a scripted model.

pub mod classify;
pub mod config;
pub mod db;
pub mod errors;
pub mod ingest;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;
