// End-to-end upload flow against the real router: in-memory SQLite, scripted
// model, requests driven through tower's oneshot.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::ServiceExt;

use ulasan::config::Config;
use ulasan::db::run_migrations;
use ulasan::llm_client::{CompletionModel, LlmError};
use ulasan::routes::build_router;
use ulasan::state::AppState;

/// Returns canned responses in order; fails with `EmptyContent` if the script
/// runs out.
struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
}

impl ScriptedModel {
    fn new(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
        })
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

async fn app_with_pool(model: Arc<ScriptedModel>) -> (Router, SqlitePool) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory SQLite pool");
    run_migrations(&pool).await.expect("migrations");

    let state = AppState {
        db: pool.clone(),
        model,
        config: Config {
            database_url: "sqlite::memory:".to_string(),
            anthropic_api_key: "test-key".to_string(),
            port: 0,
            rust_log: "info".to_string(),
        },
    };
    (build_router(state), pool)
}

async fn app(model: Arc<ScriptedModel>) -> Router {
    app_with_pool(model).await.0
}

async fn upload(app: &Router, source: &str, csv: &str) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/reviews/upload?source={source}"))
        .header("content-type", "text/csv")
        .body(Body::from(csv.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn get(app: &Router, uri: &str) -> Response {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

const THREE_ROW_CSV: &str = "content,date\n\
    \"enak banget, mantap!\",2025-09-15\n\
    lelet banget pelayanannya,2025-09-16\n\
    oke standar aja,2025-09-17\n";

fn three_row_script() -> Vec<Result<String, LlmError>> {
    vec![Ok(r#"[
        {"mentionId": "csv-row-1", "sentiment": "positive", "score": 0.9, "entity": "Quality"},
        {"mentionId": "csv-row-2", "sentiment": "negative", "score": 0.2, "entity": "Service"},
        {"mentionId": "csv-row-3", "sentiment": "neutral", "score": 0.5, "entity": "General"}
    ]"#
    .to_string())]
}

#[tokio::test]
async fn upload_then_query_full_flow() {
    let app = app(ScriptedModel::new(three_row_script())).await;

    let response = upload(&app, "Google%20Review", THREE_ROW_CSV).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["source"], "Google Review");
    assert_eq!(body["parsed"], 3);
    assert_eq!(body["stored"], 3);

    let summary = body_json(get(&app, "/api/v1/analytics/summary").await).await;
    assert_eq!(summary["total"], 3);
    assert_eq!(summary["positive"], 1);
    assert_eq!(summary["neutral"], 1);
    assert_eq!(summary["negative"], 1);
    assert_eq!(summary["netSentiment"], 0.0);

    let negatives = body_json(get(&app, "/api/v1/reviews?sentiment=negative").await).await;
    let negatives = negatives.as_array().unwrap();
    assert_eq!(negatives.len(), 1);
    assert_eq!(negatives[0]["content"], "lelet banget pelayanannya");
    assert_eq!(negatives[0]["entity"], "Service");
    assert_eq!(negatives[0]["mentionId"], "csv-row-2");
    assert_eq!(negatives[0]["source"], "Google Review");

    let topics = body_json(get(&app, "/api/v1/analytics/topics").await).await;
    let topics = topics.as_array().unwrap();
    assert_eq!(topics.len(), 3);
    // One review per entity; alphabetical on the total tie.
    assert_eq!(topics[0]["entity"], "General");
    assert_eq!(topics[1]["entity"], "Quality");
    assert_eq!(topics[2]["entity"], "Service");

    let listed = body_json(get(&app, "/api/v1/reviews").await).await;
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 3);
    // Newest review date first.
    assert_eq!(listed[0]["reviewDate"], "2025-09-17");
    assert_eq!(listed[2]["reviewDate"], "2025-09-15");
}

#[tokio::test]
async fn upload_drops_rows_with_empty_content() {
    let script = vec![Ok(r#"[
        {"mentionId": "csv-row-1", "sentiment": "positive", "score": 0.8, "entity": "Quality"},
        {"mentionId": "csv-row-3", "sentiment": "negative", "score": 0.3, "entity": "Price"}
    ]"#
    .to_string())];
    let app = app(ScriptedModel::new(script)).await;

    let csv = "content,date\nenak,2025-09-15\n,2025-09-16\nmahal,2025-09-17\n";
    let body = body_json(upload(&app, "IG", csv).await).await;
    assert_eq!(body["parsed"], 2);
    assert_eq!(body["stored"], 2);

    let listed = body_json(get(&app, "/api/v1/reviews").await).await;
    let mention_ids: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["mentionId"].as_str().unwrap())
        .collect();
    // The dropped second row keeps its ordinal unused.
    assert_eq!(mention_ids, vec!["csv-row-3", "csv-row-1"]);
}

#[tokio::test]
async fn classification_outage_degrades_to_neutral_but_upload_succeeds() {
    let script = vec![Err(LlmError::Api {
        status: 500,
        message: "upstream down".to_string(),
    })];
    let app = app(ScriptedModel::new(script)).await;

    let response = upload(&app, "Google%20Review", THREE_ROW_CSV).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["stored"], 3);

    let listed = body_json(get(&app, "/api/v1/reviews").await).await;
    for row in listed.as_array().unwrap() {
        assert_eq!(row["sentiment"], "neutral");
        assert_eq!(row["entity"], "General");
        assert_eq!(row["score"], 0.5);
    }
}

#[tokio::test]
async fn malformed_csv_aborts_without_persisting_anything() {
    let app = app(ScriptedModel::new(three_row_script())).await;

    let csv = "content,date\nenak,2025-09-15\nbroken,row,with,extras\n";
    let response = upload(&app, "Google%20Review", csv).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "CSV_PARSE_ERROR");

    let summary = body_json(get(&app, "/api/v1/analytics/summary").await).await;
    assert_eq!(summary["total"], 0);
}

#[tokio::test]
async fn storage_outage_fails_the_upload_with_a_server_error() {
    let (app, pool) = app_with_pool(ScriptedModel::new(three_row_script())).await;
    pool.close().await;

    // The CSV still parses and classification still runs; the failure
    // surfaces when the writer cannot reach the store.
    let response = upload(&app, "Google%20Review", THREE_ROW_CSV).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");

    let summary = get(&app, "/api/v1/analytics/summary").await;
    assert_eq!(summary.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(summary).await;
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
}

#[tokio::test]
async fn clear_all_resets_the_store_and_the_id_sequence() {
    let mut script = three_row_script();
    script.extend(three_row_script());
    let app = app(ScriptedModel::new(script)).await;

    upload(&app, "Google%20Review", THREE_ROW_CSV).await;

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/v1/reviews")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["deleted"], 3);

    let summary = body_json(get(&app, "/api/v1/analytics/summary").await).await;
    assert_eq!(summary["total"], 0);

    // Ids start from 1 again after the reset.
    upload(&app, "Google%20Review", THREE_ROW_CSV).await;
    let listed = body_json(get(&app, "/api/v1/reviews").await).await;
    let mut ids: Vec<i64> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn upload_requires_a_source_label() {
    let app = app(ScriptedModel::new(vec![])).await;

    let missing = upload(&app, "", "content\nenak\n").await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    let body = body_json(missing).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/reviews/upload")
        .body(Body::from("content\nenak\n"))
        .unwrap();
    let no_param = app.clone().oneshot(request).await.unwrap();
    assert_eq!(no_param.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_sentiment_filter_is_rejected() {
    let app = app(ScriptedModel::new(vec![])).await;
    let response = get(&app, "/api/v1/reviews?sentiment=angry").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = app(ScriptedModel::new(vec![])).await;
    let response = get(&app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "ulasan-api");
}
