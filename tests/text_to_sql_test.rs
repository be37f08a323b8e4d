//! Integration tests for the text-to-SQL assistant bridge.
//!
//! Spins up a stub upstream service in-process and drives the real router
//! through `POST /api/chat/text-to-sql`. No database is required: the chat
//! route never touches the pool, so a lazy pool pointed at a dead address is
//! enough to build the application state.

use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

/// Stub text-to-SQL service. Scenario is selected by the question text.
async fn stub_upstream(Json(body): Json<Value>) -> Json<Value> {
    let query = body["query"].as_str().unwrap_or_default();
    match query {
        "fail" => Json(json!({
            "success": false,
            "query": query,
            "sql": "SELECT * FROM missing_table",
            "error": "relation \"missing_table\" does not exist"
        })),
        "empty" => Json(json!({
            "success": true,
            "query": query,
            "sql": "SELECT 1 WHERE false",
            "results": [],
            "row_count": 0
        })),
        _ => Json(json!({
            "success": true,
            "query": query,
            "sql": "SELECT customer, total FROM sales LIMIT 2",
            "response": "Here are the results.",
            "results": [
                {"customer": "한빛전기", "total": 12500000},
                {"customer": "동서전력", "total": 8300000}
            ],
            "row_count": 2
        })),
    }
}

async fn start_stub_upstream() -> String {
    let app = Router::new().route("/api/text-to-sql", post(stub_upstream));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Start the real application router wired to the given upstream URL.
async fn start_app(upstream_url: &str) -> String {
    let config = sapdash::config::AppConfig {
        database_url: "postgres://nobody@127.0.0.1:1/nodb".to_string(),
        database_max_connections: 1,
        host: "127.0.0.1".to_string(),
        port: 0,
        text_to_sql_url: upstream_url.to_string(),
        text_to_sql_max_rows: 1000,
        frontend_url: "http://localhost:3001".to_string(),
    };
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy(&config.database_url)
        .unwrap();

    let state = sapdash::AppState {
        db: pool,
        http: reqwest::Client::new(),
        config,
    };
    let app = sapdash::routes::router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn event_types(body: &Value) -> Vec<&str> {
    body["events"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["type"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn successful_query_emits_sql_rowcount_content_then_finish() {
    let upstream = start_stub_upstream().await;
    let base = start_app(&upstream).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/chat/text-to-sql"))
        .json(&json!({"query": "top customers"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let types = event_types(&body);
    assert_eq!(
        types,
        vec![
            "data-sql",
            "data-rowCount",
            "data-kind",
            "data-id",
            "data-title",
            "data-content",
            "data-finish"
        ]
    );

    let events = body["events"].as_array().unwrap();
    assert_eq!(events[1]["data"], 2);
    let csv = events[5]["data"].as_str().unwrap();
    assert!(csv.starts_with("customer,total"));
    assert!(csv.contains("한빛전기"));
    assert!(events[6].as_object().unwrap().contains_key("data"));
    assert!(events[6]["data"].is_null());

    assert_eq!(body["outcome"]["success"], true);
    assert_eq!(body["outcome"]["message"], "Here are the results.");
}

#[tokio::test]
async fn empty_result_skips_the_sheet_events() {
    let upstream = start_stub_upstream().await;
    let base = start_app(&upstream).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/chat/text-to-sql"))
        .json(&json!({"query": "empty"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(event_types(&body), vec!["data-sql", "data-rowCount"]);
    assert_eq!(body["outcome"]["success"], true);
}

#[tokio::test]
async fn non_success_payload_emits_exactly_one_error_event() {
    let upstream = start_stub_upstream().await;
    let base = start_app(&upstream).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/chat/text-to-sql"))
        .json(&json!({"query": "fail"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(event_types(&body), vec!["data-error"]);
    assert_eq!(body["outcome"]["success"], false);

    // The user-facing message carries the attempted SQL for diagnosis.
    let message = body["outcome"]["message"].as_str().unwrap();
    assert!(message.contains("SELECT * FROM missing_table"));
    assert!(message.contains("does not exist"));
}

#[tokio::test]
async fn unreachable_upstream_emits_exactly_one_error_event() {
    // Nothing is listening on this port.
    let base = start_app("http://127.0.0.1:1").await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/chat/text-to-sql"))
        .json(&json!({"query": "anything"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(event_types(&body), vec!["data-error"]);
    assert_eq!(body["outcome"]["success"], false);
}

#[tokio::test]
async fn upstream_http_error_emits_exactly_one_error_event() {
    let app = Router::new().route(
        "/api/text-to-sql",
        post(|| async {
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "internal error",
            )
        }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = start_app(&format!("http://{addr}")).await;
    let body: Value = reqwest::Client::new()
        .post(format!("{base}/api/chat/text-to-sql"))
        .json(&json!({"query": "anything"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(event_types(&body), vec!["data-error"]);
    let error = body["events"][0]["data"].as_str().unwrap();
    assert!(error.contains("500"));
}
