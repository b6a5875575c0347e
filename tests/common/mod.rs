#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    routing::post,
    Json, Router,
};
use courseforge::{completion::OpenAiClient, db::Db, router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

pub async fn create_test_db() -> Db {
    create_test_db_with_url().await.0
}

/// Fresh database file; the URL lets a test reach the tables directly.
pub async fn create_test_db_with_url() -> (Db, String) {
    use std::sync::atomic::{AtomicU32, Ordering};
    static COUNTER: AtomicU32 = AtomicU32::new(0);
    let id = COUNTER.fetch_add(1, Ordering::SeqCst);
    let path =
        std::env::temp_dir().join(format!("courseforge_test_{}_{}.db", std::process::id(), id));
    // Clean up leftover file from previous runs
    let _ = std::fs::remove_file(&path);
    let url = format!("sqlite://{}", path.display());
    let db = Db::new(&url).await.expect("failed to create test database");
    (db, url)
}

/// Client with no API key: any completion attempt fails.
pub fn unconfigured_client() -> OpenAiClient {
    OpenAiClient::new(
        "http://127.0.0.1:9".to_string(),
        String::new(),
        "test-model".to_string(),
    )
}

/// Serves `/chat/completions` on a random local port, always answering with `reply`.
pub async fn stub_completion_client(reply: &str) -> OpenAiClient {
    let body = json!({ "choices": [{ "message": { "role": "assistant", "content": reply } }] });
    let stub = Router::new().route(
        "/chat/completions",
        post(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind stub server");
    let addr = listener.local_addr().expect("stub server address");
    tokio::spawn(async move {
        axum::serve(listener, stub).await.expect("stub server");
    });

    OpenAiClient::new(
        format!("http://{addr}"),
        "test-key".to_string(),
        "test-model".to_string(),
    )
}

pub fn app_with(db: Db, client: OpenAiClient) -> Router {
    router(AppState::new(db, client))
}

pub async fn app() -> (Router, Db) {
    let db = create_test_db().await;
    (app_with(db.clone(), unconfigured_client()), db)
}

/// Sends one request and returns the status with the decoded JSON body
/// (`Value::Null` when the body is empty).
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            req = req.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };

    let resp = app
        .clone()
        .oneshot(req.body(body).expect("request build should succeed"))
        .await
        .expect("router should respond");

    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read response body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };

    (status, value)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

pub async fn create_course(app: &Router) -> i64 {
    let (status, body) = post_json(
        app,
        "/courses",
        json!({ "title": "Algebra", "description": "Fractions and friends", "author": "Ada" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().expect("course id")
}

pub async fn create_lesson(app: &Router, course_id: i64, lesson_type: &str) -> i64 {
    let (status, body) = post_json(
        app,
        &format!("/courses/{course_id}/add_lesson"),
        json!({ "title": format!("{lesson_type} lesson"), "type": lesson_type }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().expect("lesson id")
}
