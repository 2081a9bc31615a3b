#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::Router;
use tagged_todos::http::{routes::{self, AppState}, routing, urls::UrlBuilder};
use tagged_todos::infrastructure::{store::Store, tag_repo::SqliteTagRepository, todo_repo::SqliteTodoRepository};

pub const BASE: &str = "http://test.local";

pub async fn app() -> (Router, Store) {
    // use in-memory sqlite for tests
    let store = Store::connect("sqlite::memory:").await.unwrap();
    store.init().await.unwrap();
    let state = AppState {
        todos: SqliteTodoRepository::new(store.clone()),
        tags: SqliteTagRepository::new(store.clone()),
        urls: UrlBuilder::new(BASE),
    };
    (routing::app(routes::api(state)), store)
}

pub async fn request(app: &Router, method: &str, path: &str, body: Option<serde_json::Value>) -> hyper::Response<Body> {
    use axum::http::{Request, Method};
    use tower::ServiceExt;

    let req = Request::builder().method(Method::from_bytes(method.as_bytes()).unwrap()).uri(path);
    let req = match body {
        Some(json) => req.header("content-type", "application/json").body(Body::from(json.to_string())).unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(req).await.unwrap()
}

pub async fn read_json(res: hyper::Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&to_bytes(res.into_body(), 1024 * 1024).await.unwrap()).unwrap()
}

/// Sends the request, asserts the status and returns the decoded body (Null when empty).
pub async fn call(app: &Router, method: &str, path: &str, body: Option<serde_json::Value>, status: u16) -> serde_json::Value {
    let res = request(app, method, path, body).await;
    assert_eq!(res.status(), status, "{method} {path}");
    let bytes = to_bytes(res.into_body(), 1024 * 1024).await.unwrap();
    if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() }
}

/// Sends a prebuilt request, for cases that need custom headers or a raw body.
pub async fn send(app: &Router, req: axum::http::Request<Body>) -> hyper::Response<Body> {
    use tower::ServiceExt;
    app.clone().oneshot(req).await.unwrap()
}
