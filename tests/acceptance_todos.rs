mod common;

use axum::body::Body;
use axum::http::Request;
use common::{app, call, read_json, request, send, BASE};
use serde_json::json;
use tagged_todos::infrastructure::seed;

#[tokio::test]
async fn acceptance_create_list_get_update_delete() {
    let (app, _store) = app().await;

    // create
    let res = request(&app, "POST", "/todos/", Some(json!({ "title": "Test", "order": 2 }))).await;
    assert_eq!(res.status(), 201);
    let location = res.headers().get("location").unwrap().to_str().unwrap().to_string();
    let body = read_json(res).await;
    let id = body["id"].as_i64().unwrap();
    assert_eq!(location, format!("{BASE}/todos/{id}"));
    assert_eq!(body, json!({ "id": id, "title": "Test", "completed": false, "order": 2, "tags": [], "url": location }));

    // list
    let list = call(&app, "GET", "/todos/", None, 200).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["url"], location);

    // get
    let got = call(&app, "GET", &format!("/todos/{id}"), None, 200).await;
    assert_eq!(got["title"], "Test");

    // update
    let updated = call(&app, "PATCH", &format!("/todos/{id}"), Some(json!({ "completed": true })), 200).await;
    assert_eq!(updated["completed"], true);
    assert_eq!(updated["title"], "Test");
    assert_eq!(updated["order"], 2);

    // delete
    call(&app, "DELETE", &format!("/todos/{id}"), None, 204).await;

    // get 404
    let err = call(&app, "GET", &format!("/todos/{id}"), None, 404).await;
    assert_eq!(err, json!({ "error": "Todo not found" }));
    call(&app, "DELETE", &format!("/todos/{id}"), None, 404).await;
    call(&app, "PATCH", &format!("/todos/{id}"), Some(json!({ "title": "x" })), 404).await;
}

#[tokio::test]
async fn routes_work_without_trailing_slash() {
    let (app, _store) = app().await;
    call(&app, "POST", "/todos", Some(json!({ "title": "a" })), 201).await;
    assert_eq!(call(&app, "GET", "/todos", None, 200).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn title_is_validated() {
    let (app, _store) = app().await;
    let err = call(&app, "POST", "/todos/", Some(json!({ "order": 1 })), 400).await;
    assert_eq!(err["error"], "'title' is a required field");
    let err = call(&app, "POST", "/todos/", Some(json!({ "title": "" })), 400).await;
    assert_eq!(err["error"], "'title' must be a str with at least one char");
    call(&app, "POST", "/todos/", Some(json!({ "title": 5 })), 400).await;
    call(&app, "POST", "/todos/", Some(json!({ "title": "ok", "completed": "yes" })), 400).await;
    assert!(call(&app, "GET", "/todos/", None, 200).await.as_array().unwrap().is_empty());

    let created = call(&app, "POST", "/todos/", Some(json!({ "title": "ok" })), 201).await;
    let id = created["id"].as_i64().unwrap();
    call(&app, "PATCH", &format!("/todos/{id}"), Some(json!({ "title": "" })), 400).await;
    call(&app, "PATCH", &format!("/todos/{id}"), Some(json!({ "order": "first" })), 400).await;
    assert_eq!(call(&app, "GET", &format!("/todos/{id}"), None, 200).await["title"], "ok");
}

#[tokio::test]
async fn invalid_id_is_bad_request() {
    let (app, _store) = app().await;
    let err = call(&app, "GET", "/todos/abc", None, 400).await;
    assert_eq!(err["error"], "invalid id");
}

#[tokio::test]
async fn link_scenario() {
    let (app, _store) = app().await;
    let a = call(&app, "POST", "/todos/", Some(json!({ "title": "A", "order": 1 })), 201).await;
    let urgent = call(&app, "POST", "/tags/", Some(json!({ "title": "urgent" })), 201).await;
    let (a_id, tag_id) = (a["id"].as_i64().unwrap(), urgent["id"].as_i64().unwrap());

    call(&app, "POST", &format!("/todos/{a_id}/tags/"), Some(json!({ "id": tag_id })), 204).await;

    let todo = call(&app, "GET", &format!("/todos/{a_id}"), None, 200).await;
    assert_eq!(todo["tags"], json!([{ "id": tag_id, "title": "urgent" }]));
    let tag = call(&app, "GET", &format!("/tags/{tag_id}"), None, 200).await;
    assert_eq!(tag["todos"], json!([{ "id": a_id, "title": "A", "completed": false, "order": 1 }]));

    let tags = call(&app, "GET", &format!("/todos/{a_id}/tags/"), None, 200).await;
    assert_eq!(tags, json!([{ "id": tag_id, "title": "urgent", "url": format!("{BASE}/tags/{tag_id}") }]));

    call(&app, "DELETE", &format!("/todos/{a_id}"), None, 204).await;
    assert_eq!(call(&app, "GET", &format!("/tags/{tag_id}"), None, 200).await["todos"], json!([]));
}

#[tokio::test]
async fn linking_missing_entities_is_not_found() {
    let (app, _store) = app().await;
    let todo = call(&app, "POST", "/todos/", Some(json!({ "title": "t" })), 201).await;
    let id = todo["id"].as_i64().unwrap();
    let err = call(&app, "POST", &format!("/todos/{id}/tags/"), Some(json!({ "id": 77 })), 404).await;
    assert_eq!(err["error"], "Tag not found");
    call(&app, "POST", "/todos/999/tags/", Some(json!({ "id": 1 })), 404).await;
    call(&app, "POST", &format!("/todos/{id}/tags/"), Some(json!({})), 400).await;
    call(&app, "POST", &format!("/todos/{id}/tags/"), Some(json!({ "id": "x1" })), 400).await;
}

#[tokio::test]
async fn link_accepts_numeric_string_id() {
    let (app, _store) = app().await;
    let id = call(&app, "POST", "/todos/", Some(json!({ "title": "t" })), 201).await["id"].as_i64().unwrap();
    let tag = call(&app, "POST", "/tags/", Some(json!({ "title": "g" })), 201).await["id"].as_i64().unwrap();

    call(&app, "POST", &format!("/todos/{id}/tags/"), Some(json!({ "id": tag.to_string() })), 204).await;
    let tags = call(&app, "GET", &format!("/todos/{id}"), None, 200).await["tags"].clone();
    assert_eq!(tags, json!([{ "id": tag, "title": "g" }]));
}

#[tokio::test]
async fn tag_listing_of_missing_todo_is_empty() {
    let (app, _store) = app().await;
    call(&app, "GET", "/todos/41", None, 404).await;
    assert_eq!(call(&app, "GET", "/todos/41/tags/", None, 200).await, json!([]));
}

#[tokio::test]
async fn unlinking_tags() {
    let (app, _store) = app().await;
    let id = call(&app, "POST", "/todos/", Some(json!({ "title": "t" })), 201).await["id"].as_i64().unwrap();
    let a = call(&app, "POST", "/tags/", Some(json!({ "title": "a" })), 201).await["id"].as_i64().unwrap();
    let b = call(&app, "POST", "/tags/", Some(json!({ "title": "b" })), 201).await["id"].as_i64().unwrap();
    for tag in [a, b, a] {
        call(&app, "POST", &format!("/todos/{id}/tags/"), Some(json!({ "id": tag })), 204).await;
    }
    assert_eq!(call(&app, "GET", &format!("/todos/{id}/tags/"), None, 200).await.as_array().unwrap().len(), 2);

    call(&app, "DELETE", &format!("/todos/{id}/tags/{a}"), None, 204).await;
    let tags = call(&app, "GET", &format!("/todos/{id}/tags/"), None, 200).await;
    assert_eq!(tags[0]["id"], b);
    assert_eq!(tags.as_array().unwrap().len(), 1);

    call(&app, "DELETE", &format!("/todos/{id}/tags/"), None, 204).await;
    assert_eq!(call(&app, "GET", &format!("/todos/{id}/tags/"), None, 200).await, json!([]));
    assert_eq!(call(&app, "GET", "/tags/", None, 200).await.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn delete_all_todos_clears_links() {
    let (app, _store) = app().await;
    let id = call(&app, "POST", "/todos/", Some(json!({ "title": "t" })), 201).await["id"].as_i64().unwrap();
    let tag = call(&app, "POST", "/tags/", Some(json!({ "title": "g" })), 201).await["id"].as_i64().unwrap();
    call(&app, "POST", &format!("/todos/{id}/tags/"), Some(json!({ "id": tag })), 204).await;

    call(&app, "DELETE", "/todos/", None, 204).await;
    assert_eq!(call(&app, "GET", "/todos/", None, 200).await, json!([]));
    let tags = call(&app, "GET", "/tags/", None, 200).await;
    assert_eq!(tags[0]["title"], "g");
    assert_eq!(tags[0]["todos"], json!([]));
    assert_eq!(call(&app, "GET", &format!("/tags/{tag}/todos/"), None, 200).await, json!([]));
}

#[tokio::test]
async fn seeded_store_serves_default_todos() {
    let (app, store) = app().await;
    assert!(seed::populate_if_empty(&store).await.unwrap());
    let todos = call(&app, "GET", "/todos/", None, 200).await;
    let titles: Vec<_> = todos.as_array().unwrap().iter().map(|t| t["title"].as_str().unwrap().to_string()).collect();
    assert_eq!(titles, vec!["build an API", "?????", "profit!"]);
    assert!(!seed::populate_if_empty(&store).await.unwrap());
}

#[tokio::test]
async fn health() {
    let (app, _store) = app().await;
    let res = request(&app, "GET", "/health", None).await;
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn malformed_json_body_is_bad_request() {
    let (app, _store) = app().await;
    let req = Request::builder()
        .method("POST")
        .uri("/todos/")
        .header("content-type", "application/json")
        .body(Body::from("{"))
        .unwrap();
    let res = send(&app, req).await;
    assert_eq!(res.status(), 400);
    assert!(read_json(res).await["error"].is_string());

    let req = Request::builder().method("POST").uri("/tags/").body(Body::from("{}")).unwrap();
    let res = send(&app, req).await;
    assert_eq!(res.status(), 415);
    assert!(read_json(res).await["error"].is_string());
    assert!(call(&app, "GET", "/todos/", None, 200).await.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn cors_preflight_and_simple_requests() {
    let (app, _store) = app().await;
    let req = Request::builder()
        .method("OPTIONS")
        .uri("/todos/")
        .header("origin", "http://example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    let res = send(&app, req).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("access-control-allow-origin").unwrap(), "*");
    assert!(res.headers().contains_key("access-control-allow-methods"));

    let req = Request::builder()
        .method("GET")
        .uri("/tags/")
        .header("origin", "http://example.com")
        .body(Body::empty())
        .unwrap();
    let res = send(&app, req).await;
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers().get("access-control-allow-origin").unwrap(), "*");
}
