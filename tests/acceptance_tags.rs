mod common;

use common::{app, call, request, BASE};
use serde_json::json;

#[tokio::test]
async fn acceptance_tag_crud() {
    let (app, _store) = app().await;

    let res = request(&app, "POST", "/tags/", Some(json!({ "title": "home" }))).await;
    assert_eq!(res.status(), 201);
    let location = res.headers().get("location").unwrap().to_str().unwrap().to_string();
    let tag = call(&app, "GET", &location.replace(BASE, ""), None, 200).await;
    let id = tag["id"].as_i64().unwrap();
    assert_eq!(tag, json!({ "id": id, "title": "home", "todos": [], "url": location }));

    let renamed = call(&app, "PATCH", &format!("/tags/{id}"), Some(json!({ "title": "house" })), 200).await;
    assert_eq!(renamed["title"], "house");
    call(&app, "PATCH", &format!("/tags/{id}"), Some(json!({ "title": "" })), 400).await;

    let list = call(&app, "GET", "/tags", None, 200).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    call(&app, "DELETE", &format!("/tags/{id}"), None, 204).await;
    let err = call(&app, "GET", &format!("/tags/{id}"), None, 404).await;
    assert_eq!(err, json!({ "error": "Tag not found" }));
    call(&app, "DELETE", &format!("/tags/{id}"), None, 404).await;
}

#[tokio::test]
async fn tag_title_is_required() {
    let (app, _store) = app().await;
    let err = call(&app, "POST", "/tags/", Some(json!({})), 400).await;
    assert_eq!(err["error"], "'title' is a required field");
    assert_eq!(call(&app, "GET", "/tags/", None, 200).await, json!([]));
}

#[tokio::test]
async fn deleting_tag_removes_it_from_todos() {
    let (app, _store) = app().await;
    let todo = call(&app, "POST", "/todos/", Some(json!({ "title": "t" })), 201).await["id"].as_i64().unwrap();
    let keep = call(&app, "POST", "/tags/", Some(json!({ "title": "keep" })), 201).await["id"].as_i64().unwrap();
    let gone = call(&app, "POST", "/tags/", Some(json!({ "title": "gone" })), 201).await["id"].as_i64().unwrap();
    for tag in [keep, gone] {
        call(&app, "POST", &format!("/todos/{todo}/tags/"), Some(json!({ "id": tag })), 204).await;
    }

    call(&app, "DELETE", &format!("/tags/{gone}"), None, 204).await;
    let tags = call(&app, "GET", &format!("/todos/{todo}"), None, 200).await["tags"].clone();
    assert_eq!(tags, json!([{ "id": keep, "title": "keep" }]));
}

#[tokio::test]
async fn tag_todos_listing() {
    let (app, _store) = app().await;
    let tag = call(&app, "POST", "/tags/", Some(json!({ "title": "g" })), 201).await["id"].as_i64().unwrap();
    let first = call(&app, "POST", "/todos/", Some(json!({ "title": "one", "order": 1 })), 201).await["id"].as_i64().unwrap();
    let second = call(&app, "POST", "/todos/", Some(json!({ "title": "two", "order": 2, "completed": true })), 201).await["id"].as_i64().unwrap();
    for todo in [second, first] {
        call(&app, "POST", &format!("/todos/{todo}/tags/"), Some(json!({ "id": tag })), 204).await;
    }

    let todos = call(&app, "GET", &format!("/tags/{tag}/todos/"), None, 200).await;
    assert_eq!(todos, json!([
        { "id": second, "title": "two", "completed": true, "order": 2, "url": format!("{BASE}/todos/{second}") },
        { "id": first, "title": "one", "completed": false, "order": 1, "url": format!("{BASE}/todos/{first}") },
    ]));

    // missing tag: empty listing, but 404 on the tag itself
    assert_eq!(call(&app, "GET", "/tags/500/todos", None, 200).await, json!([]));
    call(&app, "GET", "/tags/500", None, 404).await;
}

#[tokio::test]
async fn delete_all_tags_keeps_todos() {
    let (app, _store) = app().await;
    let todo = call(&app, "POST", "/todos/", Some(json!({ "title": "t" })), 201).await["id"].as_i64().unwrap();
    let tag = call(&app, "POST", "/tags/", Some(json!({ "title": "g" })), 201).await["id"].as_i64().unwrap();
    call(&app, "POST", &format!("/todos/{todo}/tags/"), Some(json!({ "id": tag })), 204).await;

    call(&app, "DELETE", "/tags/", None, 204).await;
    assert_eq!(call(&app, "GET", "/tags/", None, 200).await, json!([]));
    assert_eq!(call(&app, "GET", &format!("/todos/{todo}"), None, 200).await["tags"], json!([]));
}
