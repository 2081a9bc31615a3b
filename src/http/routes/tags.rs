use axum::{extract::{Path, State}, routing::get, Json, Router};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;

use super::AppState;
use crate::domain::{
    repository::{TagRepository, TodoRepository},
    tag::{CreateTag, TagId, UpdateTag},
};
use crate::http::types::{parse_id, tag_json, todo_summary_json, ApiError, Fields, JsonBody};

pub fn router<T, G>(state: AppState<T, G>) -> Router
where
    T: TodoRepository + Clone,
    G: TagRepository + Clone,
{
    let collection = get(list_tags::<T, G>).post(create_tag::<T, G>).delete(delete_tags::<T, G>);
    let todos = get(list_todos::<T, G>);
    Router::new()
        .route("/tags", collection.clone())
        .route("/tags/", collection)
        .route("/tags/:id", get(get_tag::<T, G>).patch(update_tag::<T, G>).delete(delete_tag::<T, G>))
        .route("/tags/:id/todos", todos.clone())
        .route("/tags/:id/todos/", todos)
        .with_state(state)
}

async fn list_tags<T, G: TagRepository>(State(state): State<AppState<T, G>>) -> Result<Json<Value>, ApiError> {
    let tags = state.tags.list_all().await?;
    Ok(Json(tags.iter().map(|t| tag_json(t, &state.urls)).collect()))
}

async fn create_tag<T, G: TagRepository>(State(state): State<AppState<T, G>>, JsonBody(body): JsonBody<Value>) -> Result<impl IntoResponse, ApiError> {
    let title = Fields::of(&body)?.required_title()?;
    let tag = state.tags.create(CreateTag { title }).await?;
    let location = state.urls.tag(tag.id);
    Ok((StatusCode::CREATED, [(::http::header::LOCATION, location)], Json(tag_json(&tag, &state.urls))))
}

async fn delete_tags<T, G: TagRepository>(State(state): State<AppState<T, G>>) -> Result<StatusCode, ApiError> {
    state.tags.delete_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_tag<T, G: TagRepository>(State(state): State<AppState<T, G>>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = TagId(parse_id(&id)?);
    let tag = state.tags.get(id).await?;
    Ok(Json(tag_json(&tag, &state.urls)))
}

async fn update_tag<T, G: TagRepository>(State(state): State<AppState<T, G>>, Path(id): Path<String>, JsonBody(body): JsonBody<Value>) -> Result<Json<Value>, ApiError> {
    let id = TagId(parse_id(&id)?);
    let title = Fields::of(&body)?.optional_title()?;
    let tag = state.tags.update(id, UpdateTag { title }).await?;
    Ok(Json(tag_json(&tag, &state.urls)))
}

async fn delete_tag<T, G: TagRepository>(State(state): State<AppState<T, G>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = TagId(parse_id(&id)?);
    state.tags.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_todos<T, G: TagRepository>(State(state): State<AppState<T, G>>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = TagId(parse_id(&id)?);
    let todos = state.tags.list_todos(id).await?;
    Ok(Json(todos.iter().map(|t| todo_summary_json(t, &state.urls)).collect()))
}
