use axum::{extract::{Path, State}, routing::{delete, get}, Json, Router};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::Value;

use super::AppState;
use crate::domain::{
    repository::{TagRepository, TodoRepository},
    tag::TagId,
    todo::{CreateTodo, TodoId, UpdateTodo},
};
use crate::http::types::{parse_id, tag_summary_json, todo_json, ApiError, Fields, JsonBody};

pub fn router<T, G>(state: AppState<T, G>) -> Router
where
    T: TodoRepository + Clone,
    G: TagRepository + Clone,
{
    let collection = get(list_todos::<T, G>).post(create_todo::<T, G>).delete(delete_todos::<T, G>);
    let tags = get(list_tags::<T, G>).post(add_tag::<T, G>).delete(remove_all_tags::<T, G>);
    Router::new()
        .route("/todos", collection.clone())
        .route("/todos/", collection)
        .route("/todos/:id", get(get_todo::<T, G>).patch(update_todo::<T, G>).delete(delete_todo::<T, G>))
        .route("/todos/:id/tags", tags.clone())
        .route("/todos/:id/tags/", tags)
        .route("/todos/:id/tags/:tag_id", delete(remove_tag::<T, G>))
        .with_state(state)
}

async fn list_todos<T: TodoRepository, G>(State(state): State<AppState<T, G>>) -> Result<Json<Value>, ApiError> {
    let todos = state.todos.list_all().await?;
    Ok(Json(todos.iter().map(|t| todo_json(t, &state.urls)).collect()))
}

async fn create_todo<T: TodoRepository, G>(State(state): State<AppState<T, G>>, JsonBody(body): JsonBody<Value>) -> Result<impl IntoResponse, ApiError> {
    let fields = Fields::of(&body)?;
    let input = CreateTodo {
        title: fields.required_title()?,
        completed: fields.optional_bool("completed")?.unwrap_or(false),
        order: fields.optional_int("order")?.unwrap_or(0),
    };
    let todo = state.todos.create(input).await?;
    let location = state.urls.todo(todo.id);
    Ok((StatusCode::CREATED, [(::http::header::LOCATION, location)], Json(todo_json(&todo, &state.urls))))
}

async fn delete_todos<T: TodoRepository, G>(State(state): State<AppState<T, G>>) -> Result<StatusCode, ApiError> {
    state.todos.delete_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_todo<T: TodoRepository, G>(State(state): State<AppState<T, G>>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = TodoId(parse_id(&id)?);
    let todo = state.todos.get(id).await?;
    Ok(Json(todo_json(&todo, &state.urls)))
}

async fn update_todo<T: TodoRepository, G>(State(state): State<AppState<T, G>>, Path(id): Path<String>, JsonBody(body): JsonBody<Value>) -> Result<Json<Value>, ApiError> {
    let id = TodoId(parse_id(&id)?);
    let fields = Fields::of(&body)?;
    let input = UpdateTodo {
        title: fields.optional_title()?,
        completed: fields.optional_bool("completed")?,
        order: fields.optional_int("order")?,
    };
    let todo = state.todos.update(id, input).await?;
    Ok(Json(todo_json(&todo, &state.urls)))
}

async fn delete_todo<T: TodoRepository, G>(State(state): State<AppState<T, G>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = TodoId(parse_id(&id)?);
    state.todos.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_tags<T: TodoRepository, G>(State(state): State<AppState<T, G>>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let id = TodoId(parse_id(&id)?);
    let tags = state.todos.list_tags(id).await?;
    Ok(Json(tags.iter().map(|t| tag_summary_json(t, &state.urls)).collect()))
}

async fn add_tag<T: TodoRepository, G>(State(state): State<AppState<T, G>>, Path(id): Path<String>, JsonBody(body): JsonBody<Value>) -> Result<StatusCode, ApiError> {
    let id = TodoId(parse_id(&id)?);
    let tag = TagId(Fields::of(&body)?.required_id("id")?);
    state.todos.add_tag(id, tag).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_all_tags<T: TodoRepository, G>(State(state): State<AppState<T, G>>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = TodoId(parse_id(&id)?);
    state.todos.remove_all_tags(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn remove_tag<T: TodoRepository, G>(State(state): State<AppState<T, G>>, Path((id, tag_id)): Path<(String, String)>) -> Result<StatusCode, ApiError> {
    let id = TodoId(parse_id(&id)?);
    let tag = TagId(parse_id(&tag_id)?);
    state.todos.remove_tag(id, tag).await?;
    Ok(StatusCode::NO_CONTENT)
}
