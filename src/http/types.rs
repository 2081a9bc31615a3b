use axum::extract::{rejection::JsonRejection, FromRequest};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::urls::UrlBuilder;
use crate::domain::{
    error::RepoError,
    tag::{Tag, TagSummary},
    todo::{Todo, TodoSummary},
};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody { pub error: String }

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self { status: StatusCode::BAD_REQUEST, message: message.into() }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, axum::Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Validation(message) => Self::bad_request(message),
            RepoError::NotFound { entity, .. } => {
                Self { status: StatusCode::NOT_FOUND, message: format!("{entity} not found") }
            }
            RepoError::Storage(source) => {
                tracing::error!(error = %source, "storage failure");
                Self { status: StatusCode::INTERNAL_SERVER_ERROR, message: "storage failure".into() }
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self { status: rejection.status(), message: rejection.body_text() }
    }
}

/// A JSON request body whose rejections render as [`ApiError`].
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

pub fn parse_id(s: &str) -> Result<i64, ApiError> {
    s.parse::<i64>().map_err(|_| ApiError::bad_request("invalid id"))
}

/// Field access on a decoded request body.
pub struct Fields<'a>(&'a Map<String, Value>);

impl<'a> Fields<'a> {
    pub fn of(body: &'a Value) -> Result<Self, ApiError> {
        body.as_object().map(Fields).ok_or_else(|| ApiError::bad_request("body must be a JSON object"))
    }

    pub fn required_title(&self) -> Result<String, ApiError> {
        self.optional_title()?.ok_or_else(|| ApiError::bad_request("'title' is a required field"))
    }

    pub fn optional_title(&self) -> Result<Option<String>, ApiError> {
        match self.0.get("title") {
            None => Ok(None),
            Some(Value::String(title)) if !title.is_empty() => Ok(Some(title.clone())),
            Some(_) => Err(ApiError::bad_request("'title' must be a str with at least one char")),
        }
    }

    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>, ApiError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(ApiError::bad_request(format!("'{name}' must be a bool"))),
        }
    }

    pub fn optional_int(&self, name: &str) -> Result<Option<i64>, ApiError> {
        match self.0.get(name) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .map(Some)
                .ok_or_else(|| ApiError::bad_request(format!("'{name}' must be an int"))),
        }
    }

    pub fn required_int(&self, name: &str) -> Result<i64, ApiError> {
        self.optional_int(name)?
            .ok_or_else(|| ApiError::bad_request(format!("'{name}' is a required field")))
    }

    /// An integer id, also accepted as a string of digits (`"3"`).
    pub fn required_id(&self, name: &str) -> Result<i64, ApiError> {
        match self.0.get(name) {
            Some(Value::String(s)) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
                s.parse().map_err(|_| ApiError::bad_request(format!("'{name}' must be an int")))
            }
            _ => self.required_int(name),
        }
    }
}

pub fn todo_json(t: &Todo, urls: &UrlBuilder) -> Value {
    json!({
        "id": t.id,
        "title": t.title,
        "completed": t.completed,
        "order": t.order,
        "tags": t.tags,
        "url": urls.todo(t.id),
    })
}

pub fn todo_summary_json(t: &TodoSummary, urls: &UrlBuilder) -> Value {
    json!({ "id": t.id, "title": t.title, "completed": t.completed, "order": t.order, "url": urls.todo(t.id) })
}

pub fn tag_json(t: &Tag, urls: &UrlBuilder) -> Value {
    json!({ "id": t.id, "title": t.title, "todos": t.todos, "url": urls.tag(t.id) })
}

pub fn tag_summary_json(t: &TagSummary, urls: &UrlBuilder) -> Value {
    json!({ "id": t.id, "title": t.title, "url": urls.tag(t.id) })
}
