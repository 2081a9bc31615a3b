use serde::{Deserialize, Serialize};

use super::error::{RepoError, RepoResult};
use super::tag::TagSummary;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TodoId(pub i64);

/// A todo with its tags resolved through the link table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub order: i64,
    pub tags: Vec<TagSummary>,
}

/// The shape a todo takes when embedded in a tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TodoSummary {
    pub id: TodoId,
    pub title: String,
    pub completed: bool,
    pub order: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTodo {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub order: i64,
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), completed: false, order: 0 }
    }

    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    pub fn validate(&self) -> RepoResult<()> { require_title(&self.title) }
}

/// Partial replacement: only the `Some` fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTodo {
    pub title: Option<String>,
    pub completed: Option<bool>,
    pub order: Option<i64>,
}

impl UpdateTodo {
    pub fn validate(&self) -> RepoResult<()> {
        match &self.title {
            Some(title) => require_title(title),
            None => Ok(()),
        }
    }
}

pub(crate) fn require_title(title: &str) -> RepoResult<()> {
    if title.is_empty() {
        return Err(RepoError::validation("'title' must be a str with at least one char"));
    }
    Ok(())
}
