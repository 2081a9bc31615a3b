use serde::{Deserialize, Serialize};

use super::error::RepoResult;
use super::todo::{require_title, TodoSummary};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TagId(pub i64);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub title: String,
    pub todos: Vec<TodoSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagSummary {
    pub id: TagId,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTag {
    pub title: String,
}

impl CreateTag {
    pub fn new(title: impl Into<String>) -> Self { Self { title: title.into() } }

    pub fn validate(&self) -> RepoResult<()> { require_title(&self.title) }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTag {
    pub title: Option<String>,
}

impl UpdateTag {
    pub fn validate(&self) -> RepoResult<()> {
        match &self.title {
            Some(title) => require_title(title),
            None => Ok(()),
        }
    }
}
