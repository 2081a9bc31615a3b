use std::fmt;

use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Which collection a missing identifier was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity { Todo, Tag }

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Entity::Todo => "Todo", Entity::Tag => "Tag" })
    }
}

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("{entity} {id} not found")]
    NotFound { entity: Entity, id: i64 },
    #[error("storage failure: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl RepoError {
    pub fn validation(message: impl Into<String>) -> Self { Self::Validation(message.into()) }

    pub fn todo_not_found(id: i64) -> Self { Self::NotFound { entity: Entity::Todo, id } }

    pub fn tag_not_found(id: i64) -> Self { Self::NotFound { entity: Entity::Tag, id } }
}
