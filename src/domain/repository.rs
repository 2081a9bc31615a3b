use async_trait::async_trait;

use super::error::RepoResult;
use super::tag::{CreateTag, Tag, TagId, TagSummary, UpdateTag};
use super::todo::{CreateTodo, Todo, TodoId, TodoSummary, UpdateTodo};

#[async_trait]
pub trait TodoRepository: Send + Sync + 'static {
    async fn list_all(&self) -> RepoResult<Vec<Todo>>;
    async fn create(&self, input: CreateTodo) -> RepoResult<Todo>;
    async fn get(&self, id: TodoId) -> RepoResult<Todo>;
    async fn update(&self, id: TodoId, input: UpdateTodo) -> RepoResult<Todo>;
    async fn delete(&self, id: TodoId) -> RepoResult<()>;
    /// Truncates the todo collection and the whole link table.
    async fn delete_all(&self) -> RepoResult<()>;
    /// Empty when the todo does not exist, unlike `get`.
    async fn list_tags(&self, id: TodoId) -> RepoResult<Vec<TagSummary>>;
    async fn add_tag(&self, todo: TodoId, tag: TagId) -> RepoResult<()>;
    async fn remove_all_tags(&self, todo: TodoId) -> RepoResult<()>;
    async fn remove_tag(&self, todo: TodoId, tag: TagId) -> RepoResult<()>;
}

#[async_trait]
pub trait TagRepository: Send + Sync + 'static {
    async fn list_all(&self) -> RepoResult<Vec<Tag>>;
    async fn create(&self, input: CreateTag) -> RepoResult<Tag>;
    async fn get(&self, id: TagId) -> RepoResult<Tag>;
    async fn update(&self, id: TagId, input: UpdateTag) -> RepoResult<Tag>;
    async fn delete(&self, id: TagId) -> RepoResult<()>;
    /// Truncates the tag collection and the whole link table.
    async fn delete_all(&self) -> RepoResult<()>;
    /// Empty when the tag does not exist, unlike `get`.
    async fn list_todos(&self, id: TagId) -> RepoResult<Vec<TodoSummary>>;
}
