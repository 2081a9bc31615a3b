use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteConnection;

use super::links;
use super::store::{to_attrs, Collection, Store};
use super::tag_repo::SqliteTagRepository;
use crate::domain::{
    error::{RepoError, RepoResult},
    repository::TodoRepository,
    tag::{TagId, TagSummary},
    todo::{CreateTodo, Todo, TodoId, TodoSummary, UpdateTodo},
};

/// Body of a row in the `todos` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct TodoRecord {
    pub title: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub order: i64,
}

impl TodoRecord {
    fn into_todo(self, id: TodoId, tags: Vec<TagSummary>) -> Todo {
        Todo { id, title: self.title, completed: self.completed, order: self.order, tags }
    }

    fn summary(self, id: TodoId) -> TodoSummary {
        TodoSummary { id, title: self.title, completed: self.completed, order: self.order }
    }
}

#[derive(Serialize)]
struct TodoPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order: Option<i64>,
}

#[derive(Clone)]
pub struct SqliteTodoRepository {
    store: Store,
}

impl SqliteTodoRepository {
    pub fn new(store: Store) -> Self { Self { store } }

    pub(crate) async fn exists(conn: &mut SqliteConnection, id: TodoId) -> RepoResult<bool> {
        Ok(load(conn, id).await?.is_some())
    }

    /// Summaries for `ids` in the given order. Ids with no todo behind them
    /// are dangling links and are skipped.
    pub(crate) async fn summaries(conn: &mut SqliteConnection, ids: &[TodoId]) -> RepoResult<Vec<TodoSummary>> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            match load(&mut *conn, id).await? {
                Some(record) => out.push(record.summary(id)),
                None => tracing::warn!(todo_id = id.0, "skipping link to missing todo"),
            }
        }
        Ok(out)
    }

    async fn resolve(conn: &mut SqliteConnection, id: TodoId, record: TodoRecord) -> RepoResult<Todo> {
        let tag_ids = links::find_by_todo(&mut *conn, id).await?;
        let tags = SqliteTagRepository::summaries(conn, &tag_ids).await?;
        Ok(record.into_todo(id, tags))
    }
}

async fn load(conn: &mut SqliteConnection, id: TodoId) -> RepoResult<Option<TodoRecord>> {
    match Collection::TODOS.get(conn, id.0).await? {
        Some(record) => Ok(Some(record.decode()?)),
        None => Ok(None),
    }
}

#[async_trait]
impl TodoRepository for SqliteTodoRepository {
    async fn list_all(&self) -> RepoResult<Vec<Todo>> {
        let mut conn = self.store.reader().await?;
        let records = Collection::TODOS.all(&mut conn).await?;
        let mut todos = Vec::with_capacity(records.len());
        for record in records {
            let body: TodoRecord = record.decode()?;
            todos.push(Self::resolve(&mut conn, TodoId(record.id), body).await?);
        }
        Ok(todos)
    }

    async fn create(&self, input: CreateTodo) -> RepoResult<Todo> {
        input.validate()?;
        let record = TodoRecord { title: input.title, completed: input.completed, order: input.order };
        let attrs = to_attrs(&record)?;

        let mut txn = self.store.writer().await?;
        let id = TodoId(Collection::TODOS.insert(txn.conn(), &attrs).await?);
        txn.commit().await?;

        tracing::debug!(todo_id = id.0, "todo created");
        Ok(record.into_todo(id, Vec::new()))
    }

    async fn get(&self, id: TodoId) -> RepoResult<Todo> {
        let mut conn = self.store.reader().await?;
        let record = load(&mut conn, id).await?.ok_or(RepoError::todo_not_found(id.0))?;
        Self::resolve(&mut conn, id, record).await
    }

    async fn update(&self, id: TodoId, input: UpdateTodo) -> RepoResult<Todo> {
        input.validate()?;
        let patch = to_attrs(&TodoPatch {
            title: input.title.as_deref(),
            completed: input.completed,
            order: input.order,
        })?;

        let mut txn = self.store.writer().await?;
        if !patch.is_empty() && !Collection::TODOS.update(txn.conn(), id.0, &patch).await? {
            return Err(RepoError::todo_not_found(id.0));
        }
        let record = load(txn.conn(), id).await?.ok_or(RepoError::todo_not_found(id.0))?;
        let todo = Self::resolve(txn.conn(), id, record).await?;
        txn.commit().await?;

        tracing::debug!(todo_id = id.0, "todo updated");
        Ok(todo)
    }

    async fn delete(&self, id: TodoId) -> RepoResult<()> {
        let mut txn = self.store.writer().await?;
        if !Collection::TODOS.remove(txn.conn(), id.0).await? {
            return Err(RepoError::todo_not_found(id.0));
        }
        let swept = links::unlink_by_todo(txn.conn(), id).await?;
        txn.commit().await?;

        tracing::debug!(todo_id = id.0, swept, "todo deleted");
        Ok(())
    }

    async fn delete_all(&self) -> RepoResult<()> {
        let mut txn = self.store.writer().await?;
        Collection::TODOS.truncate(txn.conn()).await?;
        links::truncate(txn.conn()).await?;
        txn.commit().await?;
        tracing::debug!("all todos deleted");
        Ok(())
    }

    async fn list_tags(&self, id: TodoId) -> RepoResult<Vec<TagSummary>> {
        let mut conn = self.store.reader().await?;
        if !Self::exists(&mut conn, id).await? {
            return Ok(Vec::new());
        }
        let tag_ids = links::find_by_todo(&mut conn, id).await?;
        SqliteTagRepository::summaries(&mut conn, &tag_ids).await
    }

    async fn add_tag(&self, todo: TodoId, tag: TagId) -> RepoResult<()> {
        let mut txn = self.store.writer().await?;
        if !Self::exists(txn.conn(), todo).await? {
            return Err(RepoError::todo_not_found(todo.0));
        }
        if !SqliteTagRepository::exists(txn.conn(), tag).await? {
            return Err(RepoError::tag_not_found(tag.0));
        }
        if links::contains(txn.conn(), todo, tag).await? {
            return Ok(());
        }
        links::link(txn.conn(), todo, tag).await?;
        txn.commit().await?;

        tracing::debug!(todo_id = todo.0, tag_id = tag.0, "tag linked");
        Ok(())
    }

    async fn remove_all_tags(&self, todo: TodoId) -> RepoResult<()> {
        let mut txn = self.store.writer().await?;
        let removed = links::unlink_by_todo(txn.conn(), todo).await?;
        txn.commit().await?;
        tracing::debug!(todo_id = todo.0, removed, "tags unlinked");
        Ok(())
    }

    async fn remove_tag(&self, todo: TodoId, tag: TagId) -> RepoResult<()> {
        let mut txn = self.store.writer().await?;
        let removed = links::unlink_pair(txn.conn(), todo, tag).await?;
        txn.commit().await?;
        tracing::debug!(todo_id = todo.0, tag_id = tag.0, removed, "tag unlinked");
        Ok(())
    }
}
