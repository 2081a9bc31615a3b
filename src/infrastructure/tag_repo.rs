use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteConnection;

use super::links;
use super::store::{to_attrs, Collection, Store};
use super::todo_repo::SqliteTodoRepository;
use crate::domain::{
    error::{RepoError, RepoResult},
    repository::TagRepository,
    tag::{CreateTag, Tag, TagId, TagSummary, UpdateTag},
    todo::TodoSummary,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TagRecord {
    title: String,
}

#[derive(Serialize)]
struct TagPatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<&'a str>,
}

#[derive(Clone)]
pub struct SqliteTagRepository {
    store: Store,
}

impl SqliteTagRepository {
    pub fn new(store: Store) -> Self { Self { store } }

    pub(crate) async fn exists(conn: &mut SqliteConnection, id: TagId) -> RepoResult<bool> {
        Ok(load(conn, id).await?.is_some())
    }

    /// Summaries for `ids` in the given order, skipping dangling links.
    pub(crate) async fn summaries(conn: &mut SqliteConnection, ids: &[TagId]) -> RepoResult<Vec<TagSummary>> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            match load(&mut *conn, id).await? {
                Some(record) => out.push(TagSummary { id, title: record.title }),
                None => tracing::warn!(tag_id = id.0, "skipping link to missing tag"),
            }
        }
        Ok(out)
    }

    async fn resolve(conn: &mut SqliteConnection, id: TagId, record: TagRecord) -> RepoResult<Tag> {
        let todo_ids = links::find_by_tag(&mut *conn, id).await?;
        let todos = SqliteTodoRepository::summaries(conn, &todo_ids).await?;
        Ok(Tag { id, title: record.title, todos })
    }
}

async fn load(conn: &mut SqliteConnection, id: TagId) -> RepoResult<Option<TagRecord>> {
    match Collection::TAGS.get(conn, id.0).await? {
        Some(record) => Ok(Some(record.decode()?)),
        None => Ok(None),
    }
}

#[async_trait]
impl TagRepository for SqliteTagRepository {
    async fn list_all(&self) -> RepoResult<Vec<Tag>> {
        let mut conn = self.store.reader().await?;
        let records = Collection::TAGS.all(&mut conn).await?;
        let mut tags = Vec::with_capacity(records.len());
        for record in records {
            let body: TagRecord = record.decode()?;
            tags.push(Self::resolve(&mut conn, TagId(record.id), body).await?);
        }
        Ok(tags)
    }

    async fn create(&self, input: CreateTag) -> RepoResult<Tag> {
        input.validate()?;
        let attrs = to_attrs(&TagRecord { title: input.title.clone() })?;

        let mut txn = self.store.writer().await?;
        let id = TagId(Collection::TAGS.insert(txn.conn(), &attrs).await?);
        txn.commit().await?;

        tracing::debug!(tag_id = id.0, "tag created");
        Ok(Tag { id, title: input.title, todos: Vec::new() })
    }

    async fn get(&self, id: TagId) -> RepoResult<Tag> {
        let mut conn = self.store.reader().await?;
        let record = load(&mut conn, id).await?.ok_or(RepoError::tag_not_found(id.0))?;
        Self::resolve(&mut conn, id, record).await
    }

    async fn update(&self, id: TagId, input: UpdateTag) -> RepoResult<Tag> {
        input.validate()?;
        let patch = to_attrs(&TagPatch { title: input.title.as_deref() })?;

        let mut txn = self.store.writer().await?;
        if !patch.is_empty() && !Collection::TAGS.update(txn.conn(), id.0, &patch).await? {
            return Err(RepoError::tag_not_found(id.0));
        }
        let record = load(txn.conn(), id).await?.ok_or(RepoError::tag_not_found(id.0))?;
        let tag = Self::resolve(txn.conn(), id, record).await?;
        txn.commit().await?;

        tracing::debug!(tag_id = id.0, "tag updated");
        Ok(tag)
    }

    async fn delete(&self, id: TagId) -> RepoResult<()> {
        let mut txn = self.store.writer().await?;
        if !Collection::TAGS.remove(txn.conn(), id.0).await? {
            return Err(RepoError::tag_not_found(id.0));
        }
        let swept = links::unlink_by_tag(txn.conn(), id).await?;
        txn.commit().await?;

        tracing::debug!(tag_id = id.0, swept, "tag deleted");
        Ok(())
    }

    async fn delete_all(&self) -> RepoResult<()> {
        let mut txn = self.store.writer().await?;
        Collection::TAGS.truncate(txn.conn()).await?;
        links::truncate(txn.conn()).await?;
        txn.commit().await?;
        tracing::debug!("all tags deleted");
        Ok(())
    }

    async fn list_todos(&self, id: TagId) -> RepoResult<Vec<TodoSummary>> {
        let mut conn = self.store.reader().await?;
        if !Self::exists(&mut conn, id).await? {
            return Ok(Vec::new());
        }
        let todo_ids = links::find_by_tag(&mut conn, id).await?;
        SqliteTodoRepository::summaries(&mut conn, &todo_ids).await
    }
}
