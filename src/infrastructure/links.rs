//! The todo <-> tag relation, stored as `{todo, tag}` records in the `links`
//! collection. Results come back in link insertion order.

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteConnection;

use super::store::{to_attrs, Collection, StoreResult};
use crate::domain::{tag::TagId, todo::TodoId};

const TODO: &str = "todo";
const TAG: &str = "tag";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
struct LinkRecord {
    todo: i64,
    tag: i64,
}

/// Unconditional insert; callers that want one link per pair check [`contains`] first.
pub async fn link(conn: &mut SqliteConnection, todo: TodoId, tag: TagId) -> StoreResult<()> {
    let attrs = to_attrs(&LinkRecord { todo: todo.0, tag: tag.0 })?;
    Collection::LINKS.insert(conn, &attrs).await?;
    Ok(())
}

pub async fn unlink_by_todo(conn: &mut SqliteConnection, todo: TodoId) -> StoreResult<u64> {
    Collection::LINKS.remove_where(conn, &[(TODO, todo.0)]).await
}

pub async fn unlink_by_tag(conn: &mut SqliteConnection, tag: TagId) -> StoreResult<u64> {
    Collection::LINKS.remove_where(conn, &[(TAG, tag.0)]).await
}

/// Removes every record for the pair, duplicates included.
pub async fn unlink_pair(conn: &mut SqliteConnection, todo: TodoId, tag: TagId) -> StoreResult<u64> {
    Collection::LINKS.remove_where(conn, &[(TODO, todo.0), (TAG, tag.0)]).await
}

pub async fn contains(conn: &mut SqliteConnection, todo: TodoId, tag: TagId) -> StoreResult<bool> {
    let found = Collection::LINKS.find_where(conn, &[(TODO, todo.0), (TAG, tag.0)]).await?;
    Ok(!found.is_empty())
}

pub async fn find_by_todo(conn: &mut SqliteConnection, todo: TodoId) -> StoreResult<Vec<TagId>> {
    let records = Collection::LINKS.find_where(conn, &[(TODO, todo.0)]).await?;
    records
        .iter()
        .map(|record| record.decode::<LinkRecord>().map(|link| TagId(link.tag)))
        .collect()
}

pub async fn find_by_tag(conn: &mut SqliteConnection, tag: TagId) -> StoreResult<Vec<TodoId>> {
    let records = Collection::LINKS.find_where(conn, &[(TAG, tag.0)]).await?;
    records
        .iter()
        .map(|record| record.decode::<LinkRecord>().map(|link| TodoId(link.todo)))
        .collect()
}

pub async fn truncate(conn: &mut SqliteConnection) -> StoreResult<()> {
    Collection::LINKS.truncate(conn).await
}
