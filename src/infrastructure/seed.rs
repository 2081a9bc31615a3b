use super::store::{to_attrs, Collection, Store};
use super::todo_repo::TodoRecord;
use crate::domain::error::RepoResult;

pub const DEFAULT_TODOS: [(&str, i64); 3] = [("build an API", 1), ("?????", 2), ("profit!", 3)];

/// Inserts [`DEFAULT_TODOS`] when todos, links and tags are all empty.
/// Returns whether anything was inserted.
pub async fn populate_if_empty(store: &Store) -> RepoResult<bool> {
    let mut txn = store.writer().await?;
    for collection in Collection::ALL {
        if !collection.is_empty(txn.conn()).await? {
            tracing::debug!(collection = collection.name(), "store not empty, skipping seed");
            return Ok(false);
        }
    }
    for (title, order) in DEFAULT_TODOS {
        let attrs = to_attrs(&TodoRecord { title: title.to_string(), completed: false, order })?;
        Collection::TODOS.insert(txn.conn(), &attrs).await?;
    }
    txn.commit().await?;

    tracing::info!(count = DEFAULT_TODOS.len(), "seeded default todos");
    Ok(true)
}
