use std::str::FromStr;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use sqlx::{
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqliteConnection, SqliteJournalMode, SqlitePoolOptions, SqliteRow},
    Pool, QueryBuilder, Row, Sqlite, Transaction,
};
use thiserror::Error;
use tokio::sync::{Mutex, MutexGuard};

use crate::domain::error::RepoError;

/// Free-form attribute map persisted as a record body.
pub type Attrs = Map<String, Value>;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] sqlx::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("record attributes must be a JSON object")]
    NotAnObject,
    #[error("record {collection}/{id} is malformed: {source}")]
    Malformed {
        collection: &'static str,
        id: i64,
        #[source]
        source: serde_json::Error,
    },
}

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self { RepoError::Storage(Box::new(err)) }
}

/// Shared handle over the SQLite pool. Every mutation goes through
/// [`Store::writer`], which serializes writers process-wide.
#[derive(Clone)]
pub struct Store {
    pool: Arc<Pool<Sqlite>>,
    writer: Arc<Mutex<()>>,
}

impl Store {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let in_memory = is_in_memory(database_url);
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let (options, pool_options) = if in_memory {
            // The database lives only as long as its one connection.
            let pool_options = SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
            (options, pool_options)
        } else {
            prepare_sqlite_file(database_url)?;
            (options.journal_mode(SqliteJournalMode::Wal), SqlitePoolOptions::new().max_connections(5))
        };
        let pool = pool_options.connect_with(options).await?;
        tracing::debug!(database_url, in_memory, "store connected");
        Ok(Self { pool: Arc::new(pool), writer: Arc::new(Mutex::new(())) })
    }

    pub async fn init(&self) -> StoreResult<()> {
        for collection in Collection::ALL {
            let sql = format!(
                "CREATE TABLE IF NOT EXISTS {} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    body TEXT NOT NULL
                )",
                collection.name()
            );
            sqlx::query(&sql).execute(&*self.pool).await?;
        }
        Ok(())
    }

    pub async fn reader(&self) -> StoreResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Takes the writer lock and opens a transaction. Dropping the returned
    /// [`WriteTxn`] without committing rolls everything back.
    pub async fn writer(&self) -> StoreResult<WriteTxn<'_>> {
        let guard = self.writer.lock().await;
        let tx = self.pool.begin().await?;
        Ok(WriteTxn { tx, _guard: guard })
    }

    pub async fn close(&self) { self.pool.close().await }
}

pub struct WriteTxn<'s> {
    tx: Transaction<'static, Sqlite>,
    _guard: MutexGuard<'s, ()>,
}

impl WriteTxn<'_> {
    pub fn conn(&mut self) -> &mut SqliteConnection { &mut *self.tx }

    pub async fn commit(self) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: i64,
    pub attrs: Attrs,
    collection: &'static str,
}

impl Record {
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        serde_json::from_value(Value::Object(self.attrs.clone()))
            .map_err(|source| StoreError::Malformed { collection: self.collection, id: self.id, source })
    }
}

pub fn to_attrs<T: Serialize>(value: &T) -> StoreResult<Attrs> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

/// One identifier-keyed table of JSON bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Collection {
    name: &'static str,
}

impl Collection {
    pub const TODOS: Collection = Collection { name: "todos" };
    pub const LINKS: Collection = Collection { name: "links" };
    pub const TAGS: Collection = Collection { name: "tags" };
    pub const ALL: [Collection; 3] = [Self::TODOS, Self::LINKS, Self::TAGS];

    pub fn name(self) -> &'static str { self.name }

    pub async fn insert(self, conn: &mut SqliteConnection, attrs: &Attrs) -> StoreResult<i64> {
        let body = serde_json::to_string(attrs)?;
        let sql = format!("INSERT INTO {} (body) VALUES (?1)", self.name);
        let result = sqlx::query(&sql).bind(body).execute(&mut *conn).await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn get(self, conn: &mut SqliteConnection, id: i64) -> StoreResult<Option<Record>> {
        let sql = format!("SELECT id, body FROM {} WHERE id = ?1", self.name);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&mut *conn).await?;
        match row {
            Some(row) => Ok(Some(self.record(row)?)),
            None => Ok(None),
        }
    }

    pub async fn all(self, conn: &mut SqliteConnection) -> StoreResult<Vec<Record>> {
        let sql = format!("SELECT id, body FROM {} ORDER BY id", self.name);
        let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
        rows.into_iter().map(|row| self.record(row)).collect()
    }

    /// Overwrites only the supplied keys. Returns false if `id` is absent.
    pub async fn update(self, conn: &mut SqliteConnection, id: i64, attrs: &Attrs) -> StoreResult<bool> {
        let Some(mut record) = self.get(&mut *conn, id).await? else { return Ok(false) };
        record.attrs.extend(attrs.iter().map(|(k, v)| (k.clone(), v.clone())));
        let body = serde_json::to_string(&record.attrs)?;
        let sql = format!("UPDATE {} SET body = ?2 WHERE id = ?1", self.name);
        sqlx::query(&sql).bind(id).bind(body).execute(&mut *conn).await?;
        Ok(true)
    }

    pub async fn remove(self, conn: &mut SqliteConnection, id: i64) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", self.name);
        let result = sqlx::query(&sql).bind(id).execute(&mut *conn).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_many(self, conn: &mut SqliteConnection, ids: &[i64]) -> StoreResult<u64> {
        if ids.is_empty() { return Ok(0); }
        let mut builder = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {} WHERE id IN (", self.name));
        let mut separated = builder.separated(", ");
        for id in ids { separated.push_bind(*id); }
        separated.push_unseparated(")");
        let result = builder.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    /// Row ids keep counting after a truncate; identifiers are never reused.
    pub async fn truncate(self, conn: &mut SqliteConnection) -> StoreResult<()> {
        let sql = format!("DELETE FROM {}", self.name);
        sqlx::query(&sql).execute(&mut *conn).await?;
        Ok(())
    }

    pub async fn count(self, conn: &mut SqliteConnection) -> StoreResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.name);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&mut *conn).await?;
        Ok(count)
    }

    pub async fn is_empty(self, conn: &mut SqliteConnection) -> StoreResult<bool> {
        Ok(self.count(conn).await? == 0)
    }

    /// Records whose integer fields equal every `(field, value)` pair, in id order.
    pub async fn find_where(self, conn: &mut SqliteConnection, filters: &[(&str, i64)]) -> StoreResult<Vec<Record>> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("SELECT id, body FROM {} WHERE 1 = 1", self.name));
        push_filters(&mut builder, filters);
        builder.push(" ORDER BY id");
        let rows = builder.build().fetch_all(&mut *conn).await?;
        rows.into_iter().map(|row| self.record(row)).collect()
    }

    pub async fn remove_where(self, conn: &mut SqliteConnection, filters: &[(&str, i64)]) -> StoreResult<u64> {
        let mut builder = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {} WHERE 1 = 1", self.name));
        push_filters(&mut builder, filters);
        let result = builder.build().execute(&mut *conn).await?;
        Ok(result.rows_affected())
    }

    fn record(self, row: SqliteRow) -> StoreResult<Record> {
        let id: i64 = row.try_get("id")?;
        let body: String = row.try_get("body")?;
        let attrs = serde_json::from_str(&body)
            .map_err(|source| StoreError::Malformed { collection: self.name, id, source })?;
        Ok(Record { id, attrs, collection: self.name })
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &[(&str, i64)]) {
    for (field, value) in filters {
        builder
            .push(" AND json_extract(body, ")
            .push_bind(format!("$.{field}"))
            .push(") = ")
            .push_bind(*value);
    }
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

fn prepare_sqlite_file(database_url: &str) -> std::io::Result<()> {
    let Some(path) = database_url.strip_prefix("sqlite://").or_else(|| database_url.strip_prefix("sqlite:")) else {
        return Ok(());
    };
    let path = path.split('?').next().unwrap_or(path);
    // On Windows, absolute paths may look like /C:/path; strip the leading slash
    let path = if cfg!(windows) && path.len() >= 3 && path.as_bytes()[0] == b'/' && path.as_bytes()[2] == b':' {
        &path[1..]
    } else {
        path
    };
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() { std::fs::create_dir_all(parent)?; }
    }
    Ok(())
}
