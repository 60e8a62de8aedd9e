//! SQLite implementation of the shard store.
//!
//! SQLite has no row locks. Every `ShardTransaction` is opened with
//! `BEGIN IMMEDIATE` on its own connection, which takes the database write
//! lock before the first statement; concurrent transactions queue on the busy
//! handler. Lock-selects inside a transaction are therefore serialized at
//! database granularity, a superset of the row-level guarantee.

use crate::modules::repository::{RepoResult, RepositoryError, ShardStore, ShardTransaction};
use crate::modules::shard_sqlite_query as query;
use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::Connection;
use shardstore_types::{RangeId, ShardId, ShardRecord};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

type SharedConnection = Arc<Mutex<Connection>>;

/// SQLite-backed shard store over a single database file.
pub struct SqliteShardStore {
    path: PathBuf,
    busy_timeout: Duration,
    /// Connection for autocommit operations.
    conn: SharedConnection,
}

impl SqliteShardStore {
    /// Open (or create) the database file, switch it to WAL, ensure the schema.
    pub async fn open(path: impl Into<PathBuf>, busy_timeout: Duration) -> RepoResult<Self> {
        let path = path.into();
        let open_path = path.clone();
        let conn = spawn_blocking(move || {
            let conn = open_connection(&open_path, busy_timeout)?;
            let _mode: String =
                conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
            query::init_schema(&conn)?;
            Ok(conn)
        })
        .await?;

        tracing::info!(path = %path.display(), "sqlite shard store opened");
        Ok(Self { path, busy_timeout, conn: Arc::new(Mutex::new(conn)) })
    }
}

#[async_trait]
impl ShardStore for SqliteShardStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn insert_shard(&self, record: &ShardRecord) -> RepoResult<u64> {
        let record = record.clone();
        with_connection(&self.conn, move |conn| query::insert_shard(conn, &record)).await
    }

    async fn update_shard(&self, record: &ShardRecord) -> RepoResult<u64> {
        let record = record.clone();
        with_connection(&self.conn, move |conn| query::update_shard(conn, &record)).await
    }

    async fn select_shard(&self, shard_id: ShardId) -> RepoResult<ShardRecord> {
        with_connection(&self.conn, move |conn| query::select_shard(conn, shard_id)).await
    }

    async fn read_lock_shard(&self, shard_id: ShardId) -> RepoResult<RangeId> {
        with_connection(&self.conn, move |conn| query::select_range_id(conn, shard_id)).await
    }

    async fn write_lock_shard(&self, shard_id: ShardId) -> RepoResult<RangeId> {
        with_connection(&self.conn, move |conn| query::select_range_id(conn, shard_id)).await
    }

    async fn begin(&self) -> RepoResult<Box<dyn ShardTransaction>> {
        let path = self.path.clone();
        let busy_timeout = self.busy_timeout;
        let conn = spawn_blocking(move || {
            let conn = open_connection(&path, busy_timeout)?;
            conn.execute_batch("BEGIN IMMEDIATE")?;
            Ok(conn)
        })
        .await?;
        Ok(Box::new(SqliteShardTransaction { conn: Arc::new(Mutex::new(conn)) }))
    }
}

/// Transaction owning a dedicated connection. Closing the connection
/// without `COMMIT` makes SQLite roll the transaction back.
pub struct SqliteShardTransaction {
    conn: SharedConnection,
}

#[async_trait]
impl ShardTransaction for SqliteShardTransaction {
    async fn insert_shard(&mut self, record: &ShardRecord) -> RepoResult<u64> {
        let record = record.clone();
        with_connection(&self.conn, move |conn| query::insert_shard(conn, &record)).await
    }

    async fn update_shard(&mut self, record: &ShardRecord) -> RepoResult<u64> {
        let record = record.clone();
        with_connection(&self.conn, move |conn| query::update_shard(conn, &record)).await
    }

    async fn select_shard(&mut self, shard_id: ShardId) -> RepoResult<ShardRecord> {
        with_connection(&self.conn, move |conn| query::select_shard(conn, shard_id)).await
    }

    // The write lock is already held since BEGIN IMMEDIATE.
    async fn read_lock_shard(&mut self, shard_id: ShardId) -> RepoResult<RangeId> {
        with_connection(&self.conn, move |conn| query::select_range_id(conn, shard_id)).await
    }

    async fn write_lock_shard(&mut self, shard_id: ShardId) -> RepoResult<RangeId> {
        with_connection(&self.conn, move |conn| query::select_range_id(conn, shard_id)).await
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        with_connection(&self.conn, |conn| Ok(conn.execute_batch("COMMIT")?)).await
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        with_connection(&self.conn, |conn| Ok(conn.execute_batch("ROLLBACK")?)).await
    }
}

fn open_connection(path: &Path, busy_timeout: Duration) -> RepoResult<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(busy_timeout)?;
    Ok(conn)
}

/// Run `f` against the shared connection on tokio's blocking pool.
async fn with_connection<T, F>(conn: &SharedConnection, f: F) -> RepoResult<T>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> RepoResult<T> + Send + 'static,
{
    let conn = Arc::clone(conn);
    spawn_blocking(move || {
        let guard = conn.lock();
        f(&*guard)
    })
    .await
}

async fn spawn_blocking<T, F>(f: F) -> RepoResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> RepoResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|err| RepositoryError::Task(err.to_string()))?
}
