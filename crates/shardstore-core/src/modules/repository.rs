//! Shard store traits for storage abstraction.
//!
//! `ShardStore` runs each primitive on its own (autocommit). `ShardTransaction`
//! runs the same primitives inside one database transaction, which is where
//! the lock-selects actually hold their row locks until commit or rollback.

use async_trait::async_trait;
use shardstore_types::{RangeId, ShardId, ShardRecord};

pub type RepoResult<T> = Result<T, RepositoryError>;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Shard not found: {0}")]
    NotFound(ShardId),
    #[error("Shard already exists: {0}")]
    Conflict(ShardId),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Row decode error: {0}")]
    Decode(String),
    #[error("Storage task failed: {0}")]
    Task(String),
}

#[async_trait]
pub trait ShardStore: Send + Sync {
    /// Short backend label for logs.
    fn backend_name(&self) -> &'static str;

    /// Insert a new record. Fails with `Conflict` if the shard id exists.
    async fn insert_shard(&self, record: &ShardRecord) -> RepoResult<u64>;

    /// Overwrite the record for `record.shard_id`. Zero affected rows means
    /// the shard has never been inserted; that is not an error.
    async fn update_shard(&self, record: &ShardRecord) -> RepoResult<u64>;

    async fn select_shard(&self, shard_id: ShardId) -> RepoResult<ShardRecord>;

    /// Outside a transaction this is a plain read of `range_id`.
    async fn read_lock_shard(&self, shard_id: ShardId) -> RepoResult<RangeId>;

    /// Outside a transaction this is a plain read of `range_id`.
    async fn write_lock_shard(&self, shard_id: ShardId) -> RepoResult<RangeId>;

    /// Start a transaction. Dropping it without `commit` rolls it back.
    async fn begin(&self) -> RepoResult<Box<dyn ShardTransaction>>;
}

#[async_trait]
pub trait ShardTransaction: Send {
    async fn insert_shard(&mut self, record: &ShardRecord) -> RepoResult<u64>;
    async fn update_shard(&mut self, record: &ShardRecord) -> RepoResult<u64>;
    async fn select_shard(&mut self, shard_id: ShardId) -> RepoResult<ShardRecord>;

    /// Read `range_id` holding a shared lock until the transaction ends.
    async fn read_lock_shard(&mut self, shard_id: ShardId) -> RepoResult<RangeId>;

    /// Read `range_id` holding an exclusive lock until the transaction ends.
    async fn write_lock_shard(&mut self, shard_id: ShardId) -> RepoResult<RangeId>;

    async fn commit(self: Box<Self>) -> RepoResult<()>;
    async fn rollback(self: Box<Self>) -> RepoResult<()>;
}
