//! PostgreSQL implementation of the shard store.

use crate::modules::repository::{RepoResult, ShardStore, ShardTransaction};
use crate::modules::shard_pg_crud::{insert_shard_impl, update_shard_impl};
use crate::modules::shard_pg_query::{
    read_lock_shard_impl, select_shard_impl, write_lock_shard_impl,
};
use async_trait::async_trait;
use shardstore_types::{RangeId, ShardId, ShardRecord, StoreConfig};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::time::Duration;

/// PostgreSQL-backed shard store.
pub struct PostgresShardStore {
    /// Database connection pool.
    pool: PgPool,
}

impl PostgresShardStore {
    /// Create store with existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to database and create store.
    pub async fn connect(config: &StoreConfig) -> RepoResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .connect(&config.database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn run_migrations(&self) -> RepoResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("shard store migrations applied");
        Ok(())
    }
}

#[async_trait]
impl ShardStore for PostgresShardStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn insert_shard(&self, record: &ShardRecord) -> RepoResult<u64> {
        insert_shard_impl(&self.pool, record).await
    }

    async fn update_shard(&self, record: &ShardRecord) -> RepoResult<u64> {
        update_shard_impl(&self.pool, record).await
    }

    async fn select_shard(&self, shard_id: ShardId) -> RepoResult<ShardRecord> {
        select_shard_impl(&self.pool, shard_id).await
    }

    async fn read_lock_shard(&self, shard_id: ShardId) -> RepoResult<RangeId> {
        read_lock_shard_impl(&self.pool, shard_id).await
    }

    async fn write_lock_shard(&self, shard_id: ShardId) -> RepoResult<RangeId> {
        write_lock_shard_impl(&self.pool, shard_id).await
    }

    async fn begin(&self) -> RepoResult<Box<dyn ShardTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PostgresShardTransaction { tx }))
    }
}

/// Open PostgreSQL transaction. sqlx rolls it back if dropped uncommitted.
pub struct PostgresShardTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ShardTransaction for PostgresShardTransaction {
    async fn insert_shard(&mut self, record: &ShardRecord) -> RepoResult<u64> {
        insert_shard_impl(&mut *self.tx, record).await
    }

    async fn update_shard(&mut self, record: &ShardRecord) -> RepoResult<u64> {
        update_shard_impl(&mut *self.tx, record).await
    }

    async fn select_shard(&mut self, shard_id: ShardId) -> RepoResult<ShardRecord> {
        select_shard_impl(&mut *self.tx, shard_id).await
    }

    async fn read_lock_shard(&mut self, shard_id: ShardId) -> RepoResult<RangeId> {
        read_lock_shard_impl(&mut *self.tx, shard_id).await
    }

    async fn write_lock_shard(&mut self, shard_id: ShardId) -> RepoResult<RangeId> {
        write_lock_shard_impl(&mut *self.tx, shard_id).await
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        let Self { tx } = *self;
        tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> RepoResult<()> {
        let Self { tx } = *self;
        tx.rollback().await?;
        Ok(())
    }
}
