//! Store construction from configuration.

use crate::error::CoreResult;
use crate::modules::repository::ShardStore;
use crate::modules::shard_pg::PostgresShardStore;
use crate::modules::shard_sqlite::SqliteShardStore;
use shardstore_types::{StoreBackend, StoreConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Validate `config`, open the backend it names, and apply the schema.
///
/// PostgreSQL migrations run only when `run_migrations` is set. The SQLite
/// schema is always ensured on open.
pub async fn connect(config: &StoreConfig) -> CoreResult<Arc<dyn ShardStore>> {
    config.check()?;

    let store: Arc<dyn ShardStore> = match config.backend()? {
        StoreBackend::Postgres => {
            let store = PostgresShardStore::connect(config).await?;
            if config.run_migrations {
                store.run_migrations().await?;
            }
            Arc::new(store)
        },
        StoreBackend::Sqlite { path } => {
            let busy_timeout = Duration::from_millis(config.busy_timeout_ms);
            Arc::new(SqliteShardStore::open(path, busy_timeout).await?)
        },
    };

    info!(backend = store.backend_name(), "shard store connected");
    Ok(store)
}
