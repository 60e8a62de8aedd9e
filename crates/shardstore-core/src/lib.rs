//! # Shard Store Core
//!
//! Durable shard ownership records with range-token fencing.
//!
//! ## Architecture
//!
//! ```text
//! shardstore-core/src/modules/
//! ├── repository.rs          # ShardStore / ShardTransaction traits, RepositoryError
//! ├── shard_pg*.rs           # PostgreSQL backend (FOR SHARE / FOR UPDATE row locks)
//! ├── shard_sqlite*.rs       # SQLite backend (BEGIN IMMEDIATE, database-level lock)
//! ├── ownership.rs           # lock, compare range id, write, commit
//! └── connect.rs             # StoreConfig -> Arc<dyn ShardStore>
//! ```
//!
//! The store never enforces range monotonicity itself. Callers that need
//! fencing either use the helpers in [`modules::ownership`] or run the same
//! sequence on a [`ShardTransaction`].

pub mod error;
pub mod modules;

// Re-export commonly used types
pub use error::{CoreError, CoreResult};
pub use modules::connect::connect;
pub use modules::ownership::{
    assert_shard_ownership, get_or_create_shard, renew_range, update_shard_fenced,
};
pub use modules::repository::{RepoResult, RepositoryError, ShardStore, ShardTransaction};
pub use modules::shard_pg::PostgresShardStore;
pub use modules::shard_sqlite::SqliteShardStore;
pub use shardstore_types::{OwnershipError, RangeId, ShardId, ShardRecord, StoreConfig};
