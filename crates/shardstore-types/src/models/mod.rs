//! Domain models shared by the store and its callers.

mod config;
mod shard;

pub use config::{StoreBackend, StoreConfig};
pub use shard::{RangeId, ShardId, ShardRecord};
