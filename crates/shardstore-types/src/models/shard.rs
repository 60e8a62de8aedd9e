//! Shard ownership record.

use serde::{Deserialize, Serialize};

/// Identifier of a shard. Primary key of the `shards` table.
pub type ShardId = i32;

/// Fencing token. Never decreases for a given shard.
pub type RangeId = i64;

/// Durable ownership record of a single shard.
///
/// `data` is an opaque blob owned by the shard controller and `data_encoding`
/// names the codec it was written with. The store persists both verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardRecord {
    /// Shard identifier
    pub shard_id: ShardId,
    /// Current fencing token
    pub range_id: RangeId,
    /// Encoded ownership state
    pub data: Vec<u8>,
    /// Codec tag for `data`, at most 16 characters
    pub data_encoding: String,
}

impl ShardRecord {
    /// Create a new shard record.
    pub fn new(
        shard_id: ShardId,
        range_id: RangeId,
        data: impl Into<Vec<u8>>,
        data_encoding: impl Into<String>,
    ) -> Self {
        Self { shard_id, range_id, data: data.into(), data_encoding: data_encoding.into() }
    }

    /// Build the record that replaces this one at `range_id`.
    pub fn with_range(
        &self,
        range_id: RangeId,
        data: impl Into<Vec<u8>>,
        data_encoding: impl Into<String>,
    ) -> Self {
        Self::new(self.shard_id, range_id, data, data_encoding)
    }

    /// Next fencing token after this record's, or `None` on overflow.
    pub fn next_range_id(&self) -> Option<RangeId> {
        self.range_id.checked_add(1)
    }
}
