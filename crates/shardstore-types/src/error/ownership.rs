//! Fencing failures raised by the ownership helpers.

use crate::models::{RangeId, ShardId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors detected while checking or advancing a shard's range token.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "details")]
pub enum OwnershipError {
    /// The durable range id no longer matches the caller's token
    #[error(
        "Shard {shard_id} ownership lost: request range {request_range_id}, current range {current_range_id}"
    )]
    OwnershipLost {
        /// Shard whose lease moved
        shard_id: ShardId,
        /// Range id the caller believed it held
        request_range_id: RangeId,
        /// Range id found under lock
        current_range_id: RangeId,
    },

    /// Caller tried to write a range id below the one it holds
    #[error("Shard {shard_id} range regression: {range_id} < {previous_range_id}")]
    RangeRegression {
        /// Target shard
        shard_id: ShardId,
        /// Range id the caller holds
        previous_range_id: RangeId,
        /// Range id the caller tried to write
        range_id: RangeId,
    },

    /// No successor exists for the current range id
    #[error("Shard {shard_id} range id exhausted at {range_id}")]
    RangeExhausted {
        /// Target shard
        shard_id: ShardId,
        /// Range id that cannot be incremented
        range_id: RangeId,
    },

    /// A locked update touched an unexpected number of rows
    #[error("Shard {shard_id} update affected {affected} rows, expected 1")]
    UnexpectedRowCount {
        /// Target shard
        shard_id: ShardId,
        /// Reported affected-row count
        affected: u64,
    },
}

impl OwnershipError {
    /// True when another owner advanced the range token.
    pub const fn is_ownership_lost(&self) -> bool {
        matches!(self, Self::OwnershipLost { .. })
    }
}
