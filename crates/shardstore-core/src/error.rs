//! Unified error type for the shard store core.

use crate::modules::repository::RepositoryError;
use serde::Serialize;
use shardstore_types::{ConfigError, OwnershipError};
use thiserror::Error;

/// Main error type for store construction and fenced operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CoreError {
    /// Storage primitive failed (not found, conflict, engine fault).
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Fencing check rejected the operation.
    #[error("Ownership error: {0}")]
    Ownership(#[from] OwnershipError),

    /// Configuration loading or validation failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CoreError {
    /// Shard has no record.
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Repository(RepositoryError::NotFound(_)))
    }

    /// Insert hit an existing shard id.
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Repository(RepositoryError::Conflict(_)))
    }

    /// Another owner advanced the range token.
    pub const fn is_ownership_lost(&self) -> bool {
        matches!(self, Self::Ownership(OwnershipError::OwnershipLost { .. }))
    }
}

impl Serialize for CoreError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_str())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
