//! # Shard Store Types
//!
//! Core types, configuration model, and error definitions for the shard
//! ownership store.
//!
//! - **`models`** - Shard ownership record and store configuration
//! - **`error`** - Typed fencing and configuration errors
//!
//! ## Architecture Role
//!
//! ```text
//!          shardstore-types (this crate)
//!                   │
//!                   ▼
//!           shardstore-core
//!                   │
//!                   ▼
//!           shardstore-cli
//! ```
//!
//! Nothing in this crate talks to a database. Types are serializable so that
//! controllers can ship them over their own RPC layers unchanged.

pub mod error;
pub mod models;

pub use error::{ConfigError, OwnershipError};
pub use models::{RangeId, ShardId, ShardRecord, StoreBackend, StoreConfig};
