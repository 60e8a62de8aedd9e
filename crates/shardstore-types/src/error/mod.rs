//! Typed error definitions shared by the store and its callers.
//!
//! Errors here are plain data: serializable so a shard controller can forward
//! them across its own RPC boundary, and matchable via enum variants.

mod config;
mod ownership;

pub use config::ConfigError;
pub use ownership::OwnershipError;
