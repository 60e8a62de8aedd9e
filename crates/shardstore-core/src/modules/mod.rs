//! Shard store backends, storage traits, and fencing helpers.

pub mod connect;
pub mod ownership;
pub mod repository;
pub mod shard_pg;
pub(crate) mod shard_pg_crud;
pub(crate) mod shard_pg_helpers;
pub(crate) mod shard_pg_query;
pub mod shard_sqlite;
pub(crate) mod shard_sqlite_query;
