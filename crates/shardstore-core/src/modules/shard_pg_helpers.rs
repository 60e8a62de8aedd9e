//! Helper functions for PostgreSQL shard operations.

use crate::modules::repository::{RepoResult, RepositoryError};
use shardstore_types::{ShardId, ShardRecord};
use sqlx::Row;

/// Convert a PostgreSQL row to a ShardRecord.
pub(crate) fn row_to_shard(row: &sqlx::postgres::PgRow) -> RepoResult<ShardRecord> {
    Ok(ShardRecord {
        shard_id: row.try_get("shard_id").map_err(decode_err)?,
        range_id: row.try_get("range_id").map_err(decode_err)?,
        data: row.try_get("data").map_err(decode_err)?,
        data_encoding: row.try_get("data_encoding").map_err(decode_err)?,
    })
}

/// Translate a duplicate primary key into `Conflict`; pass everything else through.
pub(crate) fn map_insert_err(err: sqlx::Error, shard_id: ShardId) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            tracing::debug!(shard_id, error = %db_err, "duplicate shard insert");
            RepositoryError::Conflict(shard_id)
        },
        _ => RepositoryError::Database(err),
    }
}

fn decode_err(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Decode(err.to_string())
}
