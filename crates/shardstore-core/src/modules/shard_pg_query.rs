//! Shard read and lock-select operations for PostgreSQL.

use crate::modules::repository::{RepoResult, RepositoryError};
use crate::modules::shard_pg_helpers::row_to_shard;
use shardstore_types::{RangeId, ShardId, ShardRecord};
use sqlx::postgres::PgExecutor;

/// Get a shard record by ID.
pub(crate) async fn select_shard_impl<'e, E>(executor: E, shard_id: ShardId) -> RepoResult<ShardRecord>
where
    E: PgExecutor<'e>,
{
    let row = sqlx::query(
        r#"
        SELECT shard_id, range_id, data, data_encoding
        FROM shards
        WHERE shard_id = $1
        "#,
    )
    .bind(shard_id)
    .fetch_optional(executor)
    .await?
    .ok_or(RepositoryError::NotFound(shard_id))?;

    row_to_shard(&row)
}

/// `FOR SHARE`: blocks writers and `FOR UPDATE` lockers until the transaction ends.
pub(crate) async fn read_lock_shard_impl<'e, E>(executor: E, shard_id: ShardId) -> RepoResult<RangeId>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, RangeId>("SELECT range_id FROM shards WHERE shard_id = $1 FOR SHARE")
        .bind(shard_id)
        .fetch_optional(executor)
        .await?
        .ok_or(RepositoryError::NotFound(shard_id))
}

/// `FOR UPDATE`: serializes against every other locker and writer of the row.
pub(crate) async fn write_lock_shard_impl<'e, E>(
    executor: E,
    shard_id: ShardId,
) -> RepoResult<RangeId>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, RangeId>("SELECT range_id FROM shards WHERE shard_id = $1 FOR UPDATE")
        .bind(shard_id)
        .fetch_optional(executor)
        .await?
        .ok_or(RepositoryError::NotFound(shard_id))
}
