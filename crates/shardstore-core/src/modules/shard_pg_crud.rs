//! Shard write operations for PostgreSQL.

use crate::modules::repository::RepoResult;
use crate::modules::shard_pg_helpers::map_insert_err;
use shardstore_types::ShardRecord;
use sqlx::postgres::PgExecutor;

pub(crate) async fn insert_shard_impl<'e, E>(executor: E, record: &ShardRecord) -> RepoResult<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"INSERT INTO shards (shard_id, range_id, data, data_encoding)
           VALUES ($1, $2, $3, $4)"#,
    )
    .bind(record.shard_id)
    .bind(record.range_id)
    .bind(&record.data)
    .bind(&record.data_encoding)
    .execute(executor)
    .await
    .map_err(|err| map_insert_err(err, record.shard_id))?;

    tracing::debug!(shard_id = record.shard_id, range_id = record.range_id, "shard inserted");
    Ok(result.rows_affected())
}

pub(crate) async fn update_shard_impl<'e, E>(executor: E, record: &ShardRecord) -> RepoResult<u64>
where
    E: PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"UPDATE shards SET range_id = $2, data = $3, data_encoding = $4
           WHERE shard_id = $1"#,
    )
    .bind(record.shard_id)
    .bind(record.range_id)
    .bind(&record.data)
    .bind(&record.data_encoding)
    .execute(executor)
    .await?;

    tracing::debug!(
        shard_id = record.shard_id,
        range_id = record.range_id,
        rows_affected = result.rows_affected(),
        "shard updated"
    );
    Ok(result.rows_affected())
}
