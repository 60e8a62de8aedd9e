//! Shard SQL for SQLite. Every function runs on a borrowed connection; the
//! caller decides whether that connection is inside a transaction.

use crate::modules::repository::{RepoResult, RepositoryError};
use rusqlite::{ffi, params, Connection, OptionalExtension};
use shardstore_types::{RangeId, ShardId, ShardRecord};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS shards (
    shard_id      INTEGER NOT NULL,
    range_id      BIGINT  NOT NULL,
    data          BLOB    NOT NULL,
    data_encoding TEXT    NOT NULL CHECK (length(data_encoding) <= 16),
    PRIMARY KEY (shard_id)
)";

pub(crate) fn init_schema(conn: &Connection) -> RepoResult<()> {
    let _rows_affected: usize = conn.execute(SCHEMA, [])?;
    Ok(())
}

pub(crate) fn insert_shard(conn: &Connection, record: &ShardRecord) -> RepoResult<u64> {
    let rows = conn
        .execute(
            "INSERT INTO shards (shard_id, range_id, data, data_encoding)
             VALUES (?1, ?2, ?3, ?4)",
            params![record.shard_id, record.range_id, record.data, record.data_encoding],
        )
        .map_err(|err| map_insert_err(err, record.shard_id))?;
    Ok(rows as u64)
}

pub(crate) fn update_shard(conn: &Connection, record: &ShardRecord) -> RepoResult<u64> {
    let rows = conn.execute(
        "UPDATE shards SET range_id = ?2, data = ?3, data_encoding = ?4 WHERE shard_id = ?1",
        params![record.shard_id, record.range_id, record.data, record.data_encoding],
    )?;
    Ok(rows as u64)
}

pub(crate) fn select_shard(conn: &Connection, shard_id: ShardId) -> RepoResult<ShardRecord> {
    conn.query_row(
        "SELECT shard_id, range_id, data, data_encoding FROM shards WHERE shard_id = ?1",
        params![shard_id],
        |row| {
            Ok(ShardRecord {
                shard_id: row.get(0)?,
                range_id: row.get(1)?,
                data: row.get(2)?,
                data_encoding: row.get(3)?,
            })
        },
    )
    .optional()?
    .ok_or(RepositoryError::NotFound(shard_id))
}

pub(crate) fn select_range_id(conn: &Connection, shard_id: ShardId) -> RepoResult<RangeId> {
    conn.query_row("SELECT range_id FROM shards WHERE shard_id = ?1", params![shard_id], |row| {
        row.get(0)
    })
    .optional()?
    .ok_or(RepositoryError::NotFound(shard_id))
}

fn map_insert_err(err: rusqlite::Error, shard_id: ShardId) -> RepositoryError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                || failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            tracing::debug!(shard_id, error = %err, "duplicate shard insert");
            RepositoryError::Conflict(shard_id)
        },
        _ => RepositoryError::Sqlite(err),
    }
}
