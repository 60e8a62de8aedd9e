//! Fenced ownership operations built on the store primitives.
//!
//! Each helper runs the lock-then-compare-then-write sequence inside one
//! transaction. A caller whose range id no longer matches the durable one gets
//! `OwnershipError::OwnershipLost` and nothing is written. Errors roll the
//! transaction back; nothing here retries.

use crate::error::CoreResult;
use crate::modules::repository::{RepositoryError, ShardStore, ShardTransaction};
use shardstore_types::{OwnershipError, RangeId, ShardId, ShardRecord};
use tracing::{debug, info, warn};

/// Return the shard's record, inserting `initial` if the shard was never claimed.
///
/// When two callers race to create the same shard, the loser's insert hits
/// `Conflict` and it returns the winner's record instead.
pub async fn get_or_create_shard(
    store: &dyn ShardStore,
    initial: &ShardRecord,
) -> CoreResult<ShardRecord> {
    match store.select_shard(initial.shard_id).await {
        Ok(record) => return Ok(record),
        Err(RepositoryError::NotFound(_)) => {},
        Err(err) => return Err(err.into()),
    }

    match store.insert_shard(initial).await {
        Ok(_) => {
            info!(shard_id = initial.shard_id, range_id = initial.range_id, "shard created");
            Ok(initial.clone())
        },
        Err(RepositoryError::Conflict(shard_id)) => {
            debug!(shard_id, "shard created concurrently, reading winner");
            Ok(store.select_shard(shard_id).await?)
        },
        Err(err) => Err(err.into()),
    }
}

/// Write `record` only if the shard's durable range id is still `previous_range_id`.
pub async fn update_shard_fenced(
    store: &dyn ShardStore,
    record: &ShardRecord,
    previous_range_id: RangeId,
) -> CoreResult<()> {
    if record.range_id < previous_range_id {
        return Err(OwnershipError::RangeRegression {
            shard_id: record.shard_id,
            previous_range_id,
            range_id: record.range_id,
        }
        .into());
    }

    let mut tx = store.begin().await?;
    let result = locked_update(&mut *tx, record, previous_range_id).await;
    finish(tx, result).await
}

/// Take over (or renew) the shard lease held at `expected_range_id`.
///
/// Writes `expected_range_id + 1` with the new ownership data and returns the
/// record now durable. Any other owner still holding `expected_range_id` will
/// fail its next fenced write.
pub async fn renew_range(
    store: &dyn ShardStore,
    shard_id: ShardId,
    expected_range_id: RangeId,
    data: Vec<u8>,
    data_encoding: impl Into<String>,
) -> CoreResult<ShardRecord> {
    let mut record = ShardRecord::new(shard_id, expected_range_id, data, data_encoding);
    record.range_id = record
        .next_range_id()
        .ok_or(OwnershipError::RangeExhausted { shard_id, range_id: expected_range_id })?;

    update_shard_fenced(store, &record, expected_range_id).await?;
    info!(shard_id, range_id = record.range_id, "shard range renewed");
    Ok(record)
}

/// Check under a shared lock that `range_id` is still the shard's range id.
pub async fn assert_shard_ownership(
    store: &dyn ShardStore,
    shard_id: ShardId,
    range_id: RangeId,
) -> CoreResult<()> {
    let mut tx = store.begin().await?;
    let result = match tx.read_lock_shard(shard_id).await {
        Ok(current) => ensure_range(shard_id, range_id, current),
        Err(err) => Err(err.into()),
    };
    finish(tx, result).await
}

async fn locked_update(
    tx: &mut dyn ShardTransaction,
    record: &ShardRecord,
    previous_range_id: RangeId,
) -> CoreResult<()> {
    let current = tx.write_lock_shard(record.shard_id).await?;
    ensure_range(record.shard_id, previous_range_id, current)?;

    let affected = tx.update_shard(record).await?;
    if affected != 1 {
        return Err(OwnershipError::UnexpectedRowCount { shard_id: record.shard_id, affected }.into());
    }
    Ok(())
}

fn ensure_range(shard_id: ShardId, request_range_id: RangeId, current: RangeId) -> CoreResult<()> {
    if current == request_range_id {
        return Ok(());
    }
    warn!(shard_id, request_range_id, current_range_id = current, "shard ownership lost");
    Err(OwnershipError::OwnershipLost { shard_id, request_range_id, current_range_id: current }
        .into())
}

async fn finish<T>(tx: Box<dyn ShardTransaction>, result: CoreResult<T>) -> CoreResult<T> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        },
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "rollback after failed shard operation");
            }
            Err(err)
        },
    }
}
