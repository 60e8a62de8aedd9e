//! Backend-independent shard store scenarios.
//!
//! Every scenario takes a store handle so the same assertions run against
//! SQLite and PostgreSQL. Shard ids are random so scenarios can share one
//! PostgreSQL database.

#![allow(dead_code, reason = "each test binary uses a subset of the scenarios")]

use rand::seq::SliceRandom;
use rand::Rng;
use shardstore_core::{RepositoryError, ShardRecord, ShardStore, SqliteShardStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

pub const TEST_ENCODING: &str = "random encoding";
pub const TEST_DATA: &[u8] = b"random history shard data";

pub fn random_shard_id() -> i32 {
    rand::thread_rng().gen_range(1..i32::MAX)
}

pub fn new_random_shard_row(shard_id: i32, range_id: i64) -> ShardRecord {
    let mut data = TEST_DATA.to_vec();
    data.shuffle(&mut rand::thread_rng());
    ShardRecord::new(shard_id, range_id, data, TEST_ENCODING)
}

/// SQLite store in a fresh temp directory. Keep the `TempDir` alive.
pub async fn sqlite_store() -> (TempDir, Arc<dyn ShardStore>) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = SqliteShardStore::open(dir.path().join("shards.db"), Duration::from_secs(10))
        .await
        .expect("open sqlite store");
    (dir, Arc::new(store))
}

async fn insert_one(store: &dyn ShardStore, record: &ShardRecord) {
    let rows_affected = store.insert_shard(record).await.expect("insert shard");
    assert_eq!(rows_affected, 1, "insert must affect exactly one row");
}

pub async fn insert_success(store: &dyn ShardStore) {
    let shard = new_random_shard_row(random_shard_id(), 1);
    insert_one(store, &shard).await;
}

pub async fn insert_fail_duplicate(store: &dyn ShardStore) {
    let shard_id = random_shard_id();
    insert_one(store, &new_random_shard_row(shard_id, 1)).await;

    let err = store
        .insert_shard(&new_random_shard_row(shard_id, 1))
        .await
        .expect_err("duplicate insert must fail");
    assert!(matches!(err, RepositoryError::Conflict(id) if id == shard_id), "got {err:?}");
}

pub async fn insert_select(store: &dyn ShardStore) {
    let shard = new_random_shard_row(random_shard_id(), 1);
    insert_one(store, &shard).await;

    let row = store.select_shard(shard.shard_id).await.expect("select shard");
    assert_eq!(row, shard);
}

pub async fn insert_update_success(store: &dyn ShardStore) {
    let shard_id = random_shard_id();
    insert_one(store, &new_random_shard_row(shard_id, 1)).await;

    let rows_affected =
        store.update_shard(&new_random_shard_row(shard_id, 101)).await.expect("update shard");
    assert_eq!(rows_affected, 1);
}

pub async fn update_missing_shard(store: &dyn ShardStore) {
    let shard = new_random_shard_row(random_shard_id(), 1);

    let rows_affected = store.update_shard(&shard).await.expect("update of absent shard is Ok");
    assert_eq!(rows_affected, 0);
}

pub async fn insert_update_select(store: &dyn ShardStore) {
    let shard_id = random_shard_id();
    insert_one(store, &new_random_shard_row(shard_id, 1)).await;

    let updated = new_random_shard_row(shard_id, 101);
    let rows_affected = store.update_shard(&updated).await.expect("update shard");
    assert_eq!(rows_affected, 1);

    let row = store.select_shard(shard_id).await.expect("select shard");
    assert_eq!(row, updated);
}

pub async fn select_missing_shard(store: &dyn ShardStore) {
    let shard_id = random_shard_id();

    let err = store.select_shard(shard_id).await.expect_err("select of absent shard");
    assert!(matches!(err, RepositoryError::NotFound(id) if id == shard_id), "got {err:?}");
}

/// Lock without a transaction is equivalent to a select of `range_id`.
pub async fn select_read_lock(store: &dyn ShardStore) {
    let range_id = i64::from(rand::thread_rng().gen_range(1..i32::MAX));
    let shard = new_random_shard_row(random_shard_id(), range_id);
    insert_one(store, &shard).await;

    let shard_range = store.read_lock_shard(shard.shard_id).await.expect("read lock");
    assert_eq!(shard_range, range_id);
}

/// Lock without a transaction is equivalent to a select of `range_id`.
pub async fn select_write_lock(store: &dyn ShardStore) {
    let range_id = i64::from(rand::thread_rng().gen_range(1..i32::MAX));
    let shard = new_random_shard_row(random_shard_id(), range_id);
    insert_one(store, &shard).await;

    let shard_range = store.write_lock_shard(shard.shard_id).await.expect("write lock");
    assert_eq!(shard_range, range_id);
}

pub async fn lock_missing_shard(store: &dyn ShardStore) {
    let shard_id = random_shard_id();

    assert!(matches!(store.read_lock_shard(shard_id).await, Err(RepositoryError::NotFound(_))));
    assert!(matches!(store.write_lock_shard(shard_id).await, Err(RepositoryError::NotFound(_))));

    let mut tx = store.begin().await.expect("begin");
    assert!(matches!(tx.read_lock_shard(shard_id).await, Err(RepositoryError::NotFound(_))));
    assert!(matches!(tx.write_lock_shard(shard_id).await, Err(RepositoryError::NotFound(_))));
    tx.rollback().await.expect("rollback");
}

/// Lock-selects return the latest committed range id, inside and outside a transaction.
pub async fn lock_select_follows_commits(store: &dyn ShardStore) {
    let shard_id = random_shard_id();
    insert_one(store, &new_random_shard_row(shard_id, 5)).await;

    let mut tx = store.begin().await.expect("begin");
    assert_eq!(tx.read_lock_shard(shard_id).await.expect("read lock"), 5);
    tx.commit().await.expect("commit");

    let mut tx = store.begin().await.expect("begin");
    assert_eq!(tx.write_lock_shard(shard_id).await.expect("write lock"), 5);
    let rows_affected =
        tx.update_shard(&new_random_shard_row(shard_id, 6)).await.expect("update in tx");
    assert_eq!(rows_affected, 1);
    tx.commit().await.expect("commit");

    assert_eq!(store.read_lock_shard(shard_id).await.expect("read lock"), 6);
    assert_eq!(store.write_lock_shard(shard_id).await.expect("write lock"), 6);
}

/// Uncommitted writes vanish on rollback and on drop.
pub async fn rollback_discards_update(store: &dyn ShardStore) {
    let shard_id = random_shard_id();
    let original = new_random_shard_row(shard_id, 1);
    insert_one(store, &original).await;

    let mut tx = store.begin().await.expect("begin");
    tx.write_lock_shard(shard_id).await.expect("write lock");
    tx.update_shard(&new_random_shard_row(shard_id, 2)).await.expect("update in tx");
    tx.rollback().await.expect("rollback");
    assert_eq!(store.select_shard(shard_id).await.expect("select"), original);

    let mut tx = store.begin().await.expect("begin");
    tx.update_shard(&new_random_shard_row(shard_id, 3)).await.expect("update in tx");
    drop(tx);
    assert_eq!(store.select_shard(shard_id).await.expect("select"), original);
}

/// Insert inside a transaction is visible to its own reads and durable on commit.
pub async fn insert_in_transaction(store: &dyn ShardStore) {
    let shard = new_random_shard_row(random_shard_id(), 1);

    let mut tx = store.begin().await.expect("begin");
    assert_eq!(tx.insert_shard(&shard).await.expect("insert in tx"), 1);
    assert_eq!(tx.select_shard(shard.shard_id).await.expect("select in tx"), shard);
    tx.commit().await.expect("commit");

    assert_eq!(store.select_shard(shard.shard_id).await.expect("select"), shard);
}

/// insert 7@1 "x"; update to 101 "y"; select returns the update; re-insert conflicts.
pub async fn ownership_record_lifecycle(store: &dyn ShardStore, shard_id: i32) {
    let first = ShardRecord::new(shard_id, 1, b"x".to_vec(), "json");
    insert_one(store, &first).await;

    let second = first.with_range(101, b"y".to_vec(), "json");
    assert_eq!(store.update_shard(&second).await.expect("update"), 1);

    let row = store.select_shard(shard_id).await.expect("select");
    assert_eq!(row, ShardRecord::new(shard_id, 101, b"y".to_vec(), "json"));

    let err = store.insert_shard(&first).await.expect_err("re-insert must conflict");
    assert!(matches!(err, RepositoryError::Conflict(id) if id == shard_id), "got {err:?}");
}

/// A second write-locker waits for the first transaction and then sees its commit.
pub async fn write_lock_blocks_second_locker(store: Arc<dyn ShardStore>) {
    let shard_id = random_shard_id();
    insert_one(store.as_ref(), &new_random_shard_row(shard_id, 10)).await;

    let mut first = store.begin().await.expect("begin first");
    assert_eq!(first.write_lock_shard(shard_id).await.expect("first lock"), 10);

    let contender = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let mut second = store.begin().await.expect("begin second");
            let observed = second.write_lock_shard(shard_id).await.expect("second lock");
            second.commit().await.expect("commit second");
            observed
        })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!contender.is_finished(), "second locker must wait for the first transaction");

    first.update_shard(&new_random_shard_row(shard_id, 11)).await.expect("update first");
    first.commit().await.expect("commit first");

    let observed = contender.await.expect("join contender");
    assert_eq!(observed, 11, "second locker must observe the committed range id");
}

/// A read lock held in a transaction holds off plain writes and write-lockers until it ends.
pub async fn read_lock_blocks_writer(store: Arc<dyn ShardStore>) {
    let shard_id = random_shard_id();
    insert_one(store.as_ref(), &new_random_shard_row(shard_id, 10)).await;

    let mut reader = store.begin().await.expect("begin reader");
    assert_eq!(reader.read_lock_shard(shard_id).await.expect("read lock"), 10);

    let writer = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.update_shard(&new_random_shard_row(shard_id, 11)).await })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!writer.is_finished(), "plain update must wait for the read lock");

    reader.commit().await.expect("commit reader");
    let rows_affected = writer.await.expect("join writer").expect("update after commit");
    assert_eq!(rows_affected, 1);

    let mut reader = store.begin().await.expect("begin reader");
    assert_eq!(reader.read_lock_shard(shard_id).await.expect("read lock"), 11);

    let locker = {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let mut tx = store.begin().await.expect("begin locker");
            let observed = tx.write_lock_shard(shard_id).await.expect("write lock");
            tx.commit().await.expect("commit locker");
            observed
        })
    };

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!locker.is_finished(), "write-locker must wait for the read lock");

    reader.commit().await.expect("commit reader");
    let observed = locker.await.expect("join locker");
    assert_eq!(observed, 11, "write-locker must observe the committed range id");
}

/// N raw lock-read-increment-commit sequences serialize: no increment is lost.
pub async fn serialized_increments(store: Arc<dyn ShardStore>, workers: i64) {
    let shard_id = random_shard_id();
    insert_one(store.as_ref(), &new_random_shard_row(shard_id, 1)).await;

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut tx = store.begin().await.expect("begin");
                let observed = tx.write_lock_shard(shard_id).await.expect("write lock");
                tx.update_shard(&new_random_shard_row(shard_id, observed + 1))
                    .await
                    .expect("update");
                tx.commit().await.expect("commit");
                observed
            })
        })
        .collect();

    let mut observed: Vec<i64> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("join worker"))
        .collect();
    observed.sort_unstable();

    let expected: Vec<i64> = (1..=workers).collect();
    assert_eq!(observed, expected, "every worker must observe a distinct pre-update range id");
    assert_eq!(store.read_lock_shard(shard_id).await.expect("read lock"), workers + 1);
}
