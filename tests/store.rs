//! Versioned store tests.

mod common;

use common::store_path;
use strata::error::StrataError;
use strata::VersionedStore;

// ============================================================================
// Contract tests
// ============================================================================

#[test]
fn read_your_writes() {
    let dir = common::scratch_dir();
    let mut store = VersionedStore::open(store_path(&dir)).unwrap();

    store.set(b"k".to_vec(), b"v".to_vec()).unwrap();
    assert_eq!(store.get(b"k").unwrap(), Some(b"v".to_vec()));

    store.close().unwrap();
}

#[test]
fn absent_key_reads_as_none() {
    let dir = common::scratch_dir();
    let mut store = VersionedStore::open(store_path(&dir)).unwrap();

    assert_eq!(store.get(b"never-written").unwrap(), None);

    store.close().unwrap();
}

#[test]
fn overwrite_bumps_revision() {
    let dir = common::scratch_dir();
    let mut store = VersionedStore::open(store_path(&dir)).unwrap();
    assert_eq!(store.revision(), 0);

    store.set(b"k".to_vec(), b"a".to_vec()).unwrap();
    assert_eq!(store.revision(), 1);
    store.set(b"k".to_vec(), b"b".to_vec()).unwrap();
    assert_eq!(store.revision(), 2);

    assert_eq!(store.get(b"k").unwrap(), Some(b"b".to_vec()));
    assert_eq!(store.len(), 1);

    store.close().unwrap();
}

#[test]
fn open_creates_missing_directory() {
    let dir = common::scratch_dir();
    let nested = dir.path().join("a").join("b").join("state");

    let mut store = VersionedStore::open(&nested).unwrap();
    assert!(nested.is_dir());
    store.close().unwrap();
}

// ============================================================================
// Durability tests
// ============================================================================

#[test]
fn values_survive_reopen() {
    let dir = common::scratch_dir();
    let path = store_path(&dir);

    let mut store = VersionedStore::open(&path).unwrap();
    store.set(b"x".to_vec(), vec![10]).unwrap();
    store.set(b"y".to_vec(), vec![1, 0]).unwrap();
    store.set(b"x".to_vec(), vec![15]).unwrap();
    store.close().unwrap();

    let mut reopened = VersionedStore::open(&path).unwrap();
    assert_eq!(reopened.get(b"x").unwrap(), Some(vec![15]));
    assert_eq!(reopened.get(b"y").unwrap(), Some(vec![1, 0]));
    assert_eq!(reopened.revision(), 3);
    reopened.close().unwrap();
}

#[test]
fn iteration_is_in_key_order() {
    let dir = common::scratch_dir();
    let mut store = VersionedStore::open(store_path(&dir)).unwrap();

    store.set(b"zz".to_vec(), vec![3]).unwrap();
    store.set(b"aa".to_vec(), vec![1]).unwrap();
    store.set(b"mm".to_vec(), vec![2]).unwrap();

    let keys: Vec<&[u8]> = store.iter().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![&b"aa"[..], &b"mm"[..], &b"zz"[..]]);

    store.close().unwrap();
}

#[test]
fn snapshot_captures_index_and_revision() {
    let dir = common::scratch_dir();
    let mut store = VersionedStore::open(store_path(&dir)).unwrap();

    store.set(b"a".to_vec(), vec![1]).unwrap();
    store.set(b"b".to_vec(), vec![2]).unwrap();

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.revision, 2);
    assert_eq!(
        snapshot.records,
        vec![(b"a".to_vec(), vec![1]), (b"b".to_vec(), vec![2])]
    );

    store.close().unwrap();
}

// ============================================================================
// Locking and lifecycle tests
// ============================================================================

#[test]
fn second_opener_fails_until_close() {
    let dir = common::scratch_dir();
    let path = store_path(&dir);

    let mut first = VersionedStore::open(&path).unwrap();

    let second = VersionedStore::open(&path);
    assert!(matches!(
        second,
        Err(StrataError::StoreUnavailable { .. })
    ));

    first.close().unwrap();

    let mut third = VersionedStore::open(&path).unwrap();
    third.close().unwrap();
}

#[test]
fn dropped_handle_releases_lock() {
    let dir = common::scratch_dir();
    let path = store_path(&dir);

    {
        let _store = VersionedStore::open(&path).unwrap();
    }

    let mut reopened = VersionedStore::open(&path).unwrap();
    reopened.close().unwrap();
}

#[test]
fn operations_after_close_fail_fast() {
    let dir = common::scratch_dir();
    let mut store = VersionedStore::open(store_path(&dir)).unwrap();
    store.close().unwrap();

    assert!(!store.is_open());
    assert!(matches!(
        store.get(b"k"),
        Err(StrataError::StoreUnavailable { .. })
    ));
    assert!(matches!(
        store.set(b"k".to_vec(), vec![1]),
        Err(StrataError::StoreUnavailable { .. })
    ));
    assert!(matches!(
        store.snapshot(),
        Err(StrataError::StoreUnavailable { .. })
    ));
    assert!(matches!(
        store.close(),
        Err(StrataError::StoreUnavailable { .. })
    ));
}
