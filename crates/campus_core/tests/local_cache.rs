use campus_core::db::{open_db, open_db_in_memory};
use campus_core::repo::cache_repo::CacheError;
use campus_core::{LocalCache, SqliteLocalCache};
use rusqlite::Connection;

#[test]
fn sqlite_cache_overwrites_and_removes() {
    let mut cache = SqliteLocalCache::try_new(open_db_in_memory().unwrap()).unwrap();

    assert!(cache.get("CampusKing_v6.0_u1").unwrap().is_none());
    cache.set("CampusKing_v6.0_u1", "{\"v\":1}").unwrap();
    cache.set("CampusKing_v6.0_u1", "{\"v\":2}").unwrap();
    assert_eq!(
        cache.get("CampusKing_v6.0_u1").unwrap().as_deref(),
        Some("{\"v\":2}")
    );
    let info = cache.entry_info("CampusKing_v6.0_u1").unwrap().unwrap();
    assert_eq!(info.bytes, 7);
    assert!(info.updated_at > 0);

    cache.remove("CampusKing_v6.0_u1").unwrap();
    cache.remove("CampusKing_v6.0_u1").unwrap();
    assert!(cache.get("CampusKing_v6.0_u1").unwrap().is_none());
    assert!(cache.entry_info("CampusKing_v6.0_u1").unwrap().is_none());
}

#[test]
fn sqlite_cache_records_value_size_in_bytes() {
    let mut cache = SqliteLocalCache::try_new(open_db_in_memory().unwrap()).unwrap();
    cache.set("k", "學期").unwrap();

    assert_eq!(cache.entry_info("k").unwrap().unwrap().bytes, 6);
}

#[test]
fn sqlite_cache_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    let mut cache = SqliteLocalCache::try_new(open_db(&path).unwrap()).unwrap();
    cache.set("k", "persisted").unwrap();
    drop(cache);

    let cache = SqliteLocalCache::try_new(open_db(&path).unwrap()).unwrap();
    assert_eq!(cache.get("k").unwrap().as_deref(), Some("persisted"));
}

#[test]
fn unmigrated_connection_is_rejected() {
    let err = SqliteLocalCache::try_new(Connection::open_in_memory().unwrap())
        .err()
        .unwrap();
    assert!(matches!(err, CacheError::MissingRequiredTable("cache_entries")));
}
