//! Local key-value cache contracts and implementations.
//!
//! # Responsibility
//! - Provide the synchronous `get/set/remove` cache the gateway writes
//!   through on every save.
//! - Keep SQL details inside the cache boundary.
//!
//! # Invariants
//! - `set` replaces any previous value under the same key.
//! - `remove` of a missing key is not an error.
//! - Values are opaque strings; the cache never inspects them.

use crate::db::DbError;
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use thiserror::Error;

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("cache connection is missing required table `{0}`")]
    MissingRequiredTable(&'static str),
}

impl From<rusqlite::Error> for CacheError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous string key-value cache, one entry per user.
pub trait LocalCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> CacheResult<()>;
    fn remove(&mut self, key: &str) -> CacheResult<()>;
}

/// Metadata of one SQLite cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheEntryInfo {
    /// UTF-8 length of the stored value.
    pub bytes: i64,
    /// Last write time in epoch milliseconds.
    pub updated_at: i64,
}

/// SQLite-backed cache over the `cache_entries` table.
pub struct SqliteLocalCache {
    conn: Connection,
}

impl SqliteLocalCache {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when migrations have not been applied.
    pub fn try_new(conn: Connection) -> CacheResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'cache_entries'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(CacheError::MissingRequiredTable("cache_entries"));
        }
        Ok(Self { conn })
    }

    /// Stored size and last write time of `key`, without reading the value.
    pub fn entry_info(&self, key: &str) -> CacheResult<Option<CacheEntryInfo>> {
        let info = self
            .conn
            .query_row(
                "SELECT value_bytes, updated_at FROM cache_entries WHERE key = ?1;",
                [key],
                |row| {
                    Ok(CacheEntryInfo {
                        bytes: row.get(0)?,
                        updated_at: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(info)
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl LocalCache for SqliteLocalCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1;",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> CacheResult<()> {
        self.conn.execute(
            "INSERT INTO cache_entries (key, value, value_bytes, updated_at)
             VALUES (?1, ?2, ?3, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                value_bytes = excluded.value_bytes,
                updated_at = excluded.updated_at;",
            params![key, value, value.len() as i64],
        )?;
        debug!(
            "event=cache_set module=cache status=ok backend=sqlite bytes={}",
            value.len()
        );
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CacheResult<()> {
        self.conn
            .execute("DELETE FROM cache_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

/// In-process cache for ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryLocalCache {
    entries: BTreeMap<String, String>,
}

impl MemoryLocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LocalCache for MemoryLocalCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> CacheResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Cache key of one user: `namespace` immediately followed by the uid.
pub fn cache_key(namespace: &str, uid: &str) -> String {
    format!("{namespace}{uid}")
}

#[cfg(test)]
mod tests {
    use super::{cache_key, LocalCache, MemoryLocalCache};

    #[test]
    fn cache_key_concatenates_namespace_and_uid() {
        assert_eq!(cache_key("CampusKing_v6.0_", "abc"), "CampusKing_v6.0_abc");
    }

    #[test]
    fn memory_cache_overwrites_and_removes() {
        let mut cache = MemoryLocalCache::new();
        cache.set("k", "one").unwrap();
        cache.set("k", "two").unwrap();
        assert_eq!(cache.get("k").unwrap().as_deref(), Some("two"));
        assert_eq!(cache.len(), 1);

        cache.remove("k").unwrap();
        cache.remove("k").unwrap();
        assert!(cache.get("k").unwrap().is_none());
        assert!(cache.is_empty());
    }
}
