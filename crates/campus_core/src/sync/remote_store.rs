//! Remote document store contract and in-process implementation.
//!
//! # Responsibility
//! - Define the per-user document `get / set(merge) / delete` contract.
//! - Provide `InMemoryRemoteStore` for offline hosts and tests.
//!
//! # Invariants
//! - A merge write replaces the top-level fields it carries and keeps every
//!   other stored field.
//! - The store, never the client, assigns the commit timestamp.

use chrono::Utc;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

pub type RemoteResult<T> = Result<T, RemoteError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Network or service outage; safe to retry on the next save.
    #[error("remote store unavailable: {0}")]
    Unavailable(String),
    /// The store refused the request (permissions, quota, invalid path).
    #[error("remote store rejected request: {0}")]
    Rejected(String),
}

/// Address of one document: `collection/id`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentRef {
    pub collection: String,
    pub id: String,
}

impl DocumentRef {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl Display for DocumentRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// One merge write.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteWrite {
    /// Top-level fields to store.
    pub fields: Map<String, Value>,
    /// Field the store fills with its commit time, in epoch milliseconds.
    pub server_timestamp_field: Option<String>,
}

/// Document store keyed by `DocumentRef`.
///
/// Implementations must be shareable; the gateway holds them behind `Arc`.
pub trait RemoteStore: Send + Sync {
    fn get(&self, doc: &DocumentRef) -> RemoteResult<Option<Map<String, Value>>>;
    fn set_merge(&self, doc: &DocumentRef, write: RemoteWrite) -> RemoteResult<()>;
    fn delete(&self, doc: &DocumentRef) -> RemoteResult<()>;
}

#[derive(Debug)]
struct MemoryState {
    documents: BTreeMap<DocumentRef, Map<String, Value>>,
    available: bool,
    writes: usize,
    last_commit_ms: i64,
}

/// Thread-safe in-process document store with an outage switch.
#[derive(Debug)]
pub struct InMemoryRemoteStore {
    state: Mutex<MemoryState>,
}

impl Default for InMemoryRemoteStore {
    fn default() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                documents: BTreeMap::new(),
                available: true,
                writes: 0,
                last_commit_ms: 0,
            }),
        }
    }
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates an outage (`false`) or recovery (`true`).
    pub fn set_available(&self, available: bool) {
        self.lock().available = available;
    }

    /// Number of successful merge writes so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Reads a stored document regardless of availability.
    pub fn document(&self, doc: &DocumentRef) -> Option<Map<String, Value>> {
        self.lock().documents.get(doc).cloned()
    }

    /// Stores a document as-is, bypassing merge and timestamp rules.
    pub fn insert_document(&self, doc: DocumentRef, fields: Map<String, Value>) {
        self.lock().documents.insert(doc, fields);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteStore for InMemoryRemoteStore {
    fn get(&self, doc: &DocumentRef) -> RemoteResult<Option<Map<String, Value>>> {
        let state = self.lock();
        if !state.available {
            return Err(RemoteError::Unavailable("store offline".to_string()));
        }
        Ok(state.documents.get(doc).cloned())
    }

    fn set_merge(&self, doc: &DocumentRef, write: RemoteWrite) -> RemoteResult<()> {
        let mut state = self.lock();
        if !state.available {
            return Err(RemoteError::Unavailable("store offline".to_string()));
        }

        let commit_ms = Utc::now().timestamp_millis().max(state.last_commit_ms + 1);
        state.last_commit_ms = commit_ms;
        state.writes += 1;

        let stored = state.documents.entry(doc.clone()).or_default();
        for (field, value) in write.fields {
            stored.insert(field, value);
        }
        if let Some(field) = write.server_timestamp_field {
            stored.insert(field, Value::from(commit_ms));
        }
        Ok(())
    }

    fn delete(&self, doc: &DocumentRef) -> RemoteResult<()> {
        let mut state = self.lock();
        if !state.available {
            return Err(RemoteError::Unavailable("store offline".to_string()));
        }
        state.documents.remove(doc);
        Ok(())
    }
}
