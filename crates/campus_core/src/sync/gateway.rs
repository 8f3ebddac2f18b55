//! Persistence gateway: local cache + remote document reconciliation.
//!
//! # Responsibility
//! - Load a user's document on session start: local cache first, then the
//!   remote document when online.
//! - Save the full document on every mutation: local cache synchronously,
//!   then a merge write to the remote store.
//! - Finish every load and save with a refresh pass.
//!
//! # Invariants
//! - Remote wins whenever it answers with a document. No timestamps are
//!   compared.
//! - The local cache never stores the server timestamp field.
//! - Remote failures are logged and reported, never returned as `Err`.
//! - A remote document that fails to decode is never overwritten: load
//!   leaves it alone and later saves skip the remote write until a load
//!   succeeds or `overwrite_remote` is called.

use crate::config::CoreConfig;
use crate::model::document::{PersistedDocument, LAST_UPDATED_FIELD};
use crate::repo::cache_repo::{cache_key, CacheError, LocalCache};
use crate::service::refresh::{RefreshDispatcher, RefreshReport};
use crate::service::session::Session;
use crate::sync::connectivity::Connectivity;
use crate::sync::remote_store::{DocumentRef, RemoteError, RemoteStore, RemoteWrite};
use log::{error, info, warn};
use std::sync::Arc;
use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no authenticated user")]
    NotAuthenticated,
    #[error("local cache document is malformed: {0}")]
    MalformedCache(#[source] serde_json::Error),
    #[error("remote document is malformed: {0}")]
    MalformedRemote(#[source] serde_json::Error),
    #[error(transparent)]
    RemoteUnavailable(#[from] RemoteError),
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Where the local phase of a load took its state from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalLoad {
    FromCache,
    /// No usable cache entry; canonical defaults were installed.
    Defaults,
}

/// Outcome of the remote phase of a load.
#[derive(Debug)]
pub enum RemoteSync {
    /// Connectivity reported offline; the remote store was not contacted.
    Offline,
    /// The remote document replaced local state. `local` is the status of
    /// the cache refresh that followed.
    Pulled { local: WriteStatus },
    /// No remote document existed; local state was saved to create it.
    Created { local: WriteStatus, remote: WriteStatus },
    Failed(GatewayError),
}

#[derive(Debug)]
pub struct LoadReport {
    pub local: LocalLoad,
    /// Why the cache entry was ignored, when it existed but was unusable.
    pub local_issue: Option<GatewayError>,
    pub remote: RemoteSync,
    pub refresh: RefreshReport,
}

impl LoadReport {
    /// Label of the source the session state finally came from.
    pub fn source(&self) -> &'static str {
        match (&self.remote, self.local) {
            (RemoteSync::Pulled { .. }, _) => "remote",
            (_, LocalLoad::FromCache) => "cache",
            (_, LocalLoad::Defaults) => "defaults",
        }
    }
}

/// Outcome of one store write.
#[derive(Debug)]
pub enum WriteStatus {
    Written,
    /// Not attempted: offline, or the remote document is guarded after a
    /// failed decode.
    Skipped,
    Failed(GatewayError),
}

impl WriteStatus {
    pub fn is_written(&self) -> bool {
        matches!(self, Self::Written)
    }
}

#[derive(Debug)]
pub struct SaveReport {
    pub local: WriteStatus,
    pub remote: WriteStatus,
    pub refresh: RefreshReport,
}

pub struct PersistenceGateway<C: LocalCache> {
    config: CoreConfig,
    cache: C,
    remote: Arc<dyn RemoteStore>,
    connectivity: Arc<dyn Connectivity>,
    refresh: RefreshDispatcher,
    /// Uid whose remote document failed to decode on the last load.
    guarded_uid: Option<String>,
}

impl<C: LocalCache> PersistenceGateway<C> {
    pub fn new(
        config: CoreConfig,
        cache: C,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            config,
            cache,
            remote,
            connectivity,
            refresh: RefreshDispatcher::new(),
            guarded_uid: None,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut C {
        &mut self.cache
    }

    pub fn refresh_mut(&mut self) -> &mut RefreshDispatcher {
        &mut self.refresh
    }

    /// Runs one refresh pass over the registered views.
    pub fn refresh(&mut self, session: &Session) -> RefreshReport {
        self.refresh.refresh(session)
    }

    /// Whether saves for `uid` currently skip the remote write.
    pub fn is_remote_guarded(&self, uid: &str) -> bool {
        self.guarded_uid.as_deref() == Some(uid)
    }

    /// Local cache key for `uid`.
    pub fn cache_key(&self, uid: &str) -> String {
        cache_key(&self.config.cache_namespace, uid)
    }

    /// Remote document address for `uid`.
    pub fn document_ref(&self, uid: &str) -> DocumentRef {
        DocumentRef::new(self.config.users_collection.clone(), uid)
    }

    /// Loads the signed-in user's data into `session`.
    ///
    /// Runs the local phase, then the remote phase, then a refresh pass.
    ///
    /// # Errors
    /// - `NotAuthenticated` when the session has no user; nothing is touched.
    pub fn load(&mut self, session: &mut Session) -> GatewayResult<LoadReport> {
        let uid = signed_in_uid(session)?;
        info!("event=session_load module=gateway status=start");

        let (local, local_issue) = self.load_local(session, &uid);
        let remote = self.sync_from_remote(session, &uid);
        let refresh = self.refresh(session);

        let report = LoadReport {
            local,
            local_issue,
            remote,
            refresh,
        };
        info!(
            "event=session_load module=gateway status=ok source={} semesters={} current={}",
            report.source(),
            session.semester_list().len(),
            session.current_semester()
        );
        Ok(report)
    }

    /// Applies the cached document, or canonical defaults when there is none.
    ///
    /// An unreadable or malformed entry is treated as absent and reported.
    pub fn load_local(
        &mut self,
        session: &mut Session,
        uid: &str,
    ) -> (LocalLoad, Option<GatewayError>) {
        let key = self.cache_key(uid);
        let issue = match self.cache.get(&key) {
            Ok(Some(text)) => match serde_json::from_str::<PersistedDocument>(&text) {
                Ok(document) => {
                    session.apply_document(document.without_timestamp());
                    info!(
                        "event=cache_read module=gateway status=ok bytes={}",
                        text.len()
                    );
                    return (LocalLoad::FromCache, None);
                }
                Err(err) => {
                    warn!("event=cache_read module=gateway status=error reason=malformed error={err}");
                    Some(GatewayError::MalformedCache(err))
                }
            },
            Ok(None) => {
                info!("event=cache_read module=gateway status=skipped reason=missing");
                None
            }
            Err(err) => {
                error!("event=cache_read module=gateway status=error error={err}");
                Some(GatewayError::Cache(err))
            }
        };

        session.reset_to_defaults();
        (LocalLoad::Defaults, issue)
    }

    /// Pulls the remote document over local state, or creates it.
    pub fn sync_from_remote(&mut self, session: &mut Session, uid: &str) -> RemoteSync {
        if !self.connectivity.is_online() {
            info!("event=remote_fetch module=gateway status=skipped reason=offline");
            return RemoteSync::Offline;
        }

        let doc = self.document_ref(uid);
        let fields = match self.remote.get(&doc) {
            Ok(fields) => fields,
            Err(err) => {
                warn!("event=remote_fetch module=gateway status=error error={err}");
                return RemoteSync::Failed(GatewayError::RemoteUnavailable(err));
            }
        };

        let Some(fields) = fields else {
            info!("event=remote_fetch module=gateway status=ok found=false");
            self.guarded_uid = None;
            let document = session.capture_document();
            let local = self.write_local(uid, &document);
            let remote = self.write_remote(uid, &document);
            return RemoteSync::Created { local, remote };
        };

        let document = match PersistedDocument::from_fields(fields) {
            Ok(document) => document,
            Err(err) => {
                error!("event=remote_fetch module=gateway status=error reason=malformed error={err}");
                self.guarded_uid = Some(uid.to_string());
                return RemoteSync::Failed(GatewayError::MalformedRemote(err));
            }
        };

        self.guarded_uid = None;
        session.apply_document(document);
        info!(
            "event=remote_fetch module=gateway status=ok found=true semesters={}",
            session.semester_list().len()
        );

        let normalized = session.capture_document();
        RemoteSync::Pulled {
            local: self.write_local(uid, &normalized),
        }
    }

    /// Folds working state and writes the full document to both stores.
    ///
    /// # Errors
    /// - `NotAuthenticated` when the session has no user; nothing is written.
    pub fn save(&mut self, session: &mut Session) -> GatewayResult<SaveReport> {
        let uid = signed_in_uid(session)?;
        let document = session.capture_document();

        let local = self.write_local(&uid, &document);
        let remote = if self.is_remote_guarded(&uid) {
            warn!("event=remote_write module=gateway status=skipped reason=malformed_remote");
            WriteStatus::Skipped
        } else {
            self.write_remote(&uid, &document)
        };
        let refresh = self.refresh(session);

        Ok(SaveReport {
            local,
            remote,
            refresh,
        })
    }

    /// Lifts the malformed-remote guard and saves, replacing the remote
    /// document's known fields with the session state.
    ///
    /// # Errors
    /// - `NotAuthenticated` when the session has no user; the guard stays.
    pub fn overwrite_remote(&mut self, session: &mut Session) -> GatewayResult<SaveReport> {
        let uid = signed_in_uid(session)?;
        if self.guarded_uid.as_deref() == Some(uid.as_str()) {
            info!("event=remote_overwrite module=gateway status=start");
            self.guarded_uid = None;
        }
        self.save(session)
    }

    /// Deletes the remote document, then the local cache entry.
    ///
    /// # Errors
    /// - `RemoteUnavailable` when offline or the delete fails; the local
    ///   cache is untouched in that case.
    /// - `Cache` when the local entry cannot be removed.
    pub fn delete_user_data(&mut self, uid: &str) -> GatewayResult<()> {
        if !self.connectivity.is_online() {
            return Err(RemoteError::Unavailable("offline".to_string()).into());
        }
        let doc = self.document_ref(uid);
        self.remote.delete(&doc)?;
        let key = self.cache_key(uid);
        self.cache.remove(&key)?;
        if self.is_remote_guarded(uid) {
            self.guarded_uid = None;
        }
        Ok(())
    }

    fn write_local(&mut self, uid: &str, document: &PersistedDocument) -> WriteStatus {
        let payload = match serde_json::to_string(&document.clone().without_timestamp()) {
            Ok(payload) => payload,
            Err(err) => {
                error!("event=cache_write module=gateway status=error reason=encode error={err}");
                return WriteStatus::Failed(GatewayError::Encode(err));
            }
        };

        let key = self.cache_key(uid);
        match self.cache.set(&key, &payload) {
            Ok(()) => {
                info!(
                    "event=cache_write module=gateway status=ok bytes={}",
                    payload.len()
                );
                WriteStatus::Written
            }
            Err(err) => {
                error!("event=cache_write module=gateway status=error error={err}");
                WriteStatus::Failed(GatewayError::Cache(err))
            }
        }
    }

    fn write_remote(&self, uid: &str, document: &PersistedDocument) -> WriteStatus {
        if !self.connectivity.is_online() {
            info!("event=remote_write module=gateway status=skipped reason=offline");
            return WriteStatus::Skipped;
        }

        let fields = match document.clone().without_timestamp().to_fields() {
            Ok(fields) => fields,
            Err(err) => {
                error!("event=remote_write module=gateway status=error reason=encode error={err}");
                return WriteStatus::Failed(GatewayError::Encode(err));
            }
        };
        let write = RemoteWrite {
            fields,
            server_timestamp_field: Some(LAST_UPDATED_FIELD.to_string()),
        };

        match self.remote.set_merge(&self.document_ref(uid), write) {
            Ok(()) => {
                info!("event=remote_write module=gateway status=ok");
                WriteStatus::Written
            }
            Err(err) => {
                warn!("event=remote_write module=gateway status=error error={err}");
                WriteStatus::Failed(GatewayError::RemoteUnavailable(err))
            }
        }
    }
}

fn signed_in_uid(session: &Session) -> GatewayResult<String> {
    match session.user() {
        Some(user) => Ok(user.uid.clone()),
        None => {
            info!("event=session_guard module=gateway status=skipped reason=not_authenticated");
            Err(GatewayError::NotAuthenticated)
        }
    }
}
