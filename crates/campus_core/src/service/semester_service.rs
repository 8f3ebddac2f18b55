//! Semester switch controller.
//!
//! # Responsibility
//! - Create, switch, rename and delete semesters on a `Session`.
//! - Persist through the gateway after every successful transition.
//!
//! # Invariants
//! - `semester_list` and the store keys stay equal as sets.
//! - At least one semester always exists.
//! - A rejected transition leaves the session untouched.
//! - Working state is folded back before any re-projection.

use crate::model::snapshot::SemesterSnapshot;
use crate::repo::cache_repo::LocalCache;
use crate::service::session::Session;
use crate::sync::gateway::{GatewayError, PersistenceGateway, SaveReport};
use log::{info, warn};
use thiserror::Error;

pub type SemesterResult<T> = Result<T, SemesterError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemesterError {
    #[error("semester name must not be blank")]
    BlankName,
    #[error("semester `{0}` already exists")]
    DuplicateName(String),
    #[error("semester `{0}` not found")]
    NotFound(String),
    #[error("the last remaining semester cannot be deleted")]
    LastSemester,
}

/// Adds `name` with a default snapshot and makes it current.
///
/// The name is trimmed. The list is re-sorted lexicographically.
pub fn create_semester(session: &mut Session, name: &str) -> SemesterResult<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SemesterError::BlankName);
    }
    if session.settings.has_semester(name) {
        return Err(SemesterError::DuplicateName(name.to_string()));
    }

    session.check_in();
    session.settings.semester_list.push(name.to_string());
    session.settings.semester_list.sort();
    session
        .store
        .insert(name.to_string(), SemesterSnapshot::default());
    session.check_out(name);
    Ok(())
}

/// Makes `name` current and projects its snapshot.
pub fn switch_semester(session: &mut Session, name: &str) -> SemesterResult<()> {
    session.load_semester_data(name)
}

/// Re-keys `old` as `new`, keeping its snapshot and current status.
///
/// Renaming a semester to itself is a no-op.
pub fn rename_semester(session: &mut Session, old: &str, new: &str) -> SemesterResult<()> {
    let new = new.trim();
    if new.is_empty() {
        return Err(SemesterError::BlankName);
    }
    if !session.settings.has_semester(old) {
        return Err(SemesterError::NotFound(old.to_string()));
    }
    if old == new {
        return Ok(());
    }
    if session.settings.has_semester(new) {
        return Err(SemesterError::DuplicateName(new.to_string()));
    }

    session.check_in();
    let snapshot = session.store.remove(old).unwrap_or_default();
    session.store.insert(new.to_string(), snapshot);
    for id in session.settings.semester_list.iter_mut() {
        if id == old {
            *id = new.to_string();
        }
    }
    session.settings.semester_list.sort();
    if session.settings.current_semester == old {
        session.settings.current_semester = new.to_string();
    }
    Ok(())
}

/// Removes `name`; switches to the first remaining semester if it was current.
pub fn delete_semester(session: &mut Session, name: &str) -> SemesterResult<()> {
    if session.settings.semester_list.len() <= 1 {
        return Err(SemesterError::LastSemester);
    }
    if !session.settings.has_semester(name) {
        return Err(SemesterError::NotFound(name.to_string()));
    }

    session.check_in();
    session.settings.semester_list.retain(|id| id != name);
    session.store.remove(name);
    if session.settings.current_semester == name {
        let first = session.settings.semester_list[0].clone();
        session.check_out(&first);
    }
    Ok(())
}

/// Runs transitions against a session and persists each one.
pub struct SemesterController<'a, C: LocalCache> {
    session: &'a mut Session,
    gateway: &'a mut PersistenceGateway<C>,
}

impl<'a, C: LocalCache> SemesterController<'a, C> {
    pub fn new(session: &'a mut Session, gateway: &'a mut PersistenceGateway<C>) -> Self {
        Self { session, gateway }
    }

    /// Returns the save report, or `None` when no user is signed in.
    pub fn create(&mut self, name: &str) -> SemesterResult<Option<SaveReport>> {
        log_rejection("semester_create", create_semester(self.session, name))?;
        info!(
            "event=semester_create module=semester status=ok semester={} total={}",
            self.session.current_semester(),
            self.session.semester_list().len()
        );
        Ok(self.persist())
    }

    pub fn switch(&mut self, name: &str) -> SemesterResult<Option<SaveReport>> {
        log_rejection("semester_switch", switch_semester(self.session, name))?;
        info!("event=semester_switch module=semester status=ok semester={name}");
        Ok(self.persist())
    }

    pub fn rename(&mut self, old: &str, new: &str) -> SemesterResult<Option<SaveReport>> {
        log_rejection("semester_rename", rename_semester(self.session, old, new))?;
        info!("event=semester_rename module=semester status=ok from={old} to={}", new.trim());
        Ok(self.persist())
    }

    pub fn delete(&mut self, name: &str) -> SemesterResult<Option<SaveReport>> {
        log_rejection("semester_delete", delete_semester(self.session, name))?;
        info!(
            "event=semester_delete module=semester status=ok semester={name} current={}",
            self.session.current_semester()
        );
        Ok(self.persist())
    }

    fn persist(&mut self) -> Option<SaveReport> {
        match self.gateway.save(self.session) {
            Ok(report) => Some(report),
            Err(GatewayError::NotAuthenticated) => {
                self.gateway.refresh(self.session);
                None
            }
            Err(err) => {
                warn!("event=semester_persist module=semester status=error error={err}");
                None
            }
        }
    }
}

fn log_rejection(event: &str, result: SemesterResult<()>) -> SemesterResult<()> {
    if let Err(err) = &result {
        warn!("event={event} module=semester status=error error={err}");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(ids: &[&str]) -> Session {
        let mut session = Session::new(ids[0]);
        for id in &ids[1..] {
            create_semester(&mut session, id).unwrap();
        }
        session
    }

    #[test]
    fn create_sorts_list_and_switches() {
        let mut session = session_with(&["114-2", "114-1"]);
        create_semester(&mut session, " 115-1 ").unwrap();
        assert_eq!(session.semester_list(), ["114-1", "114-2", "115-1"]);
        assert_eq!(session.current_semester(), "115-1");
        assert!(session.working().is_blank());
    }

    #[test]
    fn create_rejects_blank_and_duplicate_names() {
        let mut session = session_with(&["114-1"]);
        let before = session.clone();
        assert_eq!(create_semester(&mut session, "   "), Err(SemesterError::BlankName));
        assert_eq!(
            create_semester(&mut session, "114-1"),
            Err(SemesterError::DuplicateName("114-1".to_string()))
        );
        assert_eq!(session, before);
    }

    #[test]
    fn rename_current_semester_keeps_working_state() {
        let mut session = session_with(&["114-1"]);
        session.working_mut().homework.push(crate::model::entities::HomeworkItem {
            id: 7,
            subject: "Physics".to_string(),
            title: "Lab report".to_string(),
            date: "2025-10-01".to_string(),
            is_done: false,
            score: None,
            total: None,
        });

        rename_semester(&mut session, "114-1", "113-2").unwrap();
        assert_eq!(session.current_semester(), "113-2");
        assert_eq!(session.stored_semesters(), ["113-2"]);
        assert_eq!(session.working().homework.len(), 1);
        assert_eq!(session.store["113-2"].homework.len(), 1);
    }

    #[test]
    fn rename_to_same_name_is_noop() {
        let mut session = session_with(&["114-1"]);
        let before = session.clone();
        rename_semester(&mut session, "114-1", "114-1").unwrap();
        assert_eq!(session, before);
    }

    #[test]
    fn delete_current_switches_to_first_remaining() {
        let mut session = session_with(&["114-1", "114-2", "115-1"]);
        assert_eq!(session.current_semester(), "115-1");
        delete_semester(&mut session, "115-1").unwrap();
        assert_eq!(session.semester_list(), ["114-1", "114-2"]);
        assert_eq!(session.current_semester(), "114-1");
    }

    #[test]
    fn delete_last_semester_is_rejected_before_lookup() {
        let mut session = session_with(&["114-1"]);
        assert_eq!(delete_semester(&mut session, "nope"), Err(SemesterError::LastSemester));
        assert_eq!(session.semester_list(), ["114-1"]);
    }
}
