//! Live session: the single owned state tree of one signed-in user.
//!
//! # Responsibility
//! - Own global settings, the semester store and the checked-out working
//!   snapshot of the current semester.
//! - Provide the projection (`check_out`) and fold (`check_in`) steps used by
//!   the gateway and the semester controller.
//!
//! # Invariants
//! - `settings.semester_list` and the store keys are equal as sets.
//! - `working` is the current semester's snapshot; the stored copy of the
//!   current semester is stale until `check_in` runs.
//! - At least one semester always exists.

use crate::model::document::PersistedDocument;
use crate::model::settings::GlobalSettings;
use crate::model::snapshot::{SemesterId, SemesterSnapshot, SemesterStore};
use crate::model::user::UserIdentity;
use crate::service::semester_service::{SemesterError, SemesterResult};

/// One user's in-memory campus data.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    user: Option<UserIdentity>,
    pub(crate) settings: GlobalSettings,
    pub(crate) store: SemesterStore,
    pub(crate) working: SemesterSnapshot,
    remote_updated_at: Option<i64>,
    default_semester: SemesterId,
}

impl Session {
    /// Signed-out session holding canonical defaults.
    pub fn new(default_semester: &str) -> Self {
        let settings = GlobalSettings::defaults(default_semester, None);
        let mut store = SemesterStore::new();
        store.insert(default_semester.to_string(), SemesterSnapshot::default());
        Self {
            user: None,
            settings,
            store,
            working: SemesterSnapshot::default(),
            remote_updated_at: None,
            default_semester: default_semester.to_string(),
        }
    }

    /// Attaches an identity; data is untouched until the gateway loads.
    pub fn sign_in(&mut self, user: UserIdentity) {
        self.user = Some(user);
    }

    /// Drops the identity and every piece of user data.
    pub fn sign_out(&mut self) {
        self.user = None;
        self.reset_to_defaults();
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    /// Mutable settings; the semester index stays read-only through it.
    pub fn settings_mut(&mut self) -> &mut GlobalSettings {
        &mut self.settings
    }

    /// Working state of the current semester.
    pub fn working(&self) -> &SemesterSnapshot {
        &self.working
    }

    pub fn working_mut(&mut self) -> &mut SemesterSnapshot {
        &mut self.working
    }

    pub fn current_semester(&self) -> &str {
        self.settings.current_semester()
    }

    pub fn semester_list(&self) -> &[SemesterId] {
        self.settings.semester_list()
    }

    /// Semester ids that own a snapshot, sorted.
    pub fn stored_semesters(&self) -> Vec<&str> {
        self.store.keys().map(String::as_str).collect()
    }

    /// Latest view of one semester; the working state for the current one.
    pub fn snapshot(&self, semester: &str) -> Option<&SemesterSnapshot> {
        if semester == self.current_semester() {
            return Some(&self.working);
        }
        self.store.get(semester)
    }

    /// Commit time of the last remote document applied, if any.
    pub fn remote_updated_at(&self) -> Option<i64> {
        self.remote_updated_at
    }

    pub fn default_semester(&self) -> &str {
        &self.default_semester
    }

    /// Replaces all data with canonical defaults, keeping the identity.
    pub fn reset_to_defaults(&mut self) {
        let display_name = self.display_name();
        self.settings = GlobalSettings::defaults(&self.default_semester, display_name.as_deref());
        self.store.clear();
        self.store
            .insert(self.default_semester.clone(), SemesterSnapshot::default());
        self.working = SemesterSnapshot::default();
        self.remote_updated_at = None;
    }

    /// Projects `semester` into the working state and makes it current.
    ///
    /// The previous working state is folded back first. A listed semester
    /// without a snapshot gets the default snapshot.
    ///
    /// # Errors
    /// - `NotFound` when `semester` is not in the semester list.
    pub fn load_semester_data(&mut self, semester: &str) -> SemesterResult<()> {
        if !self.settings.has_semester(semester) {
            return Err(SemesterError::NotFound(semester.to_string()));
        }
        self.check_in();
        self.check_out(semester);
        Ok(())
    }

    /// Folds the working state back into the store.
    pub fn check_in(&mut self) {
        let current = self.settings.current_semester.clone();
        self.store.insert(current, self.working.clone());
    }

    /// Folds, then captures the full persisted document.
    pub fn capture_document(&mut self) -> PersistedDocument {
        self.check_in();
        PersistedDocument::capture(&self.settings, &self.store)
    }

    /// Replaces settings + store with a decoded document and re-projects.
    pub(crate) fn apply_document(&mut self, document: PersistedDocument) {
        let remote_updated_at = document.last_updated;
        let display_name = self.display_name();
        let (settings, store) =
            document.into_state(&self.default_semester, display_name.as_deref());
        self.settings = settings;
        self.store = store;
        self.remote_updated_at = remote_updated_at;
        let current = self.settings.current_semester.clone();
        self.check_out(&current);
    }

    /// Makes `semester` current and copies its snapshot into working state.
    pub(crate) fn check_out(&mut self, semester: &str) {
        self.settings.current_semester = semester.to_string();
        self.working = self
            .store
            .entry(semester.to_string())
            .or_default()
            .clone();
    }

    fn display_name(&self) -> Option<String> {
        self.user.as_ref().and_then(|user| user.display_name.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::Session;
    use crate::model::entities::Note;
    use crate::model::user::UserIdentity;
    use crate::service::semester_service::SemesterError;

    #[test]
    fn new_session_has_one_semester_and_blank_working_state() {
        let session = Session::new("114-1");
        assert_eq!(session.semester_list(), ["114-1".to_string()]);
        assert_eq!(session.stored_semesters(), ["114-1"]);
        assert!(session.working().is_blank());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn check_in_folds_working_state_into_store() {
        let mut session = Session::new("114-1");
        session.working_mut().notes.push(Note {
            id: 1,
            content: "bring lab coat".to_string(),
            date: "2025-09-02".to_string(),
        });
        assert!(session.store["114-1"].notes.is_empty());

        session.check_in();
        assert_eq!(session.store["114-1"].notes.len(), 1);
    }

    #[test]
    fn load_semester_data_rejects_unknown_semester() {
        let mut session = Session::new("114-1");
        let err = session.load_semester_data("999-9").unwrap_err();
        assert_eq!(err, SemesterError::NotFound("999-9".to_string()));
        assert_eq!(session.current_semester(), "114-1");
    }

    #[test]
    fn sign_out_clears_identity_and_data() {
        let mut session = Session::new("114-1");
        session.sign_in(UserIdentity::account("u1", Some("Mei".to_string())));
        session.working_mut().lottery = crate::model::entities::LotteryPool::Items(vec![
            "ramen".to_string(),
        ]);
        session.sign_out();
        assert!(session.user().is_none());
        assert!(session.working().is_blank());
        assert_eq!(session.settings().user_title, "同學");
    }
}
