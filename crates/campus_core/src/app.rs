//! Application facade consumed by feature screens and hosts.
//!
//! # Responsibility
//! - Own the `Session`, the persistence gateway and the reminder service.
//! - Run the sign-in pipeline: auth event, load, projection, render.
//! - Persist after every settings or semester operation.
//!
//! # Invariants
//! - Feature code mutates working state through `session_mut()` and then
//!   calls `save_data()`; there is no other mutable path to user data.
//! - Account deletion touches local state only after the remote delete
//!   succeeded.
//! - Loading never arms the reminder timer. Hosts call `start_reminders`
//!   once the first load has finished, and `tick` from their own timer.

use crate::config::CoreConfig;
use crate::model::settings::{PeriodConfig, SchoolInfo, TargetPart};
use crate::model::snapshot::SemesterId;
use crate::model::user::UserIdentity;
use crate::repo::cache_repo::LocalCache;
use crate::service::grade_summary::{self, GradeSummary};
use crate::service::ledger::{self, LedgerTotals};
use crate::service::refresh::{FeatureView, RefreshReport};
use crate::service::reminder::{Reminder, ReminderService};
use crate::service::semester_service::{SemesterController, SemesterResult};
use crate::service::session::Session;
use crate::service::settings_service::{self, SemesterPhase};
use crate::sync::auth::{AuthError, AuthProvider};
use crate::sync::connectivity::Connectivity;
use crate::sync::gateway::{
    GatewayError, GatewayResult, LoadReport, PersistenceGateway, SaveReport,
};
use crate::sync::remote_store::RemoteStore;
use chrono::NaiveDateTime;
use log::{error, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error(transparent)]
    Auth(#[from] AuthError),
}

pub struct CampusApp<C: LocalCache> {
    session: Session,
    gateway: PersistenceGateway<C>,
    reminders: ReminderService,
}

impl<C: LocalCache> CampusApp<C> {
    pub fn new(
        config: CoreConfig,
        cache: C,
        remote: Arc<dyn RemoteStore>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        let session = Session::new(&config.default_semester);
        let reminders = ReminderService::new(config.reminders);
        Self {
            session,
            gateway: PersistenceGateway::new(config, cache, remote, connectivity),
            reminders,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Direct access to working state and settings for feature screens.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn gateway(&self) -> &PersistenceGateway<C> {
        &self.gateway
    }

    pub fn reminders(&self) -> &ReminderService {
        &self.reminders
    }

    pub fn register_view(&mut self, view: Box<dyn FeatureView>) {
        self.gateway.refresh_mut().register(view);
    }

    /// Reacts to the auth provider's state change.
    ///
    /// A user signs the session in and loads their data; `None` clears the
    /// session back to defaults and stops reminders. Reminders are not
    /// started here because arming needs the host's clock; call
    /// `start_reminders` after a sign-in.
    pub fn on_auth_changed(&mut self, user: Option<UserIdentity>) -> Option<LoadReport> {
        match user {
            Some(user) => {
                info!(
                    "event=auth_changed module=app status=ok signed_in=true anonymous={}",
                    user.is_anonymous
                );
                self.session.sign_in(user);
                self.load_data().ok()
            }
            None => {
                info!("event=auth_changed module=app status=ok signed_in=false");
                self.reminders.stop();
                self.session.sign_out();
                self.refresh_ui();
                None
            }
        }
    }

    /// Signs out through the provider, then clears the session.
    pub fn sign_out(&mut self, auth: &dyn AuthProvider) -> Result<(), AuthError> {
        auth.sign_out()?;
        self.on_auth_changed(None);
        Ok(())
    }

    pub fn load_data(&mut self) -> GatewayResult<LoadReport> {
        self.gateway.load(&mut self.session)
    }

    pub fn save_data(&mut self) -> GatewayResult<SaveReport> {
        self.gateway.save(&mut self.session)
    }

    /// Saves and replaces a remote document that failed to decode on load.
    /// Until this is called such a document is left untouched by saves.
    pub fn overwrite_remote_data(&mut self) -> GatewayResult<SaveReport> {
        warn!("event=remote_overwrite module=app status=start");
        self.gateway.overwrite_remote(&mut self.session)
    }

    pub fn refresh_ui(&mut self) -> RefreshReport {
        self.gateway.refresh(&self.session)
    }

    /// Projects `semester` into working state without persisting.
    pub fn load_semester_data(&mut self, semester: &str) -> SemesterResult<()> {
        self.session.load_semester_data(semester)
    }

    pub fn create_semester(&mut self, name: &str) -> SemesterResult<Option<SaveReport>> {
        self.semesters().create(name)
    }

    pub fn switch_semester(&mut self, name: &str) -> SemesterResult<Option<SaveReport>> {
        self.semesters().switch(name)
    }

    pub fn rename_semester(&mut self, old: &str, new: &str) -> SemesterResult<Option<SaveReport>> {
        self.semesters().rename(old, new)
    }

    pub fn delete_semester(&mut self, name: &str) -> SemesterResult<Option<SaveReport>> {
        self.semesters().delete(name)
    }

    pub fn set_user_title(&mut self, title: &str) -> Option<SaveReport> {
        settings_service::set_user_title(&mut self.session, title);
        self.persist()
    }

    pub fn set_graduation_target(&mut self, target: f64) -> Option<SaveReport> {
        settings_service::set_graduation_target(&mut self.session, target);
        self.persist()
    }

    pub fn update_category_target(
        &mut self,
        category: &str,
        part: TargetPart,
        value: f64,
    ) -> Option<SaveReport> {
        settings_service::update_category_target(&mut self.session, category, part, value);
        self.persist()
    }

    /// Returns `None` without saving when the method was rejected.
    pub fn add_payment_method(&mut self, name: &str) -> Option<SaveReport> {
        if !settings_service::add_payment_method(&mut self.session, name) {
            return None;
        }
        self.persist()
    }

    pub fn set_school_info(&mut self, info: SchoolInfo) -> Option<SaveReport> {
        settings_service::set_school_info(&mut self.session, info);
        self.persist()
    }

    pub fn set_period_config(&mut self, config: PeriodConfig) -> Option<SaveReport> {
        settings_service::set_period_config(&mut self.session, config);
        self.persist()
    }

    /// Stores the semester dates, persists, and re-arms a running reminder
    /// timer. Returns reminders produced by the immediate re-check.
    pub fn set_semester_dates(
        &mut self,
        start: &str,
        end: &str,
        now: NaiveDateTime,
    ) -> (Option<SaveReport>, Vec<Reminder>) {
        settings_service::set_semester_dates(&mut self.session, start, end);
        let saved = self.persist();
        let reminders = if self.reminders.is_running() {
            self.reminders.start(&self.session, now)
        } else {
            Vec::new()
        };
        (saved, reminders)
    }

    pub fn semester_phase(&self, now: NaiveDateTime) -> Option<SemesterPhase> {
        settings_service::semester_phase(&self.session.working().start_date, now)
    }

    pub fn grade_summary(&self) -> GradeSummary {
        grade_summary::current_summary(&self.session)
    }

    pub fn semester_trend(&self) -> Vec<(SemesterId, f64)> {
        grade_summary::semester_trend(&self.session)
    }

    pub fn ledger_totals(&self) -> LedgerTotals {
        ledger::totals(&self.session.working().accounting)
    }

    pub fn ledger_balances(&self) -> BTreeMap<String, f64> {
        ledger::balances(
            &self.session.settings().payment_methods,
            &self.session.working().accounting,
        )
    }

    /// Arms (or re-arms) the reminder timer and runs the first check.
    pub fn start_reminders(&mut self, now: NaiveDateTime) -> Vec<Reminder> {
        self.reminders.start(&self.session, now)
    }

    pub fn stop_reminders(&mut self) {
        self.reminders.stop();
    }

    /// Host timer callback; runs a check only when one is due.
    pub fn tick(&mut self, now: NaiveDateTime) -> Vec<Reminder> {
        self.reminders.tick(&self.session, now)
    }

    /// Deletes the remote document, the local cache entry and the auth
    /// identity, in that order, then resets the session.
    ///
    /// # Errors
    /// - `Gateway(NotAuthenticated)` when no user is signed in.
    /// - `Gateway(RemoteUnavailable)` when the remote delete fails; nothing
    ///   local has been touched.
    /// - `Auth` when the provider refuses, e.g. a recent login is required;
    ///   stored data is already gone at that point.
    pub fn delete_account(&mut self, auth: &dyn AuthProvider) -> Result<(), AccountError> {
        let uid = match self.session.user() {
            Some(user) => user.uid.clone(),
            None => return Err(GatewayError::NotAuthenticated.into()),
        };
        info!("event=account_delete module=app status=start");

        if let Err(err) = self.gateway.delete_user_data(&uid) {
            error!("event=account_delete module=app status=error stage=data error={err}");
            return Err(err.into());
        }
        if let Err(err) = auth.delete_current_user() {
            warn!("event=account_delete module=app status=error stage=auth error={err}");
            return Err(err.into());
        }

        self.reminders.stop();
        self.session.sign_out();
        self.refresh_ui();
        info!("event=account_delete module=app status=ok");
        Ok(())
    }

    fn semesters(&mut self) -> SemesterController<'_, C> {
        SemesterController::new(&mut self.session, &mut self.gateway)
    }

    fn persist(&mut self) -> Option<SaveReport> {
        match self.gateway.save(&mut self.session) {
            Ok(report) => Some(report),
            Err(GatewayError::NotAuthenticated) => {
                self.gateway.refresh(&self.session);
                None
            }
            Err(err) => {
                warn!("event=settings_persist module=app status=error error={err}");
                None
            }
        }
    }
}
