use campus_core::model::entities::{AccountingItem, TransactionKind};
use campus_core::model::settings::{SchoolInfo, TargetPart};
use campus_core::service::settings_service::SemesterPhase;
use campus_core::sync::auth::{AuthError, AuthProvider, LocalAuthProvider};
use campus_core::sync::connectivity::StaticConnectivity;
use campus_core::{
    AccountError, CampusApp, CoreConfig, DocumentRef, FnView, GatewayError, InMemoryRemoteStore,
    LocalCache, MemoryLocalCache, RenderOutcome, Session, UserIdentity,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

const CACHE_KEY: &str = "CampusKing_v6.0_u1";

fn app() -> (CampusApp<MemoryLocalCache>, Arc<InMemoryRemoteStore>) {
    let remote = Arc::new(InMemoryRemoteStore::new());
    let app = CampusApp::new(
        CoreConfig::default(),
        MemoryLocalCache::new(),
        remote.clone(),
        Arc::new(StaticConnectivity::new(true)),
    );
    (app, remote)
}

fn user() -> UserIdentity {
    UserIdentity::account("u1", Some("Mei".to_string()))
}

fn at(date: &str, hour: u32) -> NaiveDateTime {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

#[test]
fn sign_in_pipeline_loads_and_renders() {
    let (mut app, remote) = app();
    let renders = Rc::new(Cell::new(0));
    let counter = Rc::clone(&renders);
    app.register_view(Box::new(FnView::new("dashboard", move |_: &Session| {
        counter.set(counter.get() + 1);
        RenderOutcome::Rendered
    })));
    app.register_view(Box::new(FnView::new("lottery", |_: &Session| {
        RenderOutcome::NotMounted
    })));

    let report = app.on_auth_changed(Some(user())).unwrap();
    assert_eq!(report.refresh.rendered, 1);
    assert_eq!(report.refresh.not_mounted, 1);
    assert!(renders.get() >= 1);
    assert!(app.session().is_authenticated());
    assert!(remote.document(&DocumentRef::new("users", "u1")).is_some());

    assert!(app.on_auth_changed(None).is_none());
    assert!(!app.session().is_authenticated());
    assert_eq!(app.session().semester_list(), ["114-1"]);
}

#[test]
fn settings_operations_persist_each_change() {
    let (mut app, remote) = app();
    app.on_auth_changed(Some(user()));
    let writes = remote.write_count();

    assert!(app.set_user_title("Captain").is_some());
    assert!(app.set_graduation_target(132.0).is_some());
    assert!(app
        .update_category_target("專業", TargetPart::Total, 60.0)
        .is_some());
    assert!(app
        .set_school_info(SchoolInfo {
            school: "NTU".to_string(),
            department: "CSIE".to_string(),
        })
        .is_some());
    assert!(app.add_payment_method("LINE Pay").is_some());
    assert!(app.add_payment_method("LINE Pay").is_none());
    assert_eq!(remote.write_count(), writes + 5);

    let cached = app.gateway().cache().get(CACHE_KEY).unwrap().unwrap();
    let cached: serde_json::Value = serde_json::from_str(&cached).unwrap();
    assert_eq!(cached["userTitle"], "Captain");
    assert_eq!(cached["graduationTarget"], 132.0);
    assert_eq!(cached["categoryTargets"]["專業"], 60.0);
    assert_eq!(cached["userSchoolInfo"]["department"], "CSIE");
}

#[test]
fn signed_out_operations_mutate_memory_only() {
    let (mut app, remote) = app();
    assert!(app.set_user_title("Guest").is_none());
    assert!(app.create_semester("114-2").unwrap().is_none());
    assert_eq!(app.session().current_semester(), "114-2");
    assert_eq!(remote.write_count(), 0);
    assert!(matches!(app.save_data(), Err(GatewayError::NotAuthenticated)));
}

#[test]
fn semester_dates_drive_phase_and_rearm_reminders() {
    let (mut app, _) = app();
    app.on_auth_changed(Some(user()));
    let now = at("2025-09-20", 12);

    app.start_reminders(now);
    let generation = app.reminders().timer().generation();
    let (saved, _) = app.set_semester_dates("2025-09-08", "2026-01-16", now);
    assert!(saved.is_some());
    assert!(app.reminders().timer().generation() > generation);
    assert_eq!(app.semester_phase(now), Some(SemesterPhase::Week(2)));

    app.stop_reminders();
    let generation = app.reminders().timer().generation();
    app.set_semester_dates("2025-09-08", "2026-01-16", now);
    assert_eq!(app.reminders().timer().generation(), generation);
    assert!(!app.reminders().is_running());
}

#[test]
fn account_deletion_removes_remote_cache_and_identity() {
    let (mut app, remote) = app();
    let auth = LocalAuthProvider::signed_in(user());
    app.on_auth_changed(auth.current_user());
    assert!(app.gateway().cache().get(CACHE_KEY).unwrap().is_some());

    app.delete_account(&auth).unwrap();
    assert!(remote.document(&DocumentRef::new("users", "u1")).is_none());
    assert!(app.gateway().cache().get(CACHE_KEY).unwrap().is_none());
    assert!(auth.current_user().is_none());
    assert!(!app.session().is_authenticated());
}

#[test]
fn account_deletion_aborts_on_remote_failure() {
    let (mut app, remote) = app();
    let auth = LocalAuthProvider::signed_in(user());
    app.on_auth_changed(auth.current_user());
    remote.set_available(false);

    let err = app.delete_account(&auth).unwrap_err();
    assert!(matches!(
        err,
        AccountError::Gateway(GatewayError::RemoteUnavailable(_))
    ));
    assert!(app.gateway().cache().get(CACHE_KEY).unwrap().is_some());
    assert!(auth.current_user().is_some());
    assert!(app.session().is_authenticated());
}

#[test]
fn sign_out_goes_through_the_provider() {
    let (mut app, _) = app();
    let auth = LocalAuthProvider::signed_in(user());
    app.on_auth_changed(auth.current_user());

    app.sign_out(&auth).unwrap();
    assert!(auth.current_user().is_none());
    assert!(!app.session().is_authenticated());
    assert_eq!(app.sign_out(&auth), Err(AuthError::NoCurrentUser));
}

#[test]
fn sign_in_leaves_reminders_to_the_host() {
    let (mut app, _) = app();
    app.on_auth_changed(Some(user()));
    let now = at("2025-09-22", 12);

    assert!(!app.reminders().is_running());
    assert!(app.tick(now).is_empty());

    app.start_reminders(now);
    assert!(app.reminders().is_running());
}

#[test]
fn ledger_totals_and_balances_follow_working_state() {
    let (mut app, _) = app();
    app.on_auth_changed(Some(user()));
    let entries = [
        (TransactionKind::Income, 2000.0, "現金", None),
        (TransactionKind::Expense, 150.0, "現金", None),
        (TransactionKind::Transfer, 500.0, "現金", Some("悠遊卡")),
    ];
    for (kind, amount, method, to) in entries {
        app.session_mut().working_mut().accounting.push(AccountingItem {
            date: "2025-09-22".to_string(),
            title: "entry".to_string(),
            amount,
            kind,
            method: method.to_string(),
            to_method: to.map(str::to_string),
        });
    }

    let totals = app.ledger_totals();
    assert_eq!(totals.income, 2000.0);
    assert_eq!(totals.expense, 150.0);
    assert_eq!(totals.balance(), 1850.0);
    let balances = app.ledger_balances();
    assert_eq!(balances["現金"], 1350.0);
    assert_eq!(balances["悠遊卡"], 500.0);
}

#[test]
fn undecodable_remote_document_is_replaced_only_on_request() {
    let (mut app, remote) = app();
    let doc = DocumentRef::new("users", "u1");
    let broken = json!({"semesterList": ["113-2"], "allData": {"113-2": {"notes": 3}}});
    remote.insert_document(doc.clone(), broken.as_object().unwrap().clone());

    app.on_auth_changed(Some(user()));
    assert!(app.set_user_title("Captain").is_some());
    assert_eq!(remote.write_count(), 0);
    assert_eq!(remote.document(&doc).unwrap()["allData"]["113-2"]["notes"], 3);

    let report = app.overwrite_remote_data().unwrap();
    assert!(report.remote.is_written());
    assert_eq!(remote.document(&doc).unwrap()["userTitle"], "Captain");
}
