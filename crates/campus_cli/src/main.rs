//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `campus_core` linkage.
//! - Run the sign-in, load and render pipeline once against a SQLite cache
//!   and the in-process remote store, printing a deterministic summary.
//!
//! Usage: `campus_cli [cache.db]`. Without a path the cache lives in memory.
//! Set `CAMPUSKING_LOG_DIR` to an absolute path to enable file logs and
//! `CAMPUSKING_CONFIG` to a TOML file to override the core defaults.

use campus_core::db::{open_db, open_db_in_memory};
use campus_core::sync::connectivity::StaticConnectivity;
use campus_core::{
    default_log_level, init_logging, CampusApp, CoreConfig, FnView, InMemoryRemoteStore,
    RenderOutcome, Session, SqliteLocalCache, UserIdentity,
};
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    println!("campus_core ping={}", campus_core::ping());
    println!("campus_core version={}", campus_core::core_version());

    if let Ok(log_dir) = std::env::var("CAMPUSKING_LOG_DIR") {
        if let Err(err) = init_logging(default_log_level(), log_dir.as_str()) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(std::env::args().nth(1)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: Option<String>) -> Result<(), Box<dyn Error>> {
    let conn = match db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    let config = match std::env::var("CAMPUSKING_CONFIG") {
        Ok(path) => CoreConfig::from_file(path)?,
        Err(_) => CoreConfig::default(),
    };
    let cache = SqliteLocalCache::try_new(conn)?;
    let remote = Arc::new(InMemoryRemoteStore::new());
    let mut app = CampusApp::new(
        config,
        cache,
        remote.clone(),
        Arc::new(StaticConnectivity::new(true)),
    );
    app.register_view(Box::new(FnView::new("summary", |session: &Session| {
        println!(
            "render semester={} semesters={}",
            session.current_semester(),
            session.semester_list().len()
        );
        RenderOutcome::Rendered
    })));

    if let Some(report) = app.on_auth_changed(Some(UserIdentity::local_anonymous())) {
        println!("load source={}", report.source());
    }
    app.create_semester("114-2")?;

    let session = app.session();
    println!("semesters={}", session.semester_list().join(","));
    println!("current={}", session.current_semester());
    println!("remote_writes={}", remote.write_count());
    if let Some(user) = session.user() {
        let key = app.gateway().cache_key(&user.uid);
        if let Some(info) = app.gateway().cache().entry_info(&key)? {
            println!("cache_bytes={}", info.bytes);
        }
    }
    Ok(())
}
