//! Core use-case services.
//!
//! # Responsibility
//! - Own the live `Session` and the operations feature screens call on it.
//! - Keep persistence behind the gateway; services mutate memory only,
//!   except `SemesterController`, which persists each transition.

pub mod grade_summary;
pub mod ledger;
pub mod refresh;
pub mod reminder;
pub mod semester_service;
pub mod session;
pub mod settings_service;
