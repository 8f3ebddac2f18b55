//! Local persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the local durable cache contract used by the gateway.
//! - Isolate SQLite query details from session orchestration.
//!
//! # Invariants
//! - Cache implementations store opaque strings; document validation
//!   belongs to the gateway.

pub mod cache_repo;
