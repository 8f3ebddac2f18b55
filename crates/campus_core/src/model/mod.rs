//! Domain model for per-user campus data.
//!
//! # Responsibility
//! - Define the entity records, the per-semester snapshot, the cross-semester
//!   settings and the persisted document shape.
//! - Centralize every default value in one constructor per type.
//!
//! # Invariants
//! - Every snapshot reachable from a store is fully initialized.
//! - Shape validation happens at the document boundary, not at call sites.

pub mod document;
pub mod entities;
pub mod schedule;
pub mod settings;
pub mod snapshot;
pub mod user;
mod wire;
