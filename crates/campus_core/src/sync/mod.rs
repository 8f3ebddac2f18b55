//! Synchronization between the live session, the local cache and the
//! remote document store.
//!
//! # Responsibility
//! - Define the collaborator contracts consumed by the core (remote store,
//!   connectivity, auth provider).
//! - Own the persistence gateway: load-on-start merge and write-through save.
//!
//! # Invariants
//! - Remote failures never propagate as `Err` out of load/save; they are
//!   logged and reported.
//! - Conflict policy is last-writer-wins; no merge is attempted.

pub mod auth;
pub mod connectivity;
pub mod gateway;
pub mod remote_store;
