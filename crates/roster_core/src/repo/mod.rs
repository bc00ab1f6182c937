//! Repository layer for the roster document.
//!
//! # Responsibility
//! - Define the load/persist contract used by the roster service.
//! - Isolate file format and storage details from use-case orchestration.
//!
//! # Invariants
//! - `load` rejects malformed documents instead of masking them.
//! - `persist` always writes the full roster.

pub mod roster_repo;
