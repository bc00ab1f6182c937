//! Domain model for the student roster.
//!
//! # Responsibility
//! - Define the canonical roster, student record and task shapes.
//! - Own the lenient decoding rules applied to persisted task fields.
//!
//! # Invariants
//! - Student names are unique keys; roster order follows insertion order.
//! - Every task carries a concrete due date and one of three states.

pub mod student;
