//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into roster use-cases.
//! - Hold UI-side edit state (draft rows, dirty flag) outside any widget
//!   toolkit so front-ends stay thin.

pub mod edit_session;
pub mod roster_service;
