//! UI-facing bindings for the roster core.

pub mod api;
