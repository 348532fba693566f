//! Team roster client.
//!
//! Stages membership changes for a department team (add, remove, promote to leader), shows
//! them as a diff against the server roster, and commits them as a minimal batch of calls to
//! the department administration API.

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod models;
pub mod roster;

pub use errors::RosterError;
