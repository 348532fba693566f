//! Data models for the team roster client.
//!
//! Field names follow the department API's camelCase JSON; common snake_case spellings are
//! accepted as aliases.

mod change;
mod employee;
mod team;

pub use change::*;
pub use employee::*;
pub use team::*;
