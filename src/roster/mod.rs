//! Team-membership staging and reconciliation.
//!
//! The [`Roster`] is what the server last reported, the [`PendingChangeLog`] is what the
//! operator has staged, [`project`] overlays one on the other, and the [`BatchCommitter`]
//! sends the staged work to the server. [`TeamPanel`] ties them into one session.

mod change_log;
mod committer;
mod panel;
mod projector;
mod store;

#[cfg(test)]
pub(crate) mod fake;

pub use change_log::{PendingChangeLog, Review, ReviewLine};
pub use committer::{BatchCommitter, CommitPlan, CommitReport};
pub use panel::{LoadTicket, PanelId, RosterState, SaveCompletion, SaveTicket, TeamPanel};
pub use projector::{annotations, departing_members, filter_candidates, project, Projection};
pub use store::Roster;
