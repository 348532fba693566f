//! Staged, not-yet-saved roster changes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a staged change does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeKind {
    Add,
    Remove,
    AssignLeader,
}

impl ChangeKind {
    /// Annotation shown next to an affected row.
    pub fn label(&self) -> &'static str {
        match self {
            ChangeKind::Add => "will be added",
            ChangeKind::Remove => "will be removed",
            ChangeKind::AssignLeader => "will be leader",
        }
    }

    /// Diff marker used in the review listing.
    pub fn sign(&self) -> char {
        match self {
            ChangeKind::Add => '+',
            ChangeKind::Remove => '-',
            ChangeKind::AssignLeader => '*',
        }
    }
}

/// One entry of the pending change log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingChange {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Employee id for `Add`, membership id for `Remove` and `AssignLeader`.
    pub employee_id: String,
    /// Name captured when the change was staged. Never recomputed.
    pub employee_name: String,
    pub staged_at: DateTime<Utc>,
}

impl PendingChange {
    pub fn new(kind: ChangeKind, employee_id: impl Into<String>, employee_name: String) -> Self {
        Self {
            kind,
            employee_id: employee_id.into(),
            employee_name,
            staged_at: Utc::now(),
        }
    }

    pub fn is(&self, kind: ChangeKind, subject_id: &str) -> bool {
        self.kind == kind && self.employee_id == subject_id
    }
}
