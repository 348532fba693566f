//! Effective view projector.
//!
//! Derives what the roster will look like after a save by overlaying the pending change log on
//! the stored roster. Pure: inputs are only borrowed, so it is safe to call on every render.

use std::collections::HashSet;

use serde::Serialize;

use crate::models::{ChangeKind, Employee, MembershipView, PendingChange};

/// Roster as it will look once the pending changes are saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub effective_members: Vec<MembershipView>,
    pub effective_unassigned: Vec<Employee>,
}

impl Projection {
    pub fn member(&self, membership_id: &str) -> Option<&MembershipView> {
        self.effective_members
            .iter()
            .find(|m| m.membership_id == membership_id)
    }

    pub fn candidate(&self, employee_id: &str) -> Option<&Employee> {
        self.effective_unassigned
            .iter()
            .find(|e| e.id == employee_id)
    }
}

fn subjects(changes: &[PendingChange], kind: ChangeKind) -> HashSet<&str> {
    changes
        .iter()
        .filter(|c| c.kind == kind)
        .map(|c| c.employee_id.as_str())
        .collect()
}

/// Apply `changes` to the stored roster without mutating it.
///
/// Removed members drop out; employees with a staged add leave the unassigned pool and appear
/// at the end of the member list as synthetic, non-leader members.
pub fn project(
    members: &[MembershipView],
    unassigned: &[Employee],
    changes: &[PendingChange],
) -> Projection {
    let removed = subjects(changes, ChangeKind::Remove);
    let added = subjects(changes, ChangeKind::Add);

    let mut effective_members: Vec<MembershipView> = members
        .iter()
        .filter(|m| !removed.contains(m.membership_id.as_str()))
        .cloned()
        .collect();
    effective_members.extend(
        unassigned
            .iter()
            .filter(|e| added.contains(e.id.as_str()))
            .map(MembershipView::pending_add),
    );

    let effective_unassigned = unassigned
        .iter()
        .filter(|e| !added.contains(e.id.as_str()))
        .cloned()
        .collect();

    Projection {
        effective_members,
        effective_unassigned,
    }
}

/// Kinds of staged change touching `subject_id`, in log order without repeats.
pub fn annotations(changes: &[PendingChange], subject_id: &str) -> Vec<ChangeKind> {
    let mut kinds = Vec::new();
    for change in changes.iter().filter(|c| c.employee_id == subject_id) {
        if !kinds.contains(&change.kind) {
            kinds.push(change.kind);
        }
    }
    kinds
}

/// Stored members with a staged remove: absent from the projection, but still worth listing
/// next to it so the removal is visible.
pub fn departing_members<'a>(
    members: &'a [MembershipView],
    changes: &[PendingChange],
) -> Vec<&'a MembershipView> {
    let removed = subjects(changes, ChangeKind::Remove);
    members
        .iter()
        .filter(|m| removed.contains(m.membership_id.as_str()))
        .collect()
}

/// Unassigned employees matching `query`, active ones first.
pub fn filter_candidates<'a>(unassigned: &'a [Employee], query: &str) -> Vec<&'a Employee> {
    let mut matches: Vec<&Employee> = unassigned.iter().filter(|e| e.matches(query)).collect();
    // Stable sort keeps the server's ordering within each group.
    matches.sort_by_key(|e| !e.is_active);
    matches
}
