//! Pending change log and the operator actions that edit it.
//!
//! Every staging action validates against the current projection, so the log never holds an
//! add and a remove for the same subject, and never points a leader change at someone who is
//! about to leave the team.

use std::fmt;

use serde::Serialize;

use super::projector::{project, Projection};
use super::store::Roster;
use crate::errors::RosterError;
use crate::models::{ChangeKind, PendingChange};

/// Ordered list of staged, unsaved changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingChangeLog {
    changes: Vec<PendingChange>,
}

impl PendingChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn changes(&self) -> &[PendingChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Gates the save/discard actions and the close confirmation.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    pub fn project(&self, roster: &Roster) -> Projection {
        project(&roster.members, &roster.unassigned, &self.changes)
    }

    /// Stage adding an unassigned employee to the team.
    pub fn stage_add(
        &mut self,
        roster: &Roster,
        employee_id: &str,
    ) -> Result<&PendingChange, RosterError> {
        let projection = self.project(roster);
        let employee = projection.candidate(employee_id).ok_or_else(|| {
            RosterError::Precondition(format!(
                "Employee {} is not in the unassigned pool",
                employee_id
            ))
        })?;

        let change = PendingChange::new(ChangeKind::Add, employee_id, employee.full_name());
        Ok(self.push(change))
    }

    /// Stage removing a current member, addressed by membership id.
    pub fn stage_remove(
        &mut self,
        roster: &Roster,
        membership_id: &str,
    ) -> Result<&PendingChange, RosterError> {
        let projection = self.project(roster);
        let member = projection.member(membership_id).ok_or_else(|| {
            RosterError::Precondition(format!("{} is not a member of the team", membership_id))
        })?;
        if member.pending {
            return Err(RosterError::Precondition(format!(
                "{} is only staged for adding; cancel the add instead",
                member.full_name()
            )));
        }
        if self.has(ChangeKind::AssignLeader, membership_id) {
            return Err(self.staged_leader_error(&member.full_name(), membership_id));
        }

        let change = PendingChange::new(ChangeKind::Remove, membership_id, member.full_name());
        Ok(self.push(change))
    }

    /// Stage a leader assignment. Earlier leader changes stay in the log; the last one saved
    /// wins on the server.
    pub fn stage_assign_leader(
        &mut self,
        roster: &Roster,
        membership_id: &str,
    ) -> Result<&PendingChange, RosterError> {
        let projection = self.project(roster);
        let member = projection.member(membership_id).ok_or_else(|| {
            RosterError::Precondition(format!("{} is not a member of the team", membership_id))
        })?;
        let latest_leader = self
            .changes
            .iter()
            .rev()
            .find(|c| c.kind == ChangeKind::AssignLeader);
        if latest_leader.is_some_and(|c| c.employee_id == membership_id) {
            return Err(RosterError::Precondition(format!(
                "{} is already the most recently staged leader",
                member.full_name()
            )));
        }

        let change =
            PendingChange::new(ChangeKind::AssignLeader, membership_id, member.full_name());
        Ok(self.push(change))
    }

    /// Remove the first entry matching `(employee_id, kind)`; `None` when nothing matched.
    pub fn cancel_change(
        &mut self,
        employee_id: &str,
        kind: ChangeKind,
    ) -> Result<Option<PendingChange>, RosterError> {
        let Some(index) = self.changes.iter().position(|c| c.is(kind, employee_id)) else {
            return Ok(None);
        };

        // A synthetic member cannot stay leader once its add is gone.
        let last_add = kind == ChangeKind::Add
            && self.changes.iter().filter(|c| c.is(kind, employee_id)).count() == 1;
        if last_add && self.has(ChangeKind::AssignLeader, employee_id) {
            let name = self.changes[index].employee_name.clone();
            return Err(self.staged_leader_error(&name, employee_id));
        }

        let removed = self.changes.remove(index);
        tracing::debug!(
            kind = ?removed.kind,
            subject = %removed.employee_id,
            "Cancelled staged change"
        );
        Ok(Some(removed))
    }

    /// Diff listing for the review step before a save.
    pub fn review(&self) -> Review {
        let mut review = Review::default();
        for change in &self.changes {
            match change.kind {
                ChangeKind::Add => review.adds += 1,
                ChangeKind::Remove => review.removes += 1,
                ChangeKind::AssignLeader => review.leader_changes += 1,
            }
            review.lines.push(ReviewLine {
                kind: change.kind,
                employee_id: change.employee_id.clone(),
                employee_name: change.employee_name.clone(),
            });
        }
        review
    }

    /// Names the leader entries the caller has to cancel first.
    fn staged_leader_error(&self, name: &str, subject_id: &str) -> RosterError {
        let entries = self
            .changes
            .iter()
            .filter(|c| c.is(ChangeKind::AssignLeader, subject_id))
            .count();
        RosterError::Precondition(format!(
            "{} is staged as leader; cancel the {} leader change(s) for {} first",
            name, entries, subject_id
        ))
    }

    fn has(&self, kind: ChangeKind, subject_id: &str) -> bool {
        self.changes.iter().any(|c| c.is(kind, subject_id))
    }

    fn push(&mut self, change: PendingChange) -> &PendingChange {
        tracing::debug!(
            kind = ?change.kind,
            subject = %change.employee_id,
            "Staged change"
        );
        self.changes.push(change);
        &self.changes[self.changes.len() - 1]
    }
}

/// One line of the review diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewLine {
    pub kind: ChangeKind,
    pub employee_id: String,
    pub employee_name: String,
}

/// The pending changes as a diff, in staging order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub lines: Vec<ReviewLine>,
    pub adds: usize,
    pub removes: usize,
    pub leader_changes: usize,
}

impl fmt::Display for Review {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(
                f,
                "{} {} ({})",
                line.kind.sign(),
                line.employee_name,
                line.kind.label()
            )?;
        }
        write!(
            f,
            "{} to add, {} to remove, {} leader change(s)",
            self.adds, self.removes, self.leader_changes
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::fake::{employee, member_record, team};

    fn roster() -> Roster {
        let mut m1 = employee("e-m1", "Maria", "One");
        m1.team_member_id = Some("tm-m1".into());
        let mut m2 = employee("e-m2", "Mark", "Two");
        m2.team_member_id = Some("tm-m2".into());
        Roster::assemble(
            team("t1", Some("e-m1")),
            &[m1, m2],
            &[
                member_record("tm-m1", Some("e-m1")),
                member_record("tm-m2", Some("e-m2")),
            ],
            vec![employee("e-u1", "Uma", "Unassigned")],
        )
        .unwrap()
    }

    #[test]
    fn test_stage_add_snapshots_name() {
        let roster = roster();
        let mut log = PendingChangeLog::new();

        let change = log.stage_add(&roster, "e-u1").unwrap();

        assert_eq!(change.kind, ChangeKind::Add);
        assert_eq!(change.employee_name, "Uma Unassigned");
        assert!(log.has_unsaved_changes());
    }

    #[test]
    fn test_stage_add_twice_is_rejected() {
        let roster = roster();
        let mut log = PendingChangeLog::new();
        log.stage_add(&roster, "e-u1").unwrap();

        let err = log.stage_add(&roster, "e-u1").unwrap_err();

        assert!(matches!(err, RosterError::Precondition(_)));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_stage_add_unknown_employee() {
        let roster = roster();
        let mut log = PendingChangeLog::new();
        assert!(log.stage_add(&roster, "e-m1").is_err());
        assert!(log.is_empty());
    }

    #[test]
    fn test_staged_add_cannot_be_removed() {
        let roster = roster();
        let mut log = PendingChangeLog::new();
        log.stage_add(&roster, "e-u1").unwrap();

        let err = log.stage_remove(&roster, "e-u1").unwrap_err();
        assert!(err.message().contains("cancel the add"));

        let cancelled = log.cancel_change("e-u1", ChangeKind::Add).unwrap();
        assert!(cancelled.is_some());
        assert!(log.is_empty());
    }

    #[test]
    fn test_cancel_add_restores_projection() {
        let roster = roster();
        let mut log = PendingChangeLog::new();
        log.stage_remove(&roster, "tm-m2").unwrap();
        let before = log.project(&roster);

        log.stage_add(&roster, "e-u1").unwrap();
        assert_ne!(log.project(&roster), before);
        log.cancel_change("e-u1", ChangeKind::Add).unwrap();

        assert_eq!(log.project(&roster), before);
    }

    #[test]
    fn test_removed_member_cannot_be_removed_again_or_promoted() {
        let roster = roster();
        let mut log = PendingChangeLog::new();
        log.stage_remove(&roster, "tm-m2").unwrap();

        assert!(log.stage_remove(&roster, "tm-m2").is_err());
        assert!(log.stage_assign_leader(&roster, "tm-m2").is_err());
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_leader_changes_accumulate() {
        let roster = roster();
        let mut log = PendingChangeLog::new();

        log.stage_assign_leader(&roster, "tm-m2").unwrap();
        log.stage_assign_leader(&roster, "tm-m1").unwrap();
        log.stage_assign_leader(&roster, "tm-m2").unwrap();

        assert_eq!(log.len(), 3);
        assert!(log.stage_assign_leader(&roster, "tm-m2").is_err());
    }

    #[test]
    fn test_current_leader_can_be_staged() {
        let roster = roster();
        let mut log = PendingChangeLog::new();
        assert!(log.stage_assign_leader(&roster, "tm-m1").is_ok());
    }

    #[test]
    fn test_pending_leader_blocks_remove_and_cancel_add() {
        let roster = roster();
        let mut log = PendingChangeLog::new();
        log.stage_assign_leader(&roster, "tm-m2").unwrap();
        assert!(log.stage_remove(&roster, "tm-m2").is_err());

        log.stage_add(&roster, "e-u1").unwrap();
        log.stage_assign_leader(&roster, "e-u1").unwrap();
        let err = log.cancel_change("e-u1", ChangeKind::Add).unwrap_err();
        assert_eq!(
            err.message(),
            "Uma Unassigned is staged as leader; cancel the 1 leader change(s) for e-u1 first"
        );

        log.cancel_change("e-u1", ChangeKind::AssignLeader).unwrap();
        assert!(log.cancel_change("e-u1", ChangeKind::Add).unwrap().is_some());
    }

    #[test]
    fn test_cancel_removes_only_first_match() {
        let roster = roster();
        let mut log = PendingChangeLog::new();
        log.stage_assign_leader(&roster, "tm-m2").unwrap();
        log.stage_assign_leader(&roster, "tm-m1").unwrap();
        log.stage_assign_leader(&roster, "tm-m2").unwrap();

        log.cancel_change("tm-m2", ChangeKind::AssignLeader).unwrap();

        let subjects: Vec<_> = log
            .changes()
            .iter()
            .map(|c| c.employee_id.as_str())
            .collect();
        assert_eq!(subjects, ["tm-m1", "tm-m2"]);
        assert!(log
            .cancel_change("tm-m9", ChangeKind::Remove)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_review_lists_changes_in_order() {
        let roster = roster();
        let mut log = PendingChangeLog::new();
        log.stage_remove(&roster, "tm-m2").unwrap();
        log.stage_add(&roster, "e-u1").unwrap();
        log.stage_assign_leader(&roster, "tm-m1").unwrap();

        let review = log.review();

        assert_eq!((review.adds, review.removes, review.leader_changes), (1, 1, 1));
        assert_eq!(
            review.to_string(),
            "- Mark Two (will be removed)\n\
             + Uma Unassigned (will be added)\n\
             * Maria One (will be leader)\n\
             1 to add, 1 to remove, 1 leader change(s)"
        );
    }
}
