//! Batch committer: turns the pending change log into the fewest server calls.
//!
//! Phases run in a fixed order (adds, removes, leader changes) so a member added in this
//! batch can be made leader in the same batch. A failing phase stops the batch; phases that
//! already completed are not rolled back.

use serde::Serialize;

use super::projector::project;
use super::store::Roster;
use crate::api::{BulkSummary, DepartmentApi};
use crate::errors::{RosterError, SavePhase};
use crate::models::{ChangeKind, PendingChange};

/// Server calls derived from a change log, with every subject translated to an employee id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitPlan {
    pub add_ids: Vec<String>,
    /// Owning employee ids of the memberships to remove.
    pub remove_ids: Vec<String>,
    /// Owning employee ids, one call each, in log order.
    pub leader_ids: Vec<String>,
}

impl CommitPlan {
    /// Partition `changes` by kind and translate membership ids to owning employee ids.
    pub fn build(roster: &Roster, changes: &[PendingChange]) -> Result<Self, RosterError> {
        let projection = project(&roster.members, &roster.unassigned, changes);
        let mut plan = Self::default();

        for change in changes {
            match change.kind {
                ChangeKind::Add => plan.add_ids.push(change.employee_id.clone()),
                ChangeKind::Remove => {
                    let member = roster.member(&change.employee_id).ok_or_else(|| {
                        RosterError::Precondition(format!(
                            "Cannot remove {}: not a member of the loaded roster",
                            change.employee_name
                        ))
                    })?;
                    plan.remove_ids.push(member.employee_id.clone());
                }
                ChangeKind::AssignLeader => {
                    // Synthetic members carry their employee id as membership id.
                    let member = projection.member(&change.employee_id).ok_or_else(|| {
                        RosterError::Precondition(format!(
                            "Cannot make {} leader: not a member after this save",
                            change.employee_name
                        ))
                    })?;
                    plan.leader_ids.push(member.employee_id.clone());
                }
            }
        }

        Ok(plan)
    }

    pub fn is_empty(&self) -> bool {
        self.add_ids.is_empty() && self.remove_ids.is_empty() && self.leader_ids.is_empty()
    }

    /// Number of server calls the plan issues.
    pub fn call_count(&self) -> usize {
        usize::from(!self.add_ids.is_empty())
            + usize::from(!self.remove_ids.is_empty())
            + self.leader_ids.len()
    }
}

/// What a successful batch did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReport {
    pub added: u32,
    pub removed: u32,
    pub leader_calls: usize,
    pub final_leader: Option<String>,
    /// Employees the server skipped inside an otherwise successful bulk call.
    pub warnings: Vec<String>,
}

/// Executes a [`CommitPlan`] against one team.
pub struct BatchCommitter<'a, A> {
    api: &'a A,
    department_id: &'a str,
    team_id: &'a str,
}

impl<'a, A: DepartmentApi> BatchCommitter<'a, A> {
    pub fn new(api: &'a A, department_id: &'a str, team_id: &'a str) -> Self {
        Self {
            api,
            department_id,
            team_id,
        }
    }

    /// Run the plan. Stops at the first failing call and reports it as a failure of that
    /// phase; there is no automatic retry.
    pub async fn execute(&self, plan: &CommitPlan) -> Result<CommitReport, RosterError> {
        let mut report = CommitReport::default();
        tracing::info!(
            team_id = self.team_id,
            adds = plan.add_ids.len(),
            removes = plan.remove_ids.len(),
            leader_changes = plan.leader_ids.len(),
            "Committing roster changes"
        );

        if !plan.add_ids.is_empty() {
            let summary = self
                .api
                .bulk_add_members(self.department_id, self.team_id, &plan.add_ids)
                .await
                .map_err(|e| fail(SavePhase::Add, e))?;
            report.added = summary.succeeded;
            collect_warnings(SavePhase::Add, &summary, &mut report.warnings);
            tracing::info!(added = summary.succeeded, "Bulk add completed");
        }

        if !plan.remove_ids.is_empty() {
            let summary = self
                .api
                .bulk_remove_members(self.department_id, self.team_id, &plan.remove_ids)
                .await
                .map_err(|e| fail(SavePhase::Remove, e))?;
            report.removed = summary.succeeded;
            collect_warnings(SavePhase::Remove, &summary, &mut report.warnings);
            tracing::info!(removed = summary.succeeded, "Bulk remove completed");
        }

        for leader_id in &plan.leader_ids {
            let team = self
                .api
                .set_team_leader(self.department_id, self.team_id, leader_id)
                .await
                .map_err(|e| fail(SavePhase::AssignLeader, e))?;
            report.leader_calls += 1;
            report.final_leader = team
                .and_then(|t| t.leader_id)
                .or_else(|| Some(leader_id.clone()));
            tracing::debug!(leader_id = %leader_id, "Leader assigned");
        }

        Ok(report)
    }
}

fn fail(phase: SavePhase, err: RosterError) -> RosterError {
    tracing::error!("Save phase '{}' failed: {}", phase.as_str(), err);
    err.in_phase(phase)
}

fn collect_warnings(phase: SavePhase, summary: &BulkSummary, warnings: &mut Vec<String>) {
    for skipped in &summary.failed {
        tracing::warn!(
            employee_id = %skipped.id,
            "Server skipped employee during {}",
            phase.as_str()
        );
        warnings.push(format!(
            "Could not {} for {}",
            phase.as_str(),
            skipped.describe()
        ));
    }
}
