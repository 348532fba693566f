//! Roster store: the last-fetched server truth for one team.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::api::DepartmentApi;
use crate::errors::RosterError;
use crate::models::{Employee, MembershipRecord, MembershipView, Team};

/// Ground truth for one team as of `loaded_at`. Never mutated by staging.
#[derive(Debug, Clone, PartialEq)]
pub struct Roster {
    pub team: Team,
    pub members: Vec<MembershipView>,
    /// Department employees that belong to no team; the candidates for an add.
    pub unassigned: Vec<Employee>,
    pub loaded_at: DateTime<Utc>,
}

impl Roster {
    /// Fetch everything the panel needs in one concurrent round trip.
    ///
    /// All-or-nothing: if any read fails, no roster is produced.
    pub async fn load<A: DepartmentApi>(
        api: &A,
        department_id: &str,
        team_id: &str,
    ) -> Result<Self, RosterError> {
        tracing::info!(department_id, team_id, "Loading team roster");

        let (employees, unassigned, records, team) = tokio::try_join!(
            api.fetch_department_employees(department_id),
            api.fetch_unassigned_employees(department_id),
            api.fetch_team_members(department_id, team_id),
            api.fetch_team(department_id, team_id),
        )
        .map_err(|e| {
            tracing::error!(department_id, team_id, "Roster load failed: {}", e);
            RosterError::Load(format!("Failed to load team roster: {}", e.message()))
        })?;

        let roster = Self::assemble(team, &employees, &records, unassigned)?;
        tracing::info!(
            members = roster.members.len(),
            unassigned = roster.unassigned.len(),
            leader = roster.leader_id().unwrap_or("-"),
            "Team roster loaded"
        );
        Ok(roster)
    }

    /// Cross-reference membership records with the department's employees.
    ///
    /// The owning employee of a membership is the employee whose `team_member_id` points at
    /// the record; the record's own `main_employee_id` is the fallback.
    pub fn assemble(
        team: Team,
        employees: &[Employee],
        records: &[MembershipRecord],
        unassigned: Vec<Employee>,
    ) -> Result<Self, RosterError> {
        let by_membership: HashMap<&str, &Employee> = employees
            .iter()
            .filter_map(|e| e.team_member_id.as_deref().map(|m| (m, e)))
            .collect();
        let by_id: HashMap<&str, &Employee> =
            employees.iter().map(|e| (e.id.as_str(), e)).collect();

        let leader_id = team.leader_id.as_deref();
        let mut seen = HashSet::new();
        let mut members = Vec::with_capacity(records.len());

        for record in records {
            let (employee_id, employee) = match by_membership.get(record.id.as_str()) {
                Some(employee) => (employee.id.clone(), Some(*employee)),
                None => match &record.main_employee_id {
                    Some(id) => (id.clone(), by_id.get(id.as_str()).copied()),
                    None => {
                        return Err(RosterError::Load(format!(
                            "Team member {} has no owning employee",
                            record.id
                        )))
                    }
                },
            };

            if !seen.insert(employee_id.clone()) {
                tracing::warn!(
                    membership_id = %record.id,
                    employee_id = %employee_id,
                    "Duplicate membership for employee; keeping the first"
                );
                continue;
            }

            members.push(MembershipView::resolve(
                record,
                employee_id,
                employee,
                leader_id,
            ));
        }

        Ok(Self {
            team,
            members,
            unassigned,
            loaded_at: Utc::now(),
        })
    }

    pub fn leader_id(&self) -> Option<&str> {
        self.team.leader_id.as_deref()
    }

    pub fn member(&self, membership_id: &str) -> Option<&MembershipView> {
        self.members
            .iter()
            .find(|m| m.membership_id == membership_id)
    }
}
