//! In-memory department API used by the unit tests.
//!
//! Writes are applied to the in-memory state so a post-save reload sees them, and every write
//! call is recorded in order.

use std::sync::Mutex;

use crate::api::{BulkSummary, DepartmentApi, EmployeeRef};
use crate::errors::RosterError;
use crate::models::{Employee, MembershipRecord, Team};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    BulkAdd(Vec<String>),
    BulkRemove(Vec<String>),
    SetLeader(String),
}

#[derive(Default)]
struct Failures {
    unassigned_fetch: bool,
    bulk_add: Option<String>,
    bulk_add_transport: bool,
    bulk_remove: Option<String>,
    /// 1-based index of the leader call that fails.
    leader_call: Option<usize>,
    add_rejects: Vec<String>,
    leader_without_body: bool,
}

struct FakeState {
    employees: Vec<Employee>,
    memberships: Vec<MembershipRecord>,
    team: Team,
    calls: Vec<Call>,
    fetches: usize,
    failures: Failures,
}

pub struct FakeDepartmentApi {
    state: Mutex<FakeState>,
}

pub fn employee(id: &str, first: &str, last: &str) -> Employee {
    Employee {
        id: id.to_string(),
        first_name: first.to_string(),
        last_name: last.to_string(),
        email: format!("{}@example.com", first.to_lowercase()),
        position: "Engineer".to_string(),
        is_active: true,
        team_member_id: None,
    }
}

pub fn member_record(id: &str, main_employee_id: Option<&str>) -> MembershipRecord {
    MembershipRecord {
        id: id.to_string(),
        main_employee_id: main_employee_id.map(str::to_string),
        first_name: String::new(),
        last_name: String::new(),
        email: String::new(),
        position: String::new(),
    }
}

pub fn team(id: &str, leader_id: Option<&str>) -> Team {
    Team {
        id: id.to_string(),
        name: "Platform".to_string(),
        description: None,
        leader_id: leader_id.map(str::to_string),
        member_count: 0,
    }
}

impl FakeDepartmentApi {
    /// Team `t1` with members M1 (leader) and M2, and one unassigned employee U1.
    pub fn scenario() -> Self {
        let mut m1 = employee("e-m1", "Maria", "One");
        m1.team_member_id = Some("tm-m1".into());
        let mut m2 = employee("e-m2", "Mark", "Two");
        m2.team_member_id = Some("tm-m2".into());
        let u1 = employee("e-u1", "Uma", "Unassigned");

        let memberships = vec![
            member_record("tm-m1", Some("e-m1")),
            member_record("tm-m2", Some("e-m2")),
        ];

        Self {
            state: Mutex::new(FakeState {
                employees: vec![m1, m2, u1],
                memberships,
                team: team("t1", Some("e-m1")),
                calls: Vec::new(),
                fetches: 0,
                failures: Failures::default(),
            }),
        }
    }

    pub fn with_unassigned(self, employee: Employee) -> Self {
        self.state.lock().unwrap().employees.push(employee);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of team-record fetches, one per roster load.
    pub fn loads(&self) -> usize {
        self.state.lock().unwrap().fetches
    }

    pub fn leader(&self) -> Option<String> {
        self.state.lock().unwrap().team.leader_id.clone()
    }

    pub fn fail_unassigned_fetch(&self) {
        self.state.lock().unwrap().failures.unassigned_fetch = true;
    }

    pub fn fail_bulk_add(&self, message: &str) {
        self.state.lock().unwrap().failures.bulk_add = Some(message.to_string());
    }

    /// The bulk add never gets a response, as when the connection drops.
    pub fn drop_bulk_add(&self) {
        self.state.lock().unwrap().failures.bulk_add_transport = true;
    }

    pub fn fail_bulk_remove(&self, message: &str) {
        self.state.lock().unwrap().failures.bulk_remove = Some(message.to_string());
    }

    pub fn fail_leader_call(&self, nth: usize) {
        self.state.lock().unwrap().failures.leader_call = Some(nth);
    }

    /// Leader calls succeed but answer without the updated team.
    pub fn acknowledge_leader_without_body(&self) {
        self.state.lock().unwrap().failures.leader_without_body = true;
    }

    pub fn reject_on_add(&self, employee_id: &str) {
        self.state
            .lock()
            .unwrap()
            .failures
            .add_rejects
            .push(employee_id.to_string());
    }

    pub fn heal(&self) {
        self.state.lock().unwrap().failures = Failures::default();
    }
}

fn rejected(message: &str) -> RosterError {
    RosterError::Api {
        status: 422,
        message: message.to_string(),
    }
}

impl DepartmentApi for FakeDepartmentApi {
    async fn fetch_department_employees(
        &self,
        _department_id: &str,
    ) -> Result<Vec<Employee>, RosterError> {
        Ok(self.state.lock().unwrap().employees.clone())
    }

    async fn fetch_unassigned_employees(
        &self,
        _department_id: &str,
    ) -> Result<Vec<Employee>, RosterError> {
        let state = self.state.lock().unwrap();
        if state.failures.unassigned_fetch {
            return Err(RosterError::Transport(
                "unassigned employees unavailable".to_string(),
            ));
        }
        Ok(state
            .employees
            .iter()
            .filter(|e| e.team_member_id.is_none())
            .cloned()
            .collect())
    }

    async fn fetch_team_members(
        &self,
        _department_id: &str,
        _team_id: &str,
    ) -> Result<Vec<MembershipRecord>, RosterError> {
        Ok(self.state.lock().unwrap().memberships.clone())
    }

    async fn fetch_team(&self, _department_id: &str, _team_id: &str) -> Result<Team, RosterError> {
        let mut state = self.state.lock().unwrap();
        state.fetches += 1;
        Ok(state.team.clone())
    }

    async fn bulk_add_members(
        &self,
        _department_id: &str,
        _team_id: &str,
        employee_ids: &[String],
    ) -> Result<BulkSummary, RosterError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::BulkAdd(employee_ids.to_vec()));
        if state.failures.bulk_add_transport {
            return Err(RosterError::Transport(
                "Request failed: connection reset by peer".to_string(),
            ));
        }
        if let Some(message) = &state.failures.bulk_add {
            return Err(rejected(message));
        }

        let mut summary = BulkSummary::default();
        for id in employee_ids {
            if state.failures.add_rejects.contains(id) {
                summary.failed.push(EmployeeRef {
                    id: id.clone(),
                    name: None,
                    reason: Some("inactive".to_string()),
                });
                continue;
            }
            let membership_id = format!("tm-{}", id.trim_start_matches("e-"));
            if let Some(employee) = state.employees.iter_mut().find(|e| &e.id == id) {
                employee.team_member_id = Some(membership_id.clone());
            }
            state
                .memberships
                .push(member_record(&membership_id, Some(id)));
            summary.succeeded += 1;
        }
        Ok(summary)
    }

    async fn bulk_remove_members(
        &self,
        _department_id: &str,
        _team_id: &str,
        employee_ids: &[String],
    ) -> Result<BulkSummary, RosterError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::BulkRemove(employee_ids.to_vec()));
        if let Some(message) = &state.failures.bulk_remove {
            return Err(rejected(message));
        }

        let mut summary = BulkSummary::default();
        for id in employee_ids {
            state
                .memberships
                .retain(|m| m.main_employee_id.as_deref() != Some(id.as_str()));
            if let Some(employee) = state.employees.iter_mut().find(|e| &e.id == id) {
                employee.team_member_id = None;
            }
            summary.succeeded += 1;
        }
        Ok(summary)
    }

    async fn set_team_leader(
        &self,
        _department_id: &str,
        _team_id: &str,
        leader_id: &str,
    ) -> Result<Option<Team>, RosterError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::SetLeader(leader_id.to_string()));
        let leader_calls = state
            .calls
            .iter()
            .filter(|c| matches!(c, Call::SetLeader(_)))
            .count();
        if state.failures.leader_call == Some(leader_calls) {
            return Err(rejected("Leader must be an active team member"));
        }

        state.team.leader_id = Some(leader_id.to_string());
        if state.failures.leader_without_body {
            return Ok(None);
        }
        Ok(Some(state.team.clone()))
    }
}
