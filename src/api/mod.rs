//! Department API contract.
//!
//! The roster core talks to the server only through [`DepartmentApi`]. Every response is
//! normalized by [`decode`] before it reaches the core, so nothing downstream branches on
//! response shape.

pub mod client;
pub mod decode;

pub use client::HttpDepartmentApi;

use serde::{Deserialize, Serialize};

use crate::errors::RosterError;
use crate::models::{Employee, MembershipRecord, Team};

/// Outcome summary returned by the bulk membership endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSummary {
    #[serde(default)]
    pub succeeded: u32,
    #[serde(default)]
    pub failed: Vec<EmployeeRef>,
}

/// An employee the server refused to process inside an otherwise successful bulk call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeRef {
    #[serde(alias = "employeeId", alias = "employee_id")]
    pub id: String,
    #[serde(default, alias = "fullName", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        alias = "message",
        alias = "error",
        skip_serializing_if = "Option::is_none"
    )]
    pub reason: Option<String>,
}

impl EmployeeRef {
    pub fn describe(&self) -> String {
        let who = self.name.as_deref().unwrap_or(&self.id);
        match &self.reason {
            Some(reason) => format!("{} ({})", who, reason),
            None => who.to_string(),
        }
    }
}

/// Reads and writes the roster core needs from the department administration API.
///
/// Implementations supply their own credentials; callers pass department and team ids
/// explicitly on every call.
#[allow(async_fn_in_trait)]
pub trait DepartmentApi {
    /// All employees of the department, assigned or not.
    async fn fetch_department_employees(
        &self,
        department_id: &str,
    ) -> Result<Vec<Employee>, RosterError>;

    /// Employees of the department that belong to no team.
    async fn fetch_unassigned_employees(
        &self,
        department_id: &str,
    ) -> Result<Vec<Employee>, RosterError>;

    async fn fetch_team_members(
        &self,
        department_id: &str,
        team_id: &str,
    ) -> Result<Vec<MembershipRecord>, RosterError>;

    async fn fetch_team(&self, department_id: &str, team_id: &str) -> Result<Team, RosterError>;

    async fn bulk_add_members(
        &self,
        department_id: &str,
        team_id: &str,
        employee_ids: &[String],
    ) -> Result<BulkSummary, RosterError>;

    /// Takes employee ids, not membership ids.
    async fn bulk_remove_members(
        &self,
        department_id: &str,
        team_id: &str,
        employee_ids: &[String],
    ) -> Result<BulkSummary, RosterError>;

    /// The updated team, or `None` when the server acknowledged without a body.
    async fn set_team_leader(
        &self,
        department_id: &str,
        team_id: &str,
        leader_id: &str,
    ) -> Result<Option<Team>, RosterError>;
}
