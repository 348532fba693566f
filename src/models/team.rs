//! Team and team-membership models.

use serde::{Deserialize, Serialize};

use super::Employee;

/// A team inside a department. Leadership is a team-level pointer, not a per-member flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, alias = "leader_id")]
    pub leader_id: Option<String>,
    /// Maintained by the server; never derived here.
    #[serde(default, alias = "member_count")]
    pub member_count: u32,
}

/// A membership record as stored server-side. Its `id` is not an employee id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    pub id: String,
    #[serde(
        default,
        alias = "main_employee_id",
        alias = "employeeId",
        skip_serializing_if = "Option::is_none"
    )]
    pub main_employee_id: Option<String>,
    #[serde(default, alias = "first_name")]
    pub first_name: String,
    #[serde(default, alias = "last_name")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub position: String,
}

/// A membership resolved against the employee list, ready to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipView {
    pub membership_id: String,
    /// The owning employee; the identity the server's write endpoints expect.
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub position: String,
    pub is_leader: bool,
    /// True for members that only exist because of a staged add.
    pub pending: bool,
}

impl MembershipView {
    /// Build the view for a server record owned by `employee_id`.
    ///
    /// Display fields prefer the live employee record and fall back to the values mirrored on
    /// the membership.
    pub fn resolve(
        record: &MembershipRecord,
        employee_id: String,
        employee: Option<&Employee>,
        leader_id: Option<&str>,
    ) -> Self {
        let pick = |live: Option<&String>, mirrored: &String| match live {
            Some(value) if !value.is_empty() => value.clone(),
            _ => mirrored.clone(),
        };

        let is_leader = leader_id == Some(employee_id.as_str());
        Self {
            membership_id: record.id.clone(),
            first_name: pick(employee.map(|e| &e.first_name), &record.first_name),
            last_name: pick(employee.map(|e| &e.last_name), &record.last_name),
            email: pick(employee.map(|e| &e.email), &record.email),
            position: pick(employee.map(|e| &e.position), &record.position),
            employee_id,
            is_leader,
            pending: false,
        }
    }

    /// Synthetic member for an employee with a staged add. No membership record exists yet, so
    /// the employee id doubles as the membership id.
    pub fn pending_add(employee: &Employee) -> Self {
        Self {
            membership_id: employee.id.clone(),
            employee_id: employee.id.clone(),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            email: employee.email.clone(),
            position: employee.position.clone(),
            is_leader: false,
            pending: true,
        }
    }

    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }
}
