//! Employee records as the department API reports them.

use serde::{Deserialize, Serialize};

/// An employee of the department. This crate only ever reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    pub id: String,
    #[serde(default, alias = "first_name")]
    pub first_name: String,
    #[serde(default, alias = "last_name")]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub position: String,
    #[serde(default = "default_active", alias = "active", alias = "is_active")]
    pub is_active: bool,
    /// Back-reference to the team membership that owns this employee, if any.
    #[serde(
        default,
        alias = "team_member_id",
        alias = "membershipId",
        alias = "teamMembershipId",
        skip_serializing_if = "Option::is_none"
    )]
    pub team_member_id: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Employee {
    /// Display name, falling back to the email when both name parts are blank.
    pub fn full_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if name.is_empty() {
            self.email.clone()
        } else {
            name.to_string()
        }
    }

    /// Case-insensitive match against name, email and position.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.full_name(), &self.email, &self.position]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
