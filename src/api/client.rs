//! reqwest-backed implementation of [`DepartmentApi`].

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Url};
use serde_json::json;

use super::decode::{
    decode_bulk, decode_list, decode_object, decode_optional_object, error_message,
};
use super::{BulkSummary, DepartmentApi};
use crate::auth::CredentialProvider;
use crate::config::Config;
use crate::errors::RosterError;
use crate::models::{Employee, MembershipRecord, Team};

/// HTTP client for the department administration API.
#[derive(Clone)]
pub struct HttpDepartmentApi {
    client: Client,
    base_url: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpDepartmentApi {
    pub fn new(
        config: &Config,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self, RosterError> {
        let base_url = Url::parse(&config.api_base_url)
            .map_err(|e| RosterError::Config(format!("Invalid API base URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(RosterError::Config(format!(
                "API base URL cannot carry paths: {}",
                base_url
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("team-roster/", env!("CARGO_PKG_VERSION")))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| RosterError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Send a request and return the body of a 2xx response.
    ///
    /// Non-2xx responses become [`RosterError::Api`] carrying the server's message verbatim
    /// when the body has one.
    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<serde_json::Value>,
    ) -> Result<String, RosterError> {
        tracing::debug!(%method, %url, "Sending request");

        let mut request = self.client.request(method.clone(), url.clone());
        if let Some(value) = self.credentials.authorization()? {
            request = request.header(AUTHORIZATION, value);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            tracing::debug!(%method, %url, status = status.as_u16(), "Request succeeded");
            return Ok(text);
        }

        let message = error_message(&text)
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        tracing::warn!(%method, %url, status = status.as_u16(), "Request rejected: {}", message);
        Err(RosterError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl DepartmentApi for HttpDepartmentApi {
    async fn fetch_department_employees(
        &self,
        department_id: &str,
    ) -> Result<Vec<Employee>, RosterError> {
        let url = self.endpoint(&["departments", department_id, "employees"]);
        let body = self.send(Method::GET, url, None).await?;
        decode_list(&body, "department employees")
    }

    async fn fetch_unassigned_employees(
        &self,
        department_id: &str,
    ) -> Result<Vec<Employee>, RosterError> {
        let url = self.endpoint(&["departments", department_id, "employees", "unassigned"]);
        let body = self.send(Method::GET, url, None).await?;
        decode_list(&body, "unassigned employees")
    }

    async fn fetch_team_members(
        &self,
        department_id: &str,
        team_id: &str,
    ) -> Result<Vec<MembershipRecord>, RosterError> {
        let url = self.endpoint(&["departments", department_id, "teams", team_id, "members"]);
        let body = self.send(Method::GET, url, None).await?;
        decode_list(&body, "team members")
    }

    async fn fetch_team(&self, department_id: &str, team_id: &str) -> Result<Team, RosterError> {
        let url = self.endpoint(&["departments", department_id, "teams", team_id]);
        let body = self.send(Method::GET, url, None).await?;
        decode_object(&body, "team")
    }

    async fn bulk_add_members(
        &self,
        department_id: &str,
        team_id: &str,
        employee_ids: &[String],
    ) -> Result<BulkSummary, RosterError> {
        let url = self.endpoint(&[
            "departments",
            department_id,
            "teams",
            team_id,
            "members",
            "bulk-add",
        ]);
        let payload = json!({ "employeeIds": employee_ids });
        let body = self.send(Method::POST, url, Some(payload)).await?;
        decode_bulk(&body, employee_ids.len())
    }

    async fn bulk_remove_members(
        &self,
        department_id: &str,
        team_id: &str,
        employee_ids: &[String],
    ) -> Result<BulkSummary, RosterError> {
        let url = self.endpoint(&[
            "departments",
            department_id,
            "teams",
            team_id,
            "members",
            "bulk-remove",
        ]);
        let payload = json!({ "employeeIds": employee_ids });
        let body = self.send(Method::POST, url, Some(payload)).await?;
        decode_bulk(&body, employee_ids.len())
    }

    async fn set_team_leader(
        &self,
        department_id: &str,
        team_id: &str,
        leader_id: &str,
    ) -> Result<Option<Team>, RosterError> {
        let url = self.endpoint(&["departments", department_id, "teams", team_id, "leader"]);
        let payload = json!({ "leaderId": leader_id });
        let body = self.send(Method::PUT, url, Some(payload)).await?;
        decode_optional_object(&body, "team")
    }
}
