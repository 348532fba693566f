//! Credential providers for outgoing requests.
//!
//! The roster client never manages sessions itself; it asks a provider for the Authorization
//! header value right before each call.

use reqwest::header::HeaderValue;

use crate::errors::RosterError;

/// Supplies the Authorization header for outgoing calls.
pub trait CredentialProvider: Send + Sync {
    /// Header value to send, or `None` for unauthenticated deployments.
    fn authorization(&self) -> Result<Option<HeaderValue>, RosterError>;
}

/// A fixed bearer token, typically read from `ROSTER_API_TOKEN`.
#[derive(Clone)]
pub struct StaticToken {
    token: Option<String>,
}

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token itself.
        f.debug_struct("StaticToken")
            .field("configured", &self.token.is_some())
            .finish()
    }
}

impl CredentialProvider for StaticToken {
    fn authorization(&self) -> Result<Option<HeaderValue>, RosterError> {
        let Some(token) = &self.token else {
            return Ok(None);
        };

        let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| RosterError::Config("API token contains invalid characters".into()))?;
        value.set_sensitive(true);
        Ok(Some(value))
    }
}
