//! Response normalization.
//!
//! Different API versions nest the same payload differently: a bare value, a `data` envelope,
//! or a list under a named key. Each accepted shape is an untagged serde variant here, so the
//! rest of the crate only ever sees the fixed model types.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::BulkSummary;
use crate::errors::RosterError;

#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Enveloped { data: ListInner<T> },
    Keyed(Keyed<T>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListInner<T> {
    Bare(Vec<T>),
    Keyed(Keyed<T>),
}

#[derive(Deserialize)]
struct Keyed<T> {
    #[serde(
        alias = "employees",
        alias = "members",
        alias = "teamMembers",
        alias = "items",
        alias = "results"
    )]
    list: Vec<T>,
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) => items,
            ListBody::Enveloped { data } => match data {
                ListInner::Bare(items) => items,
                ListInner::Keyed(keyed) => keyed.list,
            },
            ListBody::Keyed(keyed) => keyed.list,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ObjectBody<T> {
    Enveloped { data: ObjectInner<T> },
    Team { team: T },
    Bare(T),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ObjectInner<T> {
    Team { team: T },
    Bare(T),
}

impl<T> ObjectBody<T> {
    fn into_inner(self) -> T {
        match self {
            ObjectBody::Enveloped { data } => match data {
                ObjectInner::Team { team } => team,
                ObjectInner::Bare(item) => item,
            },
            ObjectBody::Team { team } => team,
            ObjectBody::Bare(item) => item,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BulkBody {
    Wrapped { summary: BulkSummary },
    Flat(BulkSummary),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorDetail },
    Flat { message: String },
    Text { error: String },
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Decode a collection response. `what` names the collection in error messages.
pub fn decode_list<T: DeserializeOwned>(body: &str, what: &str) -> Result<Vec<T>, RosterError> {
    serde_json::from_str::<ListBody<T>>(body)
        .map(ListBody::into_vec)
        .map_err(|e| RosterError::Decode(format!("Unexpected {} response: {}", what, e)))
}

/// Decode a single-record response.
pub fn decode_object<T: DeserializeOwned>(body: &str, what: &str) -> Result<T, RosterError> {
    serde_json::from_str::<ObjectBody<T>>(body)
        .map(ObjectBody::into_inner)
        .map_err(|e| RosterError::Decode(format!("Unexpected {} response: {}", what, e)))
}

/// Like [`decode_object`], but an empty body (e.g. `204 No Content`) yields `None`.
pub fn decode_optional_object<T: DeserializeOwned>(
    body: &str,
    what: &str,
) -> Result<Option<T>, RosterError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    decode_object(body, what).map(Some)
}

/// Decode a bulk membership response. An empty body means every requested id succeeded.
pub fn decode_bulk(body: &str, requested: usize) -> Result<BulkSummary, RosterError> {
    if body.trim().is_empty() {
        return Ok(BulkSummary {
            succeeded: requested as u32,
            failed: Vec::new(),
        });
    }

    let body: BulkBody = decode_object(body, "bulk membership")?;
    Ok(match body {
        BulkBody::Wrapped { summary } => summary,
        BulkBody::Flat(summary) => summary,
    })
}

/// Pull the server's message out of an error body, verbatim, if it has one.
pub fn error_message(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    let message = match parsed {
        ErrorBody::Nested { error } => error.message,
        ErrorBody::Flat { message } => message,
        ErrorBody::Text { error } => error,
    };
    if message.trim().is_empty() {
        None
    } else {
        Some(message)
    }
}
