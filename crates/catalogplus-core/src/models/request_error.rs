//! Structured error returned to clients

use serde::{Deserialize, Serialize};

/// Error body rendered in the negotiated format.
///
/// Serialized as `{"code":..,"error":..,"description":..}` in JSON and as
/// `<requestError><code/><error/><description/></requestError>` in XML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename = "requestError")]
pub struct RequestError {
    pub code: u16,
    pub error: String,
    pub description: String,
}

impl RequestError {
    pub fn bad_request(description: impl Into<String>) -> Self {
        Self {
            code: 400,
            error: "BAD REQUEST".to_string(),
            description: description.into(),
        }
    }

    pub fn service_unavailable(description: impl Into<String>) -> Self {
        Self {
            code: 503,
            error: "SERVICE_UNAVAILABLE".to_string(),
            description: description.into(),
        }
    }

    pub fn internal(description: impl Into<String>) -> Self {
        Self {
            code: 500,
            error: "INTERNAL_SERVER_ERROR".to_string(),
            description: description.into(),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.code, self.error, self.description)
    }
}
