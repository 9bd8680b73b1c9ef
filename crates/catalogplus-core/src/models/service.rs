//! Service names addressable through the gateway

use serde::{Deserialize, Serialize};

/// A service requested via the first path segment (`/search`, `/typeahead`, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Service {
    /// Paged result list
    #[serde(rename = "search")]
    Search,
    /// Autocomplete suggestions, JSON only
    #[serde(rename = "typeahead")]
    Typeahead,
    /// Full records for a set of ids
    #[serde(rename = "getRecords")]
    GetRecords,
    /// Hit count only, JSON only
    #[serde(rename = "getRecordCount")]
    GetRecordCount,
    /// Virtual classification browsing
    #[serde(rename = "classification")]
    Classification,
    /// Result set for a single class id (`/class/<id>`)
    #[serde(rename = "class")]
    Class,
}

impl Service {
    /// Wire name as it appears in the request path
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Search => "search",
            Service::Typeahead => "typeahead",
            Service::GetRecords => "getRecords",
            Service::GetRecordCount => "getRecordCount",
            Service::Classification => "classification",
            Service::Class => "class",
        }
    }

    /// Services answering with JSON regardless of the caller's tier
    pub fn is_json_only(&self) -> bool {
        matches!(self, Service::Typeahead | Service::GetRecordCount)
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Service {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(Service::Search),
            "typeahead" => Ok(Service::Typeahead),
            "getRecords" => Ok(Service::GetRecords),
            "getRecordCount" => Ok(Service::GetRecordCount),
            "classification" => Ok(Service::Classification),
            "class" => Ok(Service::Class),
            _ => Err(format!("Unknown service: '{}'", s)),
        }
    }
}
