//! Gateway configuration
//!
//! Loaded from the `[service]`, `[http]`, `[access]` and `[[endpoints]]`
//! sections of the daemon's TOML file. Everything here is read-only after
//! startup.

use catalogplus_core::Service;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid configuration detected while building the application state
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An access range entry is neither an address, a CIDR block nor a prefix
    #[error("Invalid address range '{entry}': {reason}")]
    InvalidRange { entry: String, reason: String },

    /// A configured header value contains characters not allowed in HTTP
    #[error("Invalid value for header {name}: '{value}'")]
    InvalidHeader { name: &'static str, value: String },

    /// Two endpoints share one mount path
    #[error("Endpoint path '{0}' is configured more than once")]
    DuplicateEndpoint(String),
}

/// Configuration consumed by the HTTP layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub access: AccessConfig,
    /// Mounted endpoint variants; defaults to the general catalog endpoint at `/`
    #[serde(default = "default_endpoints")]
    pub endpoints: Vec<EndpointConfig>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::default(),
            http: HttpConfig::default(),
            access: AccessConfig::default(),
            endpoints: default_endpoints(),
        }
    }
}

/// Identity of this gateway instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Name used in log lines, alert subjects and `/health`
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_service_name() -> String {
    "CatalogPlus".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_port(),
        }
    }
}

/// Static response headers (CORS and caching)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_allow_origin")]
    pub allow_origin: String,
    #[serde(default = "default_allow_methods")]
    pub allow_methods: String,
    #[serde(default = "default_allow_headers")]
    pub allow_headers: String,
    /// Value of the `Accept` header advertised on `OPTIONS`
    #[serde(default = "default_accept")]
    pub accept: String,
    #[serde(default = "default_cache_control")]
    pub cache_control: String,
}

fn default_allow_origin() -> String {
    "*".to_string()
}

fn default_allow_methods() -> String {
    "GET, OPTIONS".to_string()
}

fn default_allow_headers() -> String {
    "Accept, Accept-Language, Content-Type".to_string()
}

fn default_accept() -> String {
    "text/html, application/xml, application/json".to_string()
}

fn default_cache_control() -> String {
    "no-cache, no-store, must-revalidate".to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            allow_origin: default_allow_origin(),
            allow_methods: default_allow_methods(),
            allow_headers: default_allow_headers(),
            accept: default_accept(),
            cache_control: default_cache_control(),
        }
    }
}

/// Address ranges of the three access tiers. A missing tier never matches.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub tu: Option<AccessRangeConfig>,
    #[serde(default)]
    pub ub: Option<AccessRangeConfig>,
    #[serde(default)]
    pub ub_52b_iba: Option<AccessRangeConfig>,
}

/// Inclusion and exception entries of one tier.
///
/// Entries are CIDR blocks (`129.217.0.0/16`), single addresses or
/// dotted prefixes (`129.217.*`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessRangeConfig {
    #[serde(default)]
    pub ranges: Vec<String>,
    #[serde(default)]
    pub exceptions: Vec<String>,
}

/// Which service set and paging limits an endpoint applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointVariant {
    /// `search, typeahead, getRecords, getRecordCount, classification`
    Catalog,
    /// `search, class, typeahead` with a flat start cap
    Service,
}

impl EndpointVariant {
    /// Services reachable through this variant
    pub fn services(&self) -> &'static [Service] {
        match self {
            EndpointVariant::Catalog => &[
                Service::Search,
                Service::Typeahead,
                Service::GetRecords,
                Service::GetRecordCount,
                Service::Classification,
            ],
            EndpointVariant::Service => &[Service::Search, Service::Class, Service::Typeahead],
        }
    }

    pub fn offers(&self, service: Service) -> bool {
        self.services().contains(&service)
    }

    /// Services whose `rows`/`start` are subject to the paging limits
    pub fn is_paged(&self, service: Service) -> bool {
        match self {
            EndpointVariant::Catalog => matches!(service, Service::Search | Service::GetRecordCount),
            EndpointVariant::Service => service == Service::Search,
        }
    }

    /// Services that only ever answer in JSON
    pub fn is_json_only(&self, service: Service) -> bool {
        match self {
            EndpointVariant::Catalog => service.is_json_only(),
            EndpointVariant::Service => service == Service::Typeahead,
        }
    }
}

/// One mounted endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub variant: EndpointVariant,
    /// Mount path, e.g. `/catalogplus`; `/` or empty mounts at the root
    #[serde(default)]
    pub path: String,
    /// Short tag used in alert subjects; defaults to the variant name
    #[serde(default)]
    pub tag: Option<String>,
    /// Treat every caller as UB-internal instead of classifying the address.
    /// Only meant for trusted deployments behind an authenticating proxy.
    #[serde(default)]
    pub assume_ub_internal: bool,
}

impl EndpointConfig {
    pub fn new(variant: EndpointVariant, path: impl Into<String>) -> Self {
        Self {
            variant,
            path: path.into(),
            tag: None,
            assume_ub_internal: false,
        }
    }

    /// Mount path normalized to `/x/y`; the root is `""`
    pub fn mount_path(&self) -> String {
        let trimmed = self.path.trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }

    pub fn tag(&self) -> &str {
        match (&self.tag, self.variant) {
            (Some(tag), _) => tag,
            (None, EndpointVariant::Catalog) => "catalog",
            (None, EndpointVariant::Service) => "service",
        }
    }
}

fn default_endpoints() -> Vec<EndpointConfig> {
    vec![EndpointConfig::new(EndpointVariant::Catalog, "/")]
}
