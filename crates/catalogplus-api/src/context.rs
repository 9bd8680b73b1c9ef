//! Per-request context
//!
//! Built once when a request enters the gateway and only read afterwards.
//! Nothing in here is shared between requests.

use axum::http::HeaderMap;
use catalogplus_core::{AccessTier, Format, Language, RenderParams, Service};

use crate::access::TierClassifier;
use crate::config::{EndpointConfig, EndpointVariant};
use crate::negotiate;
use crate::params::RawQuery;

/// Everything the dispatcher needs to know about one request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Path below the endpoint mount point, e.g. `/search`
    pub path: String,
    /// Requested service name, `""` if the path does not name one
    pub service_name: String,
    /// Second path segment (`/class/<id>`)
    pub resource_id: Option<String>,
    pub format: Format,
    pub language: Language,
    pub tier: AccessTier,
    pub debug: bool,
    /// Rendering mode (`simplehit`, `embedded`, ...)
    pub mode: String,
    pub query: RawQuery,
    /// Raw `X-Forwarded-For` header
    pub forwarded_for: Option<String>,
    /// Absolute request URL without the query string
    pub request_url: String,
}

impl RequestContext {
    pub fn new(
        endpoint: &EndpointConfig,
        classifier: &TierClassifier,
        path: &str,
        request_url: String,
        query: RawQuery,
        headers: &HeaderMap,
    ) -> Self {
        let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

        let forwarded_for = header("x-forwarded-for").map(str::to_string);
        let mut tier = classifier.classify(forwarded_for.as_deref());
        if endpoint.assume_ub_internal {
            tier.ub_internal = true;
        }

        let (format, language) = negotiate::negotiate(
            query.get("format"),
            header("accept"),
            query.get("l"),
            header("accept-language"),
        );

        let (service_name, resource_id) = service_from_path(endpoint.variant, path);

        Self {
            path: path.to_string(),
            service_name,
            resource_id,
            format,
            language,
            tier,
            debug: query.get("debug") == Some("1"),
            mode: query.get("mode").unwrap_or_default().to_string(),
            forwarded_for,
            request_url,
            query,
        }
    }

    /// Append query string and client address to an error message
    pub fn decorate(&self, message: &str) -> String {
        format!(
            "{} \n\tQuery: {}\n\tIP: {}",
            message,
            self.query.as_str(),
            self.forwarded_for.as_deref().unwrap_or_default()
        )
    }

    /// Base render parameters for HTML output of `service`
    pub fn render_params(&self, service: Option<Service>) -> RenderParams {
        let mut params = RenderParams::new(&self.language, self.tier);
        params.service = service;
        params.debug = self.debug;
        params.mode = self.mode.clone();
        params
    }
}

/// Split the service name (and, for the service variant, a resource id)
/// off the path.
///
/// The catalog variant only accepts single-segment paths; anything deeper
/// resolves to an empty, unknown service.
fn service_from_path(variant: EndpointVariant, path: &str) -> (String, Option<String>) {
    let mut segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
    while segments.len() > 1 && segments.last() == Some(&"") {
        segments.pop();
    }

    match variant {
        EndpointVariant::Catalog if segments.len() == 1 => (segments[0].to_string(), None),
        EndpointVariant::Catalog => (String::new(), None),
        EndpointVariant::Service => (
            segments[0].to_string(),
            segments.get(1).filter(|s| !s.is_empty()).map(|s| s.to_string()),
        ),
    }
}
