//! Provider capabilities - the seams between the gateway and its collaborators
//!
//! The gateway never searches or classifies by itself. It hands a validated
//! request to one of the traits below and renders whatever comes back.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::{MailError, ProviderError, ProviderResult, TransformError};
use crate::models::{QueryParameters, RenderParams, Service};

/// Resource discovery backend (search engine front end).
///
/// Result methods return the fully rendered body in the requested format.
/// The gateway passes the body through untouched except for
/// `getRecordCount`, which it shrinks to the `recordCount` field.
#[async_trait]
pub trait ResourceDiscoveryService: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Render a result set as an HTML fragment
    async fn results_as_html(
        &self,
        service: Service,
        params: &QueryParameters,
        render: &RenderParams,
    ) -> ProviderResult<String> {
        let _ = (params, render);
        Err(ProviderError::NotSupported(format!("{} as html", service)))
    }

    /// Render a result set as an XML document
    async fn results_as_xml(
        &self,
        service: Service,
        params: &QueryParameters,
    ) -> ProviderResult<String> {
        let _ = params;
        Err(ProviderError::NotSupported(format!("{} as xml", service)))
    }

    /// Render a result set as a JSON document.
    ///
    /// For `getRecordCount` the document must carry a numeric top-level
    /// `recordCount` field.
    async fn results_as_json(
        &self,
        service: Service,
        params: &QueryParameters,
    ) -> ProviderResult<String>;

    /// Autocomplete suggestions for a prefix, as JSON
    async fn suggestions(&self, prefix: &str) -> ProviderResult<String> {
        let _ = prefix;
        Err(ProviderError::NotSupported("typeahead".to_string()))
    }

    /// Dependency name to status (`"ok"`, `"failed"`, ...)
    async fn health(&self) -> ProviderResult<HashMap<String, String>> {
        Ok(HashMap::new())
    }
}

/// Virtual classification system (browsable subject hierarchy)
#[async_trait]
pub trait VirtualClassificationSystem: Send + Sync {
    fn name(&self) -> &str;

    async fn class_as_html(&self, notation: &str, render: &RenderParams) -> ProviderResult<String> {
        let _ = (notation, render);
        Err(ProviderError::NotSupported("classification as html".to_string()))
    }

    async fn class_as_xml(&self, notation: &str) -> ProviderResult<String> {
        let _ = notation;
        Err(ProviderError::NotSupported("classification as xml".to_string()))
    }

    async fn class_as_json(&self, notation: &str) -> ProviderResult<String>;

    async fn health(&self) -> ProviderResult<HashMap<String, String>> {
        Ok(HashMap::new())
    }
}

/// Object to HTML transformation (templating engine).
///
/// Receives the serialized object, e.g. a `RequestError`, and the render
/// parameters carrying language and tier flags.
pub trait HtmlTransformer: Send + Sync {
    fn transform(
        &self,
        object: &serde_json::Value,
        params: &RenderParams,
    ) -> Result<String, TransformError>;
}

/// Outgoing mail used for operational alerts
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, subject: &str, body: &str) -> Result<(), MailError>;
}
