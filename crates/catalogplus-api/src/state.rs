//! Application state for the gateway

use std::collections::HashSet;
use std::sync::Arc;

use axum::http::HeaderValue;
use catalogplus_core::{
    HtmlTransformer, Mailer, Providers, ResourceDiscoveryService, VirtualClassificationSystem,
};
use tracing::warn;

use crate::access::TierClassifier;
use crate::config::{ConfigError, GatewayConfig, HttpConfig};
use crate::notify::ErrorNotifier;

/// Static header values, validated once at startup
#[derive(Debug, Clone)]
pub struct StaticHeaders {
    pub allow_origin: HeaderValue,
    pub allow_methods: HeaderValue,
    pub allow_headers: HeaderValue,
    pub accept: HeaderValue,
    pub cache_control: HeaderValue,
}

impl StaticHeaders {
    pub fn from_config(config: &HttpConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            allow_origin: header_value("allow_origin", &config.allow_origin)?,
            allow_methods: header_value("allow_methods", &config.allow_methods)?,
            allow_headers: header_value("allow_headers", &config.allow_headers)?,
            accept: header_value("accept", &config.accept)?,
            cache_control: header_value("cache_control", &config.cache_control)?,
        })
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader {
        name,
        value: value.to_string(),
    })
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    config: Arc<GatewayConfig>,
    classifier: Arc<TierClassifier>,
    providers: Providers,
    notifier: Arc<ErrorNotifier>,
    headers: Arc<StaticHeaders>,
}

impl AppState {
    /// Build the state, validating access ranges, header values and mount paths
    pub fn new(
        config: GatewayConfig,
        providers: Providers,
        mailer: Option<Arc<dyn Mailer>>,
    ) -> Result<Self, ConfigError> {
        let classifier = TierClassifier::from_config(&config.access)?;
        let headers = StaticHeaders::from_config(&config.http)?;

        let mut mounted = HashSet::new();
        for endpoint in &config.endpoints {
            let path = endpoint.mount_path();
            if !mounted.insert(path.clone()) {
                return Err(ConfigError::DuplicateEndpoint(path));
            }
            if endpoint.assume_ub_internal {
                warn!(
                    path = %endpoint.path,
                    "Endpoint treats every client as UB-internal"
                );
            }
        }

        let notifier = ErrorNotifier::new(config.service.name.clone(), mailer);

        Ok(Self {
            config: Arc::new(config),
            classifier: Arc::new(classifier),
            providers,
            notifier: Arc::new(notifier),
            headers: Arc::new(headers),
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn classifier(&self) -> &TierClassifier {
        &self.classifier
    }

    pub fn discovery(&self) -> Option<&Arc<dyn ResourceDiscoveryService>> {
        self.providers.discovery.as_ref()
    }

    pub fn classification(&self) -> Option<&Arc<dyn VirtualClassificationSystem>> {
        self.providers.classification.as_ref()
    }

    pub fn transformer(&self) -> Option<&Arc<dyn HtmlTransformer>> {
        self.providers.transformer.as_ref()
    }

    pub fn notifier(&self) -> &ErrorNotifier {
        &self.notifier
    }

    pub fn headers(&self) -> &StaticHeaders {
        &self.headers
    }
}
