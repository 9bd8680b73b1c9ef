//! Startup-time provider registration
//!
//! Providers are collected once while the process boots and then injected
//! into the request handlers. Exactly zero or one implementation per
//! capability is allowed; anything else is a configuration error.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::provider::{HtmlTransformer, ResourceDiscoveryService, VirtualClassificationSystem};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{count} implementations registered for {capability}, expected at most one")]
    Ambiguous {
        capability: &'static str,
        count: usize,
    },
}

/// Collects provider implementations before the server starts
#[derive(Default)]
pub struct ProviderRegistry {
    discovery: Vec<Arc<dyn ResourceDiscoveryService>>,
    classification: Vec<Arc<dyn VirtualClassificationSystem>>,
    transformers: Vec<Arc<dyn HtmlTransformer>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_discovery(&mut self, provider: Arc<dyn ResourceDiscoveryService>) {
        info!(provider = %provider.name(), "Registering resource discovery service");
        self.discovery.push(provider);
    }

    pub fn register_classification(&mut self, provider: Arc<dyn VirtualClassificationSystem>) {
        info!(provider = %provider.name(), "Registering virtual classification system");
        self.classification.push(provider);
    }

    pub fn register_transformer(&mut self, transformer: Arc<dyn HtmlTransformer>) {
        self.transformers.push(transformer);
    }

    /// Resolve the registered implementations, failing on ambiguity
    pub fn build(self) -> Result<Providers, RegistryError> {
        Ok(Providers {
            discovery: single(self.discovery, "ResourceDiscoveryService")?,
            classification: single(self.classification, "VirtualClassificationSystem")?,
            transformer: single(self.transformers, "HtmlTransformer")?,
        })
    }
}

fn single<T: ?Sized>(
    mut items: Vec<Arc<T>>,
    capability: &'static str,
) -> Result<Option<Arc<T>>, RegistryError> {
    match items.len() {
        0 | 1 => Ok(items.pop()),
        count => Err(RegistryError::Ambiguous { capability, count }),
    }
}

/// Resolved providers; any of them may be absent
#[derive(Clone, Default)]
pub struct Providers {
    pub discovery: Option<Arc<dyn ResourceDiscoveryService>>,
    pub classification: Option<Arc<dyn VirtualClassificationSystem>>,
    pub transformer: Option<Arc<dyn HtmlTransformer>>,
}
