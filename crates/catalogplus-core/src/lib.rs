//! catalogplus-core - Core traits and types for the CatalogPlus gateway
//!
//! This crate provides the abstractions that let different discovery and
//! classification backends sit behind the same HTTP surface, plus the
//! request records exchanged with them.

pub mod error;
pub mod models;
pub mod provider;
pub mod registry;

pub use error::{MailError, ProviderError, ProviderResult, TransformError};
pub use models::*;
pub use provider::{HtmlTransformer, Mailer, ResourceDiscoveryService, VirtualClassificationSystem};
pub use registry::{ProviderRegistry, Providers, RegistryError};
