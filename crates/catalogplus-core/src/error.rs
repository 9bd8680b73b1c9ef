//! Common error types for discovery providers and collaborators

use thiserror::Error;

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors raised by a discovery or classification provider.
///
/// Every variant carries a human readable message; the gateway embeds it in
/// the `503` error description it hands back to the client.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Upstream search engine could not be reached
    #[error("Transport error: {0}")]
    Transport(String),

    /// Upstream answered with something the provider could not understand
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Upstream answered with a non-success status
    #[error("Upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Upstream did not answer in time
    #[error("Operation timed out")]
    Timeout,

    /// Operation not offered by this provider
    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error raised by an [`HtmlTransformer`](crate::HtmlTransformer)
#[derive(Debug, Error)]
#[error("Transformation failed: {0}")]
pub struct TransformError(pub String);

/// Error raised by a [`Mailer`](crate::Mailer)
#[derive(Debug, Error)]
pub enum MailError {
    /// Mail transport rejected or dropped the message
    #[error("Mail transport error: {0}")]
    Transport(String),

    /// Mailer is missing required settings
    #[error("Mailer not configured: {0}")]
    NotConfigured(String),
}
