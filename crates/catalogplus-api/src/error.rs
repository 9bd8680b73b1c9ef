//! API error types and their conversion into client-facing errors

use std::any::Any;
use std::backtrace::Backtrace;

use catalogplus_core::{ProviderError, RequestError};

use crate::context::RequestContext;

/// Provider capability the gateway may be missing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Discovery,
    Classification,
}

impl Capability {
    pub fn label(&self) -> &'static str {
        match self {
            Capability::Discovery => "Resource Discovery Service",
            Capability::Classification => "Virtual Classification System",
        }
    }
}

/// Failure while handling a request, before it is turned into a `RequestError`
#[derive(Debug)]
pub enum ApiError {
    /// 400 with a final description
    BadRequest(String),
    /// 503, provider call failed
    Provider(ProviderError),
    /// 503, no provider registered for the capability
    NotConfigured(Capability),
    /// 503, anything nobody planned for (including panics)
    Unexpected(String),
}

impl ApiError {
    /// Convert a caught panic payload, keeping a backtrace for operators
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with non-string payload".to_string()
        };

        ApiError::Unexpected(format!("{}\n{}", message, Backtrace::force_capture()))
    }

    pub fn into_request_error(self, ctx: &RequestContext) -> RequestError {
        match self {
            ApiError::BadRequest(description) => RequestError::bad_request(description),
            ApiError::Provider(err) => RequestError::service_unavailable(ctx.decorate(&err.to_string())),
            ApiError::NotConfigured(capability) => {
                RequestError::service_unavailable(format!("{} not configured!", capability.label()))
            }
            ApiError::Unexpected(detail) => RequestError::service_unavailable(format!(
                "Unexpected error in request: '{}'!\n{}",
                ctx.request_url, detail
            )),
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        ApiError::Provider(err)
    }
}
