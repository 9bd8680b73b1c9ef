//! catalogplus-api - HTTP layer of the CatalogPlus gateway
//!
//! This crate classifies callers, negotiates formats, validates catalog
//! requests and hands them to the providers registered in
//! [`catalogplus_core`]. It is provider-agnostic.
//!
//! # Usage
//!
//! ```ignore
//! use catalogplus_api::{create_router, AppState, GatewayConfig};
//! use catalogplus_core::ProviderRegistry;
//!
//! let mut registry = ProviderRegistry::new();
//! registry.register_discovery(provider);
//! let state = AppState::new(GatewayConfig::default(), registry.build()?, None)?;
//! let router = create_router(state);
//! ```

pub mod access;
pub mod config;
pub mod context;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod negotiate;
pub mod notify;
pub mod params;
pub mod render;
pub mod state;
pub mod validate;

pub use config::{ConfigError, EndpointConfig, EndpointVariant, GatewayConfig};
pub use error::ApiError;
pub use notify::{ErrorNotifier, LogMailer};
pub use state::AppState;

use std::sync::Arc;

use axum::http::header;
use axum::routing::get;
use axum::{Extension, Router};
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::info;

/// Create the gateway router with the given application state
pub fn create_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/ping", get(handlers::health::ping));

    for endpoint in &state.config().endpoints {
        let mount = endpoint.mount_path();
        info!(path = %endpoint.path, variant = ?endpoint.variant, "Mounting endpoint");

        let routes = Router::new()
            .route(
                "/",
                get(handlers::catalog::handle).options(handlers::options::preflight),
            )
            .route(
                "/{*path}",
                get(handlers::catalog::handle).options(handlers::options::preflight),
            )
            .layer(Extension(Arc::new(endpoint.clone())));

        router = if mount.is_empty() {
            router.merge(routes)
        } else {
            router.nest(&mount, routes)
        };
    }

    let headers = state.headers().clone();

    router
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            headers.allow_origin,
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            headers.cache_control,
        ))
        .with_state(state)
}
