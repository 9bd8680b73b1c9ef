//! Health and liveness probes

use std::collections::{BTreeMap, HashMap};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use catalogplus_core::ProviderResult;

use crate::state::AppState;

const HEALTH_CHECK_FAILED: &str = "Could not check system health!";
const DEPENDENCY_FAILED: &str = "failed";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub name: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,
}

/// GET /health
///
/// Without a registered provider the answer has no `dependencies` field.
pub async fn health(State(state): State<AppState>) -> Response {
    match dependencies(&state).await {
        Ok(dependencies) => Json(HealthResponse {
            name: state.config().service.name.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            dependencies: dependencies.unwrap_or_default(),
        })
        .into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, HEALTH_CHECK_FAILED).into_response(),
    }
}

/// GET /ping
pub async fn ping(State(state): State<AppState>) -> Response {
    match dependencies(&state).await {
        Ok(Some(dependencies)) if dependencies.values().any(|v| v == DEPENDENCY_FAILED) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "One or more dependencies unavailable!",
        )
            .into_response(),
        Ok(Some(_)) => "pong".into_response(),
        Ok(None) | Err(_) => (StatusCode::SERVICE_UNAVAILABLE, HEALTH_CHECK_FAILED).into_response(),
    }
}

/// Dependency states of all registered providers, `None` if there are none
async fn dependencies(state: &AppState) -> ProviderResult<Option<BTreeMap<String, String>>> {
    let mut merged = BTreeMap::new();
    let mut any = false;

    if let Some(discovery) = state.discovery() {
        any = true;
        merged.extend(checked(discovery.name(), discovery.health().await)?);
    }
    if let Some(classification) = state.classification() {
        any = true;
        merged.extend(checked(classification.name(), classification.health().await)?);
    }

    Ok(any.then_some(merged))
}

fn checked(
    provider: &str,
    result: ProviderResult<HashMap<String, String>>,
) -> ProviderResult<HashMap<String, String>> {
    result.inspect_err(|e| error!(provider = %provider, error = %e, "Health check failed"))
}
