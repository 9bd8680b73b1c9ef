//! Catalog request handler

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::extract::{OriginalUri, State};
use axum::http::{HeaderMap, Uri};
use axum::response::Response;
use axum::Extension;
use catalogplus_core::RequestError;
use futures::FutureExt;
use tracing::{error, info};

use crate::config::EndpointConfig;
use crate::context::RequestContext;
use crate::dispatch;
use crate::error::ApiError;
use crate::params::RawQuery;
use crate::render;
use crate::state::AppState;

/// GET <endpoint>/<service>
///
/// Never fails: every problem, including a panic inside a provider, ends up
/// as a rendered `RequestError`.
pub async fn handle(
    State(state): State<AppState>,
    Extension(endpoint): Extension<Arc<EndpointConfig>>,
    OriginalUri(original_uri): OriginalUri,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let ctx = RequestContext::new(
        &endpoint,
        state.classifier(),
        uri.path(),
        request_url(&headers, &original_uri),
        RawQuery::parse(uri.query()),
        &headers,
    );

    if ctx.service_name != "typeahead" {
        info!(
            path = %ctx.path,
            query = %ctx.query.as_str(),
            forwarded_for = ctx.forwarded_for.as_deref().unwrap_or_default(),
            tu_internal = ctx.tier.tu_internal,
            ub_internal = ctx.tier.ub_internal,
            ub_52b_iba = ctx.tier.ub_52b_iba,
            format = %ctx.format,
            "Catalog request"
        );
    }

    let outcome = AssertUnwindSafe(dispatch::dispatch(&state, &endpoint, &ctx))
        .catch_unwind()
        .await
        .unwrap_or_else(|panic| Err(ApiError::from_panic(panic)));

    match outcome {
        Ok(payload) => render::success(payload),
        Err(err) => {
            let request_error = err.into_request_error(&ctx);
            respond_with_error(&state, &endpoint, &ctx, request_error).await
        }
    }
}

async fn respond_with_error(
    state: &AppState,
    endpoint: &EndpointConfig,
    ctx: &RequestContext,
    request_error: RequestError,
) -> Response {
    error!(
        code = request_error.code,
        error = %request_error.error,
        description = %request_error.description,
        "Request failed"
    );
    state.notifier().notify(endpoint.tag(), &request_error).await;

    let rendered = std::panic::catch_unwind(AssertUnwindSafe(|| {
        render::request_error(state, endpoint.variant, ctx, &request_error)
    }))
    .unwrap_or_else(|_| {
        error!("Rendering of error panicked");
        Err(RequestError::internal(render::HTML_RENDER_FAILURE))
    });

    match rendered {
        Ok(response) => response,
        Err(render_error) => {
            state.notifier().notify(endpoint.tag(), &render_error).await;
            render::render_failure(&render_error)
        }
    }
}

/// Absolute URL of the request without its query string
fn request_url(headers: &HeaderMap, uri: &Uri) -> String {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
    let scheme = header("x-forwarded-proto").unwrap_or("http");
    let host = header("host")
        .or_else(|| uri.authority().map(|a| a.as_str()))
        .unwrap_or("localhost");
    format!("{}://{}{}", scheme, host, uri.path())
}
