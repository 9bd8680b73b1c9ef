//! Provider dispatch
//!
//! Turns a validated request into one provider call and wraps the answer
//! in a [`Payload`]. Rendering of errors is left to [`crate::render`].

use std::sync::Arc;
use std::time::Duration;

use catalogplus_core::{
    Format, ProviderError, QueryParameters, ResourceDiscoveryService, Service,
    VirtualClassificationSystem,
};
use tracing::warn;

use crate::config::EndpointConfig;
use crate::context::RequestContext;
use crate::error::{ApiError, Capability};
use crate::params;
use crate::state::AppState;
use crate::validate;

/// Fixed delay applied to JSON search and record count answers
pub const JSON_RESPONSE_DELAY: Duration = Duration::from_millis(150);

const TYPEAHEAD_CONTENT_TYPE: &str = "application/json;charset=utf-8";
const EMBEDDED_CONTENT_TYPE: &str = "application/xml;charset=UTF-8";

/// Successful response body plus what the renderer needs to send it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub body: String,
    pub content_type: &'static str,
    /// Answer with `Access-Control-Allow-Origin: *` regardless of configuration
    pub open_cors: bool,
}

impl Payload {
    fn new(body: String, content_type: &'static str) -> Self {
        Self {
            body,
            content_type,
            open_cors: false,
        }
    }
}

/// Validate the request and call the provider responsible for it
pub async fn dispatch(
    state: &AppState,
    endpoint: &EndpointConfig,
    ctx: &RequestContext,
) -> Result<Payload, ApiError> {
    let service = validate::validate_route(endpoint.variant, ctx)?;

    if service == Service::Classification {
        let provider = state
            .classification()
            .ok_or(ApiError::NotConfigured(Capability::Classification))?;
        return classification(provider, ctx).await;
    }

    let provider = state
        .discovery()
        .ok_or(ApiError::NotConfigured(Capability::Discovery))?;

    let params = match service {
        Service::Class => {
            let id = ctx
                .resource_id
                .as_deref()
                .ok_or_else(|| ApiError::BadRequest(ctx.decorate("Malformed request!")))?;
            params::class_lookup(id, &ctx.language)
        }
        _ => params::normalize(&ctx.query, &ctx.language),
    };
    validate::validate_query(endpoint.variant, service, ctx, &params)?;

    match service {
        Service::Typeahead => typeahead(provider, ctx).await,
        Service::GetRecordCount => record_count(provider, ctx, &params).await,
        _ => result_set(provider, service, ctx, &params).await,
    }
}

async fn result_set(
    provider: &Arc<dyn ResourceDiscoveryService>,
    service: Service,
    ctx: &RequestContext,
    params: &QueryParameters,
) -> Result<Payload, ApiError> {
    match &ctx.format {
        Format::Html => {
            let mut render = ctx.render_params(Some(service));
            let mut content_type = Format::Html.content_type();

            if service == Service::GetRecords {
                render.recordset = Some(institution_filter(ctx));
                match ctx.mode.as_str() {
                    "simplehit" => render.records_base_url = Some(format!("{}?ids=", ctx.request_url)),
                    "embedded" => content_type = EMBEDDED_CONTENT_TYPE,
                    _ => {}
                }
            }

            let body = provider.results_as_html(service, params, &render).await?;
            Ok(Payload::new(body, content_type))
        }
        Format::Xml => {
            let body = provider.results_as_xml(service, params).await?;
            Ok(Payload::new(body, Format::Xml.content_type()))
        }
        Format::Json => {
            if service == Service::Search {
                warn_uncontrolled(ctx);
            }
            let body = provider.results_as_json(service, params).await?;
            if service == Service::Search {
                tokio::time::sleep(JSON_RESPONSE_DELAY).await;
            }
            Ok(Payload::new(body, Format::Json.content_type()))
        }
        Format::Other(format) => Err(ApiError::BadRequest(format!(
            "Service '{}' does not support format '{}'!",
            service, format
        ))),
    }
}

/// Count-only answer: `{"recordCount":"<n>"}`
async fn record_count(
    provider: &Arc<dyn ResourceDiscoveryService>,
    ctx: &RequestContext,
    params: &QueryParameters,
) -> Result<Payload, ApiError> {
    warn_uncontrolled(ctx);

    let body = provider
        .results_as_json(Service::GetRecordCount, params)
        .await?;
    let count = extract_record_count(&body)?;

    tokio::time::sleep(JSON_RESPONSE_DELAY).await;

    let body = serde_json::json!({ "recordCount": count.to_string() }).to_string();
    Ok(Payload::new(body, Format::Json.content_type()))
}

fn extract_record_count(body: &str) -> Result<u64, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| ProviderError::Protocol(format!("Invalid JSON from provider: {}", e)))?;

    let count = &value["recordCount"];
    count
        .as_u64()
        .or_else(|| count.as_str().and_then(|s| s.parse().ok()))
        .ok_or_else(|| ProviderError::Protocol("Provider answer lacks 'recordCount'".to_string()))
}

async fn typeahead(
    provider: &Arc<dyn ResourceDiscoveryService>,
    ctx: &RequestContext,
) -> Result<Payload, ApiError> {
    let prefix = ctx.query.get("q").unwrap_or_default();
    let body = provider.suggestions(prefix).await?;
    Ok(Payload {
        body,
        content_type: TYPEAHEAD_CONTENT_TYPE,
        open_cors: true,
    })
}

async fn classification(
    provider: &Arc<dyn VirtualClassificationSystem>,
    ctx: &RequestContext,
) -> Result<Payload, ApiError> {
    let notation = ctx.query.get("class").unwrap_or_default();

    let body = match &ctx.format {
        Format::Html => {
            let mut render = ctx.render_params(Some(Service::Classification));
            render.notation = Some(notation.to_string());
            render.query_string = Some(decode_query_string(ctx.query.get("queryString")));
            provider.class_as_html(notation, &render).await?
        }
        Format::Xml => provider.class_as_xml(notation).await?,
        Format::Json => provider.class_as_json(notation).await?,
        Format::Other(format) => {
            return Err(ApiError::BadRequest(format!(
                "Service '{}' does not support format '{}'!",
                Service::Classification,
                format
            )))
        }
    };

    Ok(Payload::new(body, ctx.format.content_type()))
}

/// `&fq=<value>` for the first `fq` naming an institution, `""` otherwise
fn institution_filter(ctx: &RequestContext) -> String {
    ctx.query
        .get_all("fq")
        .find(|fq| fq.starts_with("Institution"))
        .map(|fq| format!("&fq={}", fq))
        .unwrap_or_default()
}

/// The `queryString` parameter arrives encoded a second time
fn decode_query_string(value: Option<&str>) -> String {
    let value = value.unwrap_or_default().replace('+', " ");
    match urlencoding::decode(&value) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => value,
    }
}

fn warn_uncontrolled(ctx: &RequestContext) {
    if !ctx.tier.ub_internal {
        warn!(
            path = %ctx.path,
            query = %ctx.query.as_str(),
            forwarded_for = ctx.forwarded_for.as_deref().unwrap_or_default(),
            "Uncontrolled JSON request"
        );
    }
}
