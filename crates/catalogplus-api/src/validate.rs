//! Request validation
//!
//! Rules run in a fixed order and the first failure wins. Route rules only
//! need the request context; query rules also look at the normalized
//! parameters. Nothing here touches a provider.

use catalogplus_core::{Format, QueryParameters, Service};

use crate::config::EndpointVariant;
use crate::context::RequestContext;
use crate::error::ApiError;

/// Hard limit on `rows`
pub const MAX_ROWS: i64 = 50;

/// Result window depth of the catalog endpoint: `start` may not exceed
/// `WINDOW_DEPTH / rows`
pub const WINDOW_DEPTH: i64 = 1000;

/// Page size assumed for the window check when `rows` is absent or zero
pub const DEFAULT_ROWS: i64 = 20;

/// Flat `start` limit of the service endpoint
pub const SERVICE_MAX_START: i64 = 20;

/// Resolve the requested service and check it may be answered in the
/// negotiated format.
pub fn validate_route(variant: EndpointVariant, ctx: &RequestContext) -> Result<Service, ApiError> {
    let service = ctx
        .service_name
        .parse::<Service>()
        .ok()
        .filter(|service| variant.offers(*service))
        .ok_or_else(|| {
            ApiError::BadRequest(
                ctx.decorate(&format!("The service '{}' is not implemented.", ctx.path)),
            )
        })?;

    if variant.is_json_only(service) {
        if ctx.format != Format::Json {
            return Err(ApiError::BadRequest(format!(
                "Service '{}' does not support format '{}'!",
                service, ctx.format
            )));
        }
    } else if ctx.format != Format::Html {
        if !ctx.tier.ub_internal {
            return Err(ApiError::BadRequest(format!(
                "You are not allowed to request results in '{}'!",
                ctx.format
            )));
        }
        if let Format::Other(format) = &ctx.format {
            return Err(ApiError::BadRequest(format!(
                "Service '{}' does not support format '{}'!",
                service, format
            )));
        }
    }

    Ok(service)
}

/// Check paging and record-id rules for `service`
pub fn validate_query(
    variant: EndpointVariant,
    service: Service,
    ctx: &RequestContext,
    params: &QueryParameters,
) -> Result<(), ApiError> {
    if variant.is_paged(service) {
        let present = service != Service::GetRecordCount || ctx.query.get("q").is_some();
        if !present || !within_window(variant, params).unwrap_or(false) {
            return Err(ApiError::BadRequest(ctx.decorate("Malformed request!")));
        }
    }

    if service == Service::GetRecords && ctx.query.is_empty() {
        return Err(ApiError::BadRequest("No record ids defined!".to_string()));
    }

    Ok(())
}

/// `Some(true)` if the query is specific enough and the page lies inside
/// the result window, `None` if a number does not parse
fn within_window(variant: EndpointVariant, params: &QueryParameters) -> Option<bool> {
    if matches!(params.q.as_str(), "" | "*" | "*:*") {
        return Some(false);
    }

    let rows = parse_number(&params.rows)?;
    if rows.is_some_and(|rows| rows > MAX_ROWS) {
        return Some(false);
    }

    let Some(start) = parse_number(&params.start)? else {
        return Some(true);
    };

    let limit = match variant {
        EndpointVariant::Catalog => {
            let page = rows.filter(|rows| *rows > 0).unwrap_or(DEFAULT_ROWS);
            WINDOW_DEPTH / page
        }
        EndpointVariant::Service => SERVICE_MAX_START,
    };

    Some(start <= limit)
}

/// Empty means absent; anything else has to be an integer
fn parse_number(value: &str) -> Option<Option<i64>> {
    if value.is_empty() {
        Some(None)
    } else {
        value.trim().parse().ok().map(Some)
    }
}
