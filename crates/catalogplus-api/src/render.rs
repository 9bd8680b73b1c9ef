//! Response rendering

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use catalogplus_core::{Format, RequestError};
use tracing::error;

use crate::config::EndpointVariant;
use crate::context::RequestContext;
use crate::dispatch::Payload;
use crate::state::AppState;

pub const HTML_RENDER_FAILURE: &str = "Internal Server Error: Error while rendering a HTML message.";
pub const RESULT_RENDER_FAILURE: &str = "Internal Server Error: Error while rendering the results.";

const BEARER_CHALLENGE: &str = "Bearer realm=\"PAIA auth\"";
const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// 200 with the provider's body
pub fn success(payload: Payload) -> Response {
    let mut response = body_response(StatusCode::OK, payload.content_type, payload.body);
    if payload.open_cors {
        response
            .headers_mut()
            .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
    response
}

/// Render `error` in the negotiated format.
///
/// HTML goes through the configured transformer and falls back to JSON when
/// there is none. A rendering failure is returned as a new 500 error which
/// the caller reports and sends with [`render_failure`].
pub fn request_error(
    state: &AppState,
    variant: EndpointVariant,
    ctx: &RequestContext,
    request_error: &RequestError,
) -> Result<Response, RequestError> {
    let status = StatusCode::from_u16(request_error.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut format = ctx.format.clone();
    if format == Format::Html {
        match state.transformer() {
            Some(transformer) => {
                let object = serde_json::to_value(request_error).map_err(|e| {
                    error!(error = %e, "Could not convert error for HTML rendering");
                    RequestError::internal(HTML_RENDER_FAILURE)
                })?;
                let html = transformer
                    .transform(&object, &ctx.render_params(None))
                    .map_err(|e| {
                        error!(error = %e, "HTML transformation of error failed");
                        RequestError::internal(HTML_RENDER_FAILURE)
                    })?;
                return Ok(error_response(variant, status, Format::Html.content_type(), html));
            }
            None => {
                error!("HtmlTransformer not configured, answering in JSON");
                format = Format::Json;
            }
        }
    }

    let (content_type, body) = match format {
        Format::Xml => (Format::Xml.content_type(), to_xml(request_error)?),
        _ => (Format::Json.content_type(), to_json(request_error)?),
    };
    Ok(error_response(variant, status, content_type, body))
}

/// Last resort when an error could not be rendered: plain text, status from
/// the error
pub fn render_failure(request_error: &RequestError) -> Response {
    let status = StatusCode::from_u16(request_error.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, request_error.description.clone()).into_response()
}

pub fn to_json(request_error: &RequestError) -> Result<String, RequestError> {
    serde_json::to_string(request_error).map_err(|e| {
        error!(error = %e, "JSON serialization of error failed");
        RequestError::internal(RESULT_RENDER_FAILURE)
    })
}

pub fn to_xml(request_error: &RequestError) -> Result<String, RequestError> {
    quick_xml::se::to_string(request_error)
        .map(|xml| format!("{}{}", XML_DECLARATION, xml))
        .map_err(|e| {
            error!(error = %e, "XML serialization of error failed");
            RequestError::internal(RESULT_RENDER_FAILURE)
        })
}

fn error_response(
    variant: EndpointVariant,
    status: StatusCode,
    content_type: &'static str,
    body: String,
) -> Response {
    let mut response = body_response(status, content_type, body);
    if variant == EndpointVariant::Service {
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(BEARER_CHALLENGE));
    }
    response
}

fn body_response(status: StatusCode, content_type: &'static str, body: String) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}
