//! Content negotiation for format and language
//!
//! This is a fixed precedence policy, not RFC 7231 negotiation: q-values
//! are ignored and the first matching media type wins.

use catalogplus_core::{Format, Language};

/// Resolve the output format.
///
/// An explicit non-empty `format` parameter wins and is taken verbatim.
/// Otherwise the `Accept` header is searched for `text/html`,
/// `application/xml` and `application/json`, in that order.
pub fn negotiate_format(format_param: Option<&str>, accept: Option<&str>) -> Format {
    if let Some(format) = format_param.filter(|f| !f.is_empty()) {
        return Format::from_param(format);
    }

    match accept {
        Some(accept) if accept.contains("text/html") => Format::Html,
        Some(accept) if accept.contains("application/xml") => Format::Xml,
        Some(accept) if accept.contains("application/json") => Format::Json,
        _ => Format::Html,
    }
}

/// Resolve the response language.
///
/// `Accept-Language` starting with `de`/`en` wins, then the `l` parameter
/// verbatim, then `de`.
pub fn negotiate_language(lang_param: Option<&str>, accept_language: Option<&str>) -> Language {
    match accept_language {
        Some(al) if al.starts_with("de") => Language::De,
        Some(al) if al.starts_with("en") => Language::En,
        _ => lang_param.map(Language::from_param).unwrap_or_default(),
    }
}

/// Resolve format and language in one go
pub fn negotiate(
    format_param: Option<&str>,
    accept: Option<&str>,
    lang_param: Option<&str>,
    accept_language: Option<&str>,
) -> (Format, Language) {
    (
        negotiate_format(format_param, accept),
        negotiate_language(lang_param, accept_language),
    )
}
