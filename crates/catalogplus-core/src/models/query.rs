//! Canonical request records handed to providers

use serde::Serialize;

use super::{AccessTier, Language, Service};

/// Normalized query parameters of a search-style request.
///
/// Every field is always present; absent raw parameters are replaced by
/// their defaults when the record is built. The record is never modified
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryParameters {
    pub q: String,
    pub ids: String,
    pub start: String,
    pub rows: String,
    pub sort: String,
    /// Filter queries joined with `;`
    pub fq: String,
    /// Range queries joined with `;`
    pub rq: String,
    pub group: String,
    /// `"1"` restricts results to local catalog holdings
    pub local: String,
    /// `"1"` restricts results to local holdings including e-holdings
    pub holdings: String,
    /// `"full"` or `"light"`
    #[serde(rename = "type")]
    pub record_type: String,
    pub news: String,
    pub exp: String,
    pub eonly: String,
    /// Negotiated response language
    pub lang: String,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            q: String::new(),
            ids: String::new(),
            start: String::new(),
            rows: String::new(),
            sort: String::new(),
            fq: String::new(),
            rq: String::new(),
            group: String::new(),
            local: "0".to_string(),
            holdings: "0".to_string(),
            record_type: "full".to_string(),
            news: "true".to_string(),
            exp: "true".to_string(),
            eonly: "false".to_string(),
            lang: Language::De.as_str().to_string(),
        }
    }
}

impl QueryParameters {
    /// Key/value view using the wire names, for forwarding upstream
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("q", self.q.as_str()),
            ("ids", self.ids.as_str()),
            ("start", self.start.as_str()),
            ("rows", self.rows.as_str()),
            ("sort", self.sort.as_str()),
            ("fq", self.fq.as_str()),
            ("rq", self.rq.as_str()),
            ("group", self.group.as_str()),
            ("local", self.local.as_str()),
            ("holdings", self.holdings.as_str()),
            ("type", self.record_type.as_str()),
            ("news", self.news.as_str()),
            ("exp", self.exp.as_str()),
            ("eonly", self.eonly.as_str()),
            ("lang", self.lang.as_str()),
        ]
    }
}

/// Parameters for HTML rendering, passed to providers and transformers
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderParams {
    pub lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<Service>,
    #[serde(flatten)]
    pub tier: AccessTier,
    pub debug: bool,
    pub mode: String,
    /// `&fq=Institution...` filter of a records request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recordset: Option<String>,
    /// Base URL for follow-up record links in `simplehit` mode
    #[serde(rename = "getRecordsBaseURL", skip_serializing_if = "Option::is_none")]
    pub records_base_url: Option<String>,
    /// Classification notation being browsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notation: Option<String>,
    /// Decoded search the classification view should link back to
    #[serde(rename = "queryString", skip_serializing_if = "Option::is_none")]
    pub query_string: Option<String>,
}

impl RenderParams {
    /// Base parameters shared by every HTML rendering
    pub fn new(lang: &Language, tier: AccessTier) -> Self {
        Self {
            lang: lang.as_str().to_string(),
            tier,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_product_decisions() {
        let params = QueryParameters::default();
        assert_eq!(params.news, "true");
        assert_eq!(params.exp, "true");
        assert_eq!(params.eonly, "false");
        assert_eq!(params.local, "0");
        assert_eq!(params.record_type, "full");
    }

    #[test]
    fn render_params_use_legacy_key_names() {
        let tier = AccessTier {
            tu_internal: true,
            ub_internal: false,
            ub_52b_iba: true,
        };
        let mut params = RenderParams::new(&Language::En, tier);
        params.service = Some(Service::GetRecords);
        params.records_base_url = Some("http://host/getRecords?ids=".to_string());

        let value = serde_json::to_value(&params).unwrap();
        assert_eq!(value["lang"], "en");
        assert_eq!(value["service"], "getRecords");
        assert_eq!(value["isTUintern"], true);
        assert_eq!(value["isUBintern"], false);
        assert_eq!(value["is52bIBA"], true);
        assert_eq!(value["getRecordsBaseURL"], "http://host/getRecords?ids=");
        assert!(value.get("notation").is_none());
    }
}
