//! Raw query access and parameter normalization

use catalogplus_core::{Language, QueryParameters};

/// Decoded query string that keeps repeated keys in their original order
#[derive(Debug, Clone, Default)]
pub struct RawQuery {
    raw: String,
    pairs: Vec<(String, String)>,
}

impl RawQuery {
    pub fn parse(query: Option<&str>) -> Self {
        let raw = query.unwrap_or_default().to_string();
        let pairs = url::form_urlencoded::parse(raw.as_bytes())
            .into_owned()
            .collect();
        Self { raw, pairs }
    }

    /// The undecoded query string as received
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// First value of `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of `name`, in request order
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value of `name`, or `""` when absent
    fn text(&self, name: &str) -> String {
        self.get(name).unwrap_or_default().to_string()
    }

    /// `set` if the raw value is exactly `trigger`, `unset` otherwise
    fn flag(&self, name: &str, trigger: &str, set: &str, unset: &str) -> String {
        if self.get(name) == Some(trigger) {
            set.to_string()
        } else {
            unset.to_string()
        }
    }
}

/// Build the canonical parameter record handed to providers.
///
/// `news` and `exp` are opt-out (on unless exactly `"false"`), `eonly` is
/// opt-in (off unless exactly `"true"`). The asymmetry is intentional.
pub fn normalize(raw: &RawQuery, language: &Language) -> QueryParameters {
    QueryParameters {
        q: raw.text("q"),
        ids: raw.text("ids"),
        start: raw.text("start"),
        rows: raw.text("rows"),
        sort: raw.text("sort"),
        fq: raw.get_all("fq").collect::<Vec<_>>().join(";"),
        rq: raw.get_all("rq").collect::<Vec<_>>().join(";"),
        group: raw.text("group"),
        local: raw.flag("local", "1", "1", "0"),
        holdings: raw.flag("holdings", "1", "1", "0"),
        record_type: raw.flag("type", "light", "light", "full"),
        news: raw.flag("news", "false", "false", "true"),
        exp: raw.flag("exp", "false", "false", "true"),
        eonly: raw.flag("eonly", "true", "true", "false"),
        lang: language.as_str().to_string(),
    }
}

/// Parameters of a single-class lookup (`/class/<id>`): the id becomes the
/// query and no result rows are requested.
pub fn class_lookup(id: &str, language: &Language) -> QueryParameters {
    QueryParameters {
        q: id.to_string(),
        rows: "0".to_string(),
        lang: language.as_str().to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(query: &str) -> QueryParameters {
        normalize(&RawQuery::parse(Some(query)), &Language::De)
    }

    #[test]
    fn absent_fields_get_defaults() {
        let params = normalized("");
        assert_eq!(params, QueryParameters::default());
        assert_eq!(params.q, "");
        assert_eq!(params.lang, "de");
    }

    #[test]
    fn news_and_exp_are_opt_out() {
        assert_eq!(normalized("").news, "true");
        assert_eq!(normalized("news=false").news, "false");
        assert_eq!(normalized("news=no").news, "true");
        assert_eq!(normalized("news=FALSE").news, "true");
        assert_eq!(normalized("exp=false").exp, "false");
        assert_eq!(normalized("exp=0").exp, "true");
    }

    #[test]
    fn eonly_is_opt_in() {
        assert_eq!(normalized("").eonly, "false");
        assert_eq!(normalized("eonly=true").eonly, "true");
        assert_eq!(normalized("eonly=1").eonly, "false");
    }

    #[test]
    fn local_holdings_and_type_flags() {
        let params = normalized("local=1&holdings=yes&type=light");
        assert_eq!(params.local, "1");
        assert_eq!(params.holdings, "0");
        assert_eq!(params.record_type, "light");
        assert_eq!(normalized("type=brief").record_type, "full");
    }

    #[test]
    fn repeated_filters_are_joined_in_order() {
        let params = normalized("fq=a%3A1&q=x&fq=b%3A2&rq=year%3A2000&fq=c");
        assert_eq!(params.fq, "a:1;b:2;c");
        assert_eq!(params.rq, "year:2000");
        assert_eq!(params.q, "x");
    }

    #[test]
    fn plus_decodes_to_space() {
        assert_eq!(normalized("q=open+access").q, "open access");
    }

    #[test]
    fn first_value_wins_for_single_fields() {
        assert_eq!(normalized("rows=10&rows=40").rows, "10");
    }

    #[test]
    fn class_lookup_requests_no_rows() {
        let params = class_lookup("TWF", &Language::En);
        assert_eq!(params.q, "TWF");
        assert_eq!(params.rows, "0");
        assert_eq!(params.lang, "en");
        assert_eq!(params.news, "true");
    }

    #[test]
    fn raw_query_keeps_original_text() {
        let raw = RawQuery::parse(Some("q=a+b&fq=x"));
        assert_eq!(raw.as_str(), "q=a+b&fq=x");
        assert!(!raw.is_empty());
        assert!(RawQuery::parse(None).is_empty());
    }
}
