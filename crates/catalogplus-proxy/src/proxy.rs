//! HttpDiscoveryService - providers that forward to a remote HTTP service
//!
//! Upstream protocol: `GET <url>/<service>?<params>&format=<fmt>` answers
//! with the rendered body, `GET <url>/typeahead?q=<prefix>` with suggestion
//! JSON and `GET <url>/health` with `{"dependencies": {..}}`.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use catalogplus_core::{
    ProviderError, ProviderResult, QueryParameters, RenderParams, ResourceDiscoveryService,
    Service, VirtualClassificationSystem,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

/// `[provider]` section for `kind = "proxy"`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Base URL of the upstream service
    pub url: String,
    /// Bearer token sent with every request
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Deserialize)]
struct UpstreamErrorResp {
    #[serde(default)]
    error: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct UpstreamHealthResp {
    #[serde(default)]
    dependencies: HashMap<String, String>,
}

/// Discovery and classification provider backed by a remote HTTP service
pub struct HttpDiscoveryService {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpDiscoveryService {
    pub fn new(config: &ProxyConfig) -> ProviderResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(CONNECT_TIMEOUT);

        if let Some(token) = &config.auth_token {
            let mut headers = reqwest::header::HeaderMap::new();
            let value = reqwest::header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ProviderError::Internal(format!("Invalid auth token: {}", e)))?;
            headers.insert(reqwest::header::AUTHORIZATION, value);
            builder = builder.default_headers(headers);
        }

        let client = builder.build().map_err(Self::map_err)?;

        // A trailing slash makes `join` append instead of replacing the last segment
        let mut base = config.url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = Url::parse(&base)
            .map_err(|e| ProviderError::Internal(format!("Invalid upstream URL '{}': {}", config.url, e)))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> ProviderResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Internal(format!("Invalid upstream path '{}': {}", path, e)))
    }

    /// GET `path` with `query` and return the body text
    async fn fetch(&self, path: &str, query: &[(&str, &str)]) -> ProviderResult<String> {
        let url = self.endpoint(path)?;
        debug!(url = %url, "Forwarding request upstream");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(Self::map_err)?;

        if !response.status().is_success() {
            return Err(Self::map_response_error(response).await);
        }

        response.text().await.map_err(Self::map_err)
    }

    async fn fetch_results(
        &self,
        service: Service,
        params: &QueryParameters,
        format: &str,
        render: Option<&RenderParams>,
    ) -> ProviderResult<String> {
        let extra = match render {
            Some(render) => render_pairs(render)?,
            None => Vec::new(),
        };

        let mut query: Vec<(&str, &str)> = params.pairs();
        query.push(("format", format));
        for (key, value) in &extra {
            if !query.iter().any(|(k, _)| *k == key.as_str()) {
                query.push((key.as_str(), value.as_str()));
            }
        }

        self.fetch(service.as_str(), &query).await
    }

    async fn fetch_health(&self) -> ProviderResult<HashMap<String, String>> {
        let body = self.fetch("health", &[]).await?;
        let health: UpstreamHealthResp = serde_json::from_str(&body)
            .map_err(|e| ProviderError::Protocol(format!("Failed to parse health response: {}", e)))?;
        Ok(health.dependencies)
    }

    /// Map a reqwest error to a ProviderError
    fn map_err(e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Protocol(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }

    /// Map an HTTP error response to ProviderError
    async fn map_response_error(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let message = match response.json::<UpstreamErrorResp>().await {
            Ok(err) if !err.description.is_empty() => err.description,
            Ok(err) if !err.error.is_empty() => err.error,
            _ => format!("HTTP {}", status),
        };
        match status {
            501 => ProviderError::NotSupported(message),
            408 | 504 => ProviderError::Timeout,
            _ => ProviderError::Upstream { status, message },
        }
    }
}

/// Flatten render parameters into string pairs
fn render_pairs(render: &RenderParams) -> ProviderResult<Vec<(String, String)>> {
    let value = serde_json::to_value(render)
        .map_err(|e| ProviderError::Internal(format!("Failed to encode render parameters: {}", e)))?;

    let pairs = match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect(),
        _ => Vec::new(),
    };
    Ok(pairs)
}

#[async_trait]
impl ResourceDiscoveryService for HttpDiscoveryService {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn results_as_html(
        &self,
        service: Service,
        params: &QueryParameters,
        render: &RenderParams,
    ) -> ProviderResult<String> {
        self.fetch_results(service, params, "html", Some(render)).await
    }

    async fn results_as_xml(&self, service: Service, params: &QueryParameters) -> ProviderResult<String> {
        self.fetch_results(service, params, "xml", None).await
    }

    async fn results_as_json(&self, service: Service, params: &QueryParameters) -> ProviderResult<String> {
        self.fetch_results(service, params, "json", None).await
    }

    async fn suggestions(&self, prefix: &str) -> ProviderResult<String> {
        self.fetch(Service::Typeahead.as_str(), &[("q", prefix), ("format", "json")])
            .await
    }

    async fn health(&self) -> ProviderResult<HashMap<String, String>> {
        self.fetch_health().await
    }
}

#[async_trait]
impl VirtualClassificationSystem for HttpDiscoveryService {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn class_as_html(&self, notation: &str, render: &RenderParams) -> ProviderResult<String> {
        let extra = render_pairs(render)?;
        let mut query: Vec<(&str, &str)> = vec![("class", notation), ("format", "html")];
        query.extend(extra.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        self.fetch(Service::Classification.as_str(), &query).await
    }

    async fn class_as_xml(&self, notation: &str) -> ProviderResult<String> {
        self.fetch(Service::Classification.as_str(), &[("class", notation), ("format", "xml")])
            .await
    }

    async fn class_as_json(&self, notation: &str) -> ProviderResult<String> {
        self.fetch(Service::Classification.as_str(), &[("class", notation), ("format", "json")])
            .await
    }

    async fn health(&self) -> ProviderResult<HashMap<String, String>> {
        self.fetch_health().await
    }
}
