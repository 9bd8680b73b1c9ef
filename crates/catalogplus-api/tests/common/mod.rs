//! Shared mocks and helpers for the gateway integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tower::ServiceExt;

use catalogplus_api::config::AccessRangeConfig;
use catalogplus_api::{create_router, AppState, GatewayConfig};
use catalogplus_core::{
    HtmlTransformer, MailError, Mailer, ProviderError, ProviderResult, Providers, QueryParameters,
    RenderParams, ResourceDiscoveryService, Service, TransformError, VirtualClassificationSystem,
};

/// Address inside the configured UB range
pub const INTERNAL_IP: &str = "10.1.2.3";
/// Address outside every configured range
pub const EXTERNAL_IP: &str = "203.0.113.9";

// =============================================================================
// Mock Providers
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    Answer,
    Fail,
    Panic,
}

/// Discovery provider that records every call
pub struct MockDiscovery {
    behavior: Behavior,
    json: String,
    health: HashMap<String, String>,
    pub calls: Mutex<Vec<(Service, QueryParameters)>>,
    pub renders: Mutex<Vec<RenderParams>>,
}

impl MockDiscovery {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            json: r#"{"recordCount":42,"docs":[{"id":"ub_1"}]}"#.to_string(),
            health: HashMap::from([("solr".to_string(), "ok".to_string())]),
            calls: Mutex::new(Vec::new()),
            renders: Mutex::new(Vec::new()),
        }
    }

    pub fn with_health(mut self, dependency: &str, status: &str) -> Self {
        self.health.insert(dependency.to_string(), status.to_string());
        self
    }

    fn answer(&self, service: Service, params: &QueryParameters, body: String) -> ProviderResult<String> {
        self.calls.lock().push((service, params.clone()));
        match self.behavior {
            Behavior::Answer => Ok(body),
            Behavior::Fail => Err(ProviderError::Transport("connection refused".to_string())),
            Behavior::Panic => panic!("search index corrupted"),
        }
    }
}

#[async_trait]
impl ResourceDiscoveryService for MockDiscovery {
    fn name(&self) -> &str {
        "mock-discovery"
    }

    async fn results_as_html(
        &self,
        service: Service,
        params: &QueryParameters,
        render: &RenderParams,
    ) -> ProviderResult<String> {
        self.renders.lock().push(render.clone());
        self.answer(service, params, format!("<div>{}</div>", service))
    }

    async fn results_as_xml(&self, service: Service, params: &QueryParameters) -> ProviderResult<String> {
        self.answer(service, params, "<result/>".to_string())
    }

    async fn results_as_json(&self, service: Service, params: &QueryParameters) -> ProviderResult<String> {
        self.answer(service, params, self.json.clone())
    }

    async fn suggestions(&self, prefix: &str) -> ProviderResult<String> {
        Ok(format!(r#"["{}kirchen","{}kamp"]"#, prefix, prefix))
    }

    async fn health(&self) -> ProviderResult<HashMap<String, String>> {
        match self.behavior {
            Behavior::Answer => Ok(self.health.clone()),
            _ => Err(ProviderError::Timeout),
        }
    }
}

/// Classification provider answering with the notation it was asked for
#[derive(Default)]
pub struct MockClassification {
    pub renders: Mutex<Vec<RenderParams>>,
}

#[async_trait]
impl VirtualClassificationSystem for MockClassification {
    fn name(&self) -> &str {
        "mock-classification"
    }

    async fn class_as_html(&self, notation: &str, render: &RenderParams) -> ProviderResult<String> {
        self.renders.lock().push(render.clone());
        Ok(format!("<ul data-notation=\"{}\"/>", notation))
    }

    async fn class_as_json(&self, notation: &str) -> ProviderResult<String> {
        Ok(format!(r#"{{"notation":"{}"}}"#, notation))
    }
}

/// Transformer that wraps the error description in a page
pub struct MockTransformer {
    pub fail: bool,
}

impl HtmlTransformer for MockTransformer {
    fn transform(
        &self,
        object: &serde_json::Value,
        params: &RenderParams,
    ) -> Result<String, TransformError> {
        if self.fail {
            return Err(TransformError("template missing".to_string()));
        }
        Ok(format!(
            "<html lang=\"{}\"><body>{}</body></html>",
            params.lang,
            object["description"].as_str().unwrap_or_default()
        ))
    }
}

/// Transformer whose template engine blows up
pub struct PanickingTransformer;

impl HtmlTransformer for PanickingTransformer {
    fn transform(
        &self,
        _object: &serde_json::Value,
        _params: &RenderParams,
    ) -> Result<String, TransformError> {
        panic!("template engine crashed")
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, subject: &str, body: &str) -> Result<(), MailError> {
        self.sent.lock().push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

/// Gateway configuration with `10.0.0.0/8` as the UB range
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.access.ub = Some(AccessRangeConfig {
        ranges: vec!["10.0.0.0/8".to_string()],
        exceptions: vec!["10.9.9.9".to_string()],
    });
    config
}

pub fn discovery_only(discovery: Arc<MockDiscovery>) -> Providers {
    Providers {
        discovery: Some(discovery),
        ..Default::default()
    }
}

pub fn state(config: GatewayConfig, providers: Providers, mailer: Arc<RecordingMailer>) -> AppState {
    AppState::new(config, providers, Some(mailer)).unwrap()
}

pub fn get(uri: &str, forwarded_for: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", forwarded_for)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(state: AppState, request: Request<Body>) -> Response<Body> {
    create_router(state).oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

// =============================================================================
// Test Server
// =============================================================================

/// A test server on a real socket that shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: reqwest::Client,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    pub async fn start(router: axum::Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .ok();
        });

        // Give server a moment to start
        tokio::time::sleep(Duration::from_millis(10)).await;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        Self {
            addr,
            client,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
