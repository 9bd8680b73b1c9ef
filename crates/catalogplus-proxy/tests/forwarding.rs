//! Integration tests for the forwarding provider against a local upstream

use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::{Query, RawQuery};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use tokio::net::TcpListener;

use catalogplus_core::{
    AccessTier, Language, ProviderError, QueryParameters, RenderParams, ResourceDiscoveryService,
    Service, VirtualClassificationSystem,
};
use catalogplus_proxy::{HttpDiscoveryService, ProxyConfig};

async fn echo_query(RawQuery(query): RawQuery) -> String {
    query.unwrap_or_default()
}

async fn failing() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": "SOLR_DOWN", "description": "index offline"})),
    )
}

async fn classification(
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "class": params.get("class"),
        "format": params.get("format"),
        "authorization": headers
            .get("authorization")
            .and_then(|v| v.to_str().ok()),
    }))
}

async fn start_upstream() -> SocketAddr {
    let api = Router::new()
        .route("/search", get(echo_query))
        .route("/getRecords", get(echo_query))
        .route("/getRecordCount", get(failing))
        .route("/typeahead", get(echo_query))
        .route("/classification", get(classification))
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"dependencies": {"solr": "ok", "mongodb": "failed"}})) }),
        );
    let router = Router::new().nest("/api", api);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });
    addr
}

fn proxy(addr: SocketAddr, auth_token: Option<&str>) -> HttpDiscoveryService {
    HttpDiscoveryService::new(&ProxyConfig {
        url: format!("http://{}/api", addr),
        auth_token: auth_token.map(str::to_string),
        timeout_secs: 5,
    })
    .unwrap()
}

fn pairs(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.as_bytes())
        .into_owned()
        .collect()
}

#[tokio::test]
async fn search_forwards_normalized_parameters() {
    let addr = start_upstream().await;
    let proxy = proxy(addr, None);

    let params = QueryParameters {
        q: "goethe faust".to_string(),
        fq: "a;b".to_string(),
        ..Default::default()
    };
    let body = proxy.results_as_json(Service::Search, &params).await.unwrap();

    let forwarded = pairs(&body);
    assert_eq!(forwarded["q"], "goethe faust");
    assert_eq!(forwarded["fq"], "a;b");
    assert_eq!(forwarded["news"], "true");
    assert_eq!(forwarded["type"], "full");
    assert_eq!(forwarded["format"], "json");
}

#[tokio::test]
async fn html_results_carry_render_parameters() {
    let addr = start_upstream().await;
    let proxy = proxy(addr, None);

    let mut render = RenderParams::new(
        &Language::En,
        AccessTier {
            ub_internal: true,
            ..Default::default()
        },
    );
    render.recordset = Some("&fq=Institution:UBDO".to_string());

    let body = proxy
        .results_as_html(Service::GetRecords, &QueryParameters::default(), &render)
        .await
        .unwrap();

    let forwarded = pairs(&body);
    assert_eq!(forwarded["format"], "html");
    assert_eq!(forwarded["isUBintern"], "true");
    assert_eq!(forwarded["recordset"], "&fq=Institution:UBDO");
    assert_eq!(forwarded["lang"], "de");
}

#[tokio::test]
async fn upstream_errors_are_mapped() {
    let addr = start_upstream().await;
    let proxy = proxy(addr, None);

    let err = proxy
        .results_as_json(Service::GetRecordCount, &QueryParameters::default())
        .await
        .unwrap_err();

    match err {
        ProviderError::Upstream { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "index offline");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn missing_upstream_route_is_upstream_404() {
    let addr = start_upstream().await;
    let proxy = proxy(addr, None);

    let err = proxy.results_as_xml(Service::Class, &QueryParameters::default()).await.unwrap_err();
    assert!(matches!(err, ProviderError::Upstream { status: 404, .. }));
}

#[tokio::test]
async fn unreachable_upstream_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let proxy = proxy(addr, None);
    let err = proxy.suggestions("goe").await.unwrap_err();
    assert!(matches!(err, ProviderError::Transport(_)));
}

#[tokio::test]
async fn suggestions_forward_prefix() {
    let addr = start_upstream().await;
    let body = proxy(addr, None).suggestions("goe").await.unwrap();
    assert_eq!(pairs(&body)["q"], "goe");
}

#[tokio::test]
async fn classification_sends_bearer_token() {
    let addr = start_upstream().await;
    let proxy = proxy(addr, Some("s3cret"));

    let body = proxy.class_as_json("TWF").await.unwrap();
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["class"], "TWF");
    assert_eq!(value["format"], "json");
    assert_eq!(value["authorization"], "Bearer s3cret");
}

#[tokio::test]
async fn health_reads_dependencies() {
    let addr = start_upstream().await;
    let proxy = proxy(addr, None);

    let health = ResourceDiscoveryService::health(&proxy).await.unwrap();
    assert_eq!(health["solr"], "ok");
    assert_eq!(health["mongodb"], "failed");
}
