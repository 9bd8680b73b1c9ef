//! E2E tests over a real socket
//!
//! Starts the gateway on an ephemeral port and talks to it with reqwest,
//! the way a browser or the catalog front end would.

mod common;

use std::sync::Arc;

use catalogplus_api::create_router;

use common::*;

async fn start_server(mailer: Arc<RecordingMailer>) -> TestServer {
    start_with(Arc::new(MockDiscovery::new(Behavior::Answer)), mailer).await
}

async fn start_with(discovery: Arc<MockDiscovery>, mailer: Arc<RecordingMailer>) -> TestServer {
    let state = state(test_config(), discovery_only(discovery), mailer);
    TestServer::start(create_router(state)).await
}

#[tokio::test]
async fn external_json_search_gets_bad_request() {
    let mailer = Arc::new(RecordingMailer::default());
    let server = start_server(mailer.clone()).await;

    let response = server
        .client
        .get(server.url("/search?q=*&format=json"))
        .header("X-Forwarded-For", format!("{}, 10.0.0.1", EXTERNAL_IP))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "BAD REQUEST");
    assert_eq!(mailer.sent.lock().len(), 1);

    server.shutdown().await;
}

#[tokio::test]
async fn accept_header_selects_json() {
    let server = start_server(Arc::new(RecordingMailer::default())).await;

    let response = server
        .client
        .get(server.url("/search?q=goethe"))
        .header("X-Forwarded-For", INTERNAL_IP)
        .header("Accept", "application/json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["docs"][0]["id"], "ub_1");

    server.shutdown().await;
}

#[tokio::test]
async fn request_url_uses_host_header() {
    let discovery = Arc::new(MockDiscovery::new(Behavior::Answer));
    let server = start_with(discovery.clone(), Arc::new(RecordingMailer::default())).await;

    let response = server
        .client
        .get(server.url("/getRecords?ids=ub_1&mode=simplehit"))
        .header("X-Forwarded-For", EXTERNAL_IP)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/html;charset=UTF-8"
    );
    assert_eq!(
        discovery.renders.lock()[0].records_base_url.as_deref(),
        Some(format!("http://{}/getRecords?ids=", server.addr).as_str())
    );

    server.shutdown().await;
}

#[tokio::test]
async fn preflight_over_the_wire() {
    let server = start_server(Arc::new(RecordingMailer::default())).await;

    let response = server
        .client
        .request(reqwest::Method::OPTIONS, server.url("/search"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()["access-control-allow-methods"], "GET, OPTIONS");
    assert!(response.text().await.unwrap().is_empty());

    server.shutdown().await;
}
