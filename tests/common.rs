#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, Response};
use figment::providers::{Format, Yaml};
use mockito::{Mock, Server, ServerGuard};
use namenode_exporter::config::{ConfigV1, defaults, extract};
use namenode_exporter::routes::create_router;
use namenode_exporter::startup::build_state;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const SCENARIO_A: &str = r#"{"beans":[{"name":"Hadoop:service=NameNode,name=FSNamesystem","MissingBlocks":3,"CapacityTotal":1000.0,"BlocksTotal":50}]}"#;
pub const SCENARIO_B: &str = r#"{"beans":[{"name":"java.lang:type=Other"}]}"#;

/// Loads a test configuration from YAML layered over the defaults.
pub fn load_test_config(yaml: &str) -> ConfigV1 {
    extract(&defaults().merge(Yaml::string(yaml))).expect("Failed to parse test config YAML")
}

pub fn config_for(jmx_url: &str) -> ConfigV1 {
    load_test_config(&format!(
        r#"
version: "1.0.0"
logging:
  level: "debug"
  format: "json"
namenode:
  jmx_url: "{}"
  timeout_in_ms: 2000
web:
  listen_address: "127.0.0.1:0"
"#,
        jmx_url
    ))
}

pub fn build_app(config: ConfigV1) -> Router {
    let state = build_state(Arc::new(config)).expect("state should build");
    create_router(state)
}

/// A mock NameNode serving `body` at `/jmx`.
pub async fn jmx_server(body: &str) -> (ServerGuard, Mock) {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/jmx")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;
    (server, mock)
}

/// A NameNode that answers a single request with `body`, then stops listening.
///
/// The returned handle finishes once the listener is closed, after which the
/// URL refuses connections.
pub async fn serve_once(body: &'static str) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind one-shot NameNode");
    let url = format!("http://{}/jmx", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("no JMX request arrived");
        let mut request = Vec::new();
        let mut buffer = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let read = stream.read(&mut buffer).await.expect("failed to read request");
            if read == 0 {
                break;
            }
            request.extend_from_slice(&buffer[..read]);
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            body.len(),
            body
        );
        stream
            .write_all(response.as_bytes())
            .await
            .expect("failed to write response");
        stream.shutdown().await.ok();
    });

    (url, handle)
}

/// A URL nobody listens on.
pub fn unreachable_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/jmx", port)
}

pub fn get(path: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(path)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Value of a sample line `<name> <value>` in a text exposition.
pub fn sample(text: &str, name: &str) -> Option<f64> {
    text.lines()
        .filter(|line| !line.starts_with('#'))
        .find_map(|line| {
            let (metric, value) = line.split_once(' ')?;
            (metric == name).then(|| value.parse().ok()).flatten()
        })
}
