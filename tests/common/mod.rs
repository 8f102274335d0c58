//! Common test utilities for integration tests
//!
//! Provides issue payload builders and config fixtures shared by the
//! integration test files.

#![allow(dead_code)]

use issue_finder::domain::models::Config;
use serde_json::{json, Value};
use std::path::Path;
use tempfile::TempDir;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// An issue as the issues endpoint returns it
pub fn issue(repo: &str, number: u32, title: &str, created_at: &str) -> Value {
    json!({
        "number": number,
        "title": title,
        "html_url": format!("https://github.com/{repo}/issues/{number}"),
        "created_at": created_at,
        "repository_url": format!("https://api.github.com/repos/{repo}"),
        "state": "open",
        "labels": [{"id": 1, "name": "good first issue", "color": "7057ff"}]
    })
}

/// A JSON array body of issues
pub fn issues_body(issues: &[Value]) -> String {
    Value::Array(issues.to_vec()).to_string()
}

/// Config pointing at a mock server, with a fast limiter and the snapshot in `dir`
pub fn test_config(base_url: &str, repositories: &[&str], dir: &Path) -> Config {
    let mut config = Config::default();
    config.repositories = repositories.iter().map(ToString::to_string).collect();
    config.github.base_url = base_url.to_string();
    config.github.timeout_secs = 5;
    config.rate_limit.requests_per_second = 1000.0;
    config.snapshot.path = dir.join("issues.csv");
    config.readme.path = dir.join("README.md");
    config
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Serve `body` to requests whose path starts with `answered`; hold every other
/// connection open without replying
///
/// Returns the base URL of the listener.
pub async fn spawn_partial_server(answered: &'static str, body: String) -> String {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                let head = String::from_utf8_lossy(&request);
                let path = head.split_whitespace().nth(1).unwrap_or_default();
                if path.starts_with(answered) {
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                } else {
                    tokio::time::sleep(std::time::Duration::from_secs(30)).await;
                }
            });
        }
    });

    format!("http://{addr}")
}
