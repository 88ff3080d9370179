//! Start the real `gamehub` binary and talk to it over HTTP.
//!
//! Every config used here sets `start_on_boot = false` so the binary never
//! reaches the real feed.

use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};

/// Find an available port
fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

fn offline_config(port: u16) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {port}

[feed]
sid = "TEST123"

[sync]
start_on_boot = false
"#
    )
}

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn gamehub() -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_gamehub"));
    command.env("RUST_LOG", "error").kill_on_drop(true);
    command
}

/// Run the binary with `config_path` until it exits on its own.
async fn run_to_exit(config_path: &Path) -> Output {
    timeout(
        Duration::from_secs(5),
        gamehub().env("GAMEHUB_CONFIG", config_path).output(),
    )
    .await
    .expect("Server did not exit")
    .expect("Failed to execute server")
}

/// A running server process; killed when dropped.
struct TestServer {
    _child: Child,
    port: u16,
    client: Client,
}

impl TestServer {
    /// Spawn `command` and wait until it answers the health check.
    async fn start(mut command: Command, port: u16) -> Self {
        let child = command.spawn().expect("Failed to spawn server");
        let server = Self {
            _child: child,
            port,
            client: Client::new(),
        };

        for _ in 0..40 {
            if server.client.get(server.url("/api/v1/health")).send().await.is_ok() {
                return server;
            }
            sleep(Duration::from_millis(50)).await;
        }
        panic!("Server did not start on port {}", port);
    }

    async fn with_config(config_path: &Path, port: u16) -> Self {
        let mut command = gamehub();
        command.env("GAMEHUB_CONFIG", config_path);
        Self::start(command, port).await
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    async fn get_json(&self, path: &str) -> Value {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request");
        assert!(response.status().is_success(), "GET {} failed", path);
        response.json().await.expect("Failed to parse JSON")
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let port = free_port();
    let config = config_file(&offline_config(port));
    let server = TestServer::with_config(config.path(), port).await;

    let json = server.get_json("/api/v1/health").await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_config_endpoint_hides_site_id() {
    let port = free_port();
    let config = config_file(&offline_config(port));
    let server = TestServer::with_config(config.path(), port).await;

    let json = server.get_json("/api/v1/config").await;
    assert_eq!(json["server"]["port"], port);
    assert_eq!(json["feed"]["sid_configured"], true);
    assert!(json["feed"].get("sid").is_none());
    assert!(!json.to_string().contains("TEST123"));
}

#[tokio::test]
async fn test_sync_stays_idle_when_not_started_on_boot() {
    let port = free_port();
    let config = config_file(&offline_config(port));
    let server = TestServer::with_config(config.path(), port).await;

    let json = server.get_json("/api/v1/catalog").await;
    assert_eq!(json["sync"]["phase"], "idle");
    assert_eq!(json["catalog"]["total"], 0);
}

#[tokio::test]
async fn test_metrics_served_at_root() {
    let port = free_port();
    let config = config_file(&offline_config(port));
    let server = TestServer::with_config(config.path(), port).await;

    let body = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .expect("Failed to send request")
        .text()
        .await
        .unwrap();
    assert!(body.contains("gamehub_catalog_complete 0"));
}

#[tokio::test]
async fn test_missing_config_file_uses_environment() {
    let port = free_port();

    let mut command = gamehub();
    command
        .env("GAMEHUB_CONFIG", "/nonexistent/config.toml")
        .env("GAMEHUB_SERVER__HOST", "127.0.0.1")
        .env("GAMEHUB_SERVER__PORT", port.to_string())
        .env("GAMEHUB_SYNC__START_ON_BOOT", "false");
    let server = TestServer::start(command, port).await;

    let json = server.get_json("/api/v1/config").await;
    assert_eq!(json["server"]["port"], port);
    assert_eq!(json["sync"]["start_on_boot"], false);
}

#[tokio::test]
async fn test_invalid_port_exits_with_error() {
    let config = config_file("[server]\nport = 0\n");
    assert!(!run_to_exit(config.path()).await.status.success());
}

#[tokio::test]
async fn test_empty_site_id_exits_with_error() {
    let config = config_file("[feed]\nsid = \"  \"\n\n[sync]\nstart_on_boot = false\n");
    assert!(!run_to_exit(config.path()).await.status.success());
}

#[tokio::test]
async fn test_malformed_config_exits_with_error() {
    let config = config_file("[sync]\npage_size = \"lots\"\n");
    assert!(!run_to_exit(config.path()).await.status.success());
}
