#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

static SERVER: OnceLock<TestServer> = OnceLock::new();
static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Cargo builds the binary before running integration tests
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_inventory-api"));
        cmd.env("APP_ENV", "development")
            .env("HOST", "127.0.0.1")
            .env("INVENTORY_API_PORT", port.to_string())
            .env("DATABASE_URL", "memory://")
            .env("JWT_SECRET", "integration-test-secret")
            .env("API_ENABLE_REQUEST_LOGGING", "false")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Username no other test in this process will pick
pub fn unique_username(prefix: &str) -> String {
    let n = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("{}_{}_{}", prefix, std::process::id(), n)
}

pub async fn register(server: &TestServer, client: &reqwest::Client, username: &str, password: &str) -> Result<Value> {
    let res = client
        .post(server.url("/register"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?;

    anyhow::ensure!(res.status() == StatusCode::OK, "register returned {}", res.status());
    Ok(res.json().await?)
}

/// Registers a fresh user and returns a bearer token for it
pub async fn login_new_user(server: &TestServer, client: &reqwest::Client) -> Result<String> {
    let username = unique_username("user");
    register(server, client, &username, "pw1").await?;

    let res = client
        .post(server.url("/token"))
        .form(&[("username", username.as_str()), ("password", "pw1")])
        .send()
        .await?;

    anyhow::ensure!(res.status() == StatusCode::OK, "login returned {}", res.status());
    let body: Value = res.json().await?;
    body["access_token"]
        .as_str()
        .map(str::to_string)
        .context("missing access_token")
}
