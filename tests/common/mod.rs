use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub const BIN: &str = env!("CARGO_BIN_EXE_glpi-tickets-api");

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    _child: Child,
}

/// Command for the server binary pointed at a database port nobody listens on.
pub fn server_command(api_port: u16) -> Result<Command> {
    let db_port = portpicker::pick_unused_port().context("failed to pick free database port")?;

    let mut cmd = Command::new(BIN);
    cmd.env("API_HOST", "127.0.0.1")
        .env("API_PORT", api_port.to_string())
        .env("DB_HOST", "127.0.0.1")
        .env("DB_PORT", db_port.to_string())
        .env("DB_NAME", "glpi")
        .env("DB_USER", "glpi")
        .env("DB_PASSWORD", "glpi")
        .env("DATABASE_CONNECTION_TIMEOUT", "1")
        .env("RUST_LOG", "warn")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::inherit());
    Ok(cmd)
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let child = server_command(port)?.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, _child: child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            // The root document needs no database
            if let Ok(resp) = client.get(&self.base_url).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}
