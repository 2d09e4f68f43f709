#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// A running `jobly serve`; dropping it stops the process.
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

        // The server runs in the test environment, so it migrates and talks to jobly_test
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_jobly"));
        cmd.arg("serve")
            .env("PORT", port.to_string())
            .env("APP_ENV", "test")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
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
}

/// Integration tests need a reachable Postgres; without DATABASE_URL they are skipped.
pub fn database_configured() -> bool {
    if std::env::var("DATABASE_URL").is_ok() {
        return true;
    }
    eprintln!("DATABASE_URL not set; skipping integration test");
    false
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Start a server for one test. Keep the returned handle alive while using it.
pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(15)).await?;
    Ok(server)
}

/// Pool on the same test database the spawned server uses.
pub async fn test_pool() -> Result<PgPool> {
    test_pool_with(2).await
}

pub async fn test_pool_with(max_connections: u32) -> Result<PgPool> {
    let raw = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    let mut url = url::Url::parse(&raw)?;
    url.set_path("/jobly_test");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(url.as_str())
        .await
        .context("failed to connect to jobly_test")?;
    Ok(pool)
}

/// Insert a company (replacing any leftover from an earlier run) and drop its jobs.
pub async fn seed_company(pool: &PgPool, handle: &str, name: &str) -> Result<()> {
    sqlx::query("DELETE FROM companies WHERE handle = $1 OR name = $2")
        .bind(handle)
        .bind(name)
        .execute(pool)
        .await?;
    sqlx::query(
        "INSERT INTO companies (handle, name, num_employees, description, logo_url)
         VALUES ($1, $2, 10, 'Seeded by tests', NULL)",
    )
    .bind(handle)
    .bind(name)
    .execute(pool)
    .await?;
    Ok(())
}

pub fn admin_token() -> String {
    jobly::auth::create_token("test-admin", true).expect("token")
}

pub fn user_token() -> String {
    jobly::auth::create_token("test-user", false).expect("token")
}
