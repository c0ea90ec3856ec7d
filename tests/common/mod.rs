#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use postboard_api::auth::{TokenSecret, TokenService};
use reqwest::StatusCode;
use serde_json::{json, Value};
use uuid::Uuid;

/// Signing key shared by the spawned server and the tests that mint tokens.
pub const TEST_SECRET: &str = "integration-test-signing-key-0123456789";

const SCHEMA_LOCK: i64 = 0x706f_7374;

static SERVER: OnceLock<TestServer> = OnceLock::new();

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

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_postboard-api"));
        cmd.env("PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("SECRET_KEY", TEST_SECRET)
            .env("DATABASE_CONNECTION_TIMEOUT", "3")
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // DATABASE_URL is inherited when set
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
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
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

pub fn tokens() -> TokenService {
    TokenService::new(TokenSecret::new(TEST_SECRET).expect("test secret is long enough"))
}

/// A valid token for an identity that need not exist in the database.
pub fn token_for(user_id: Uuid, username: &str) -> String {
    let (token, _) = tokens()
        .issue(
            user_id,
            username,
            &format!("{}@example.com", username),
            chrono::Duration::minutes(5),
        )
        .expect("issue token");
    token
}

/// Connects to `DATABASE_URL` and applies the schema. `None` when no database
/// is configured, in which case the calling test returns early.
pub async fn database() -> Result<Option<()>> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping");
        return Ok(None);
    };

    use sqlx::Connection;

    let mut conn = sqlx::PgConnection::connect(&url).await.context("connect to DATABASE_URL")?;

    // Test binaries run concurrently; serialize the DDL
    sqlx::query("SELECT pg_advisory_lock($1)").bind(SCHEMA_LOCK).execute(&mut conn).await?;
    let schema = include_str!("../../sql/schema.sql");
    for statement in schema
        .split(';')
        .map(|s| s.lines().filter(|l| !l.trim_start().starts_with("--")).collect::<Vec<_>>().join("\n"))
        .filter(|s| !s.trim().is_empty())
    {
        sqlx::query(&statement).execute(&mut conn).await?;
    }
    sqlx::query("SELECT pg_advisory_unlock($1)").bind(SCHEMA_LOCK).execute(&mut conn).await?;
    conn.close().await?;

    Ok(Some(()))
}

pub fn unique(prefix: &str) -> String {
    format!("{}_{}", prefix, &Uuid::new_v4().simple().to_string()[..12])
}

pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub token: String,
}

/// Register a fresh account and log it in.
pub async fn register_and_login(server: &TestServer, client: &reqwest::Client) -> Result<Account> {
    let username = unique("user");
    let email = format!("{}@example.com", username);
    let password = "correct horse battery".to_string();

    let res = client
        .post(server.url("/api/v1/auth/register"))
        .json(&json!({"username": username, "email": email, "password": password}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());
    let body: Value = res.json().await?;
    let id = Uuid::parse_str(body["data"]["id"].as_str().context("missing id")?)?;

    let res = client
        .post(server.url("/api/v1/auth/login"))
        .json(&json!({"identifier": username, "password": password}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());
    let body: Value = res.json().await?;
    let token = body["data"]["access_token"].as_str().context("missing token")?.to_string();

    Ok(Account { id, username, email, password, token })
}
