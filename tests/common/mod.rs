#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use traceability_hub::auth::IdentityVerifier;
use traceability_hub::config::{AppConfig, FilterConfig};
use traceability_hub::database::models::entity::USERS;
use traceability_hub::database::{MemoryStore, Row, Store};
use traceability_hub::services::webhook_service::{sign, SIGNATURE_HEADER};
use traceability_hub::{router, AppState};

// ---------------------------------------------------------------------------
// In-process app: router over a fresh MemoryStore, driven with oneshot
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub config: AppConfig,
    identity: IdentityVerifier,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.filter = FilterConfig::default();

        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store.clone()), &config);
        let identity = state.identity.clone();
        Self { router: router(state), store, config, identity }
    }

    pub fn token(&self, sub: &str) -> String {
        self.identity.issue(sub, Some(format!("{}@example.com", sub)), 1).expect("issue token")
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&v)?)
            }
            None => Body::empty(),
        };
        self.send(builder.body(body)?).await
    }

    pub async fn send(&self, request: Request<Body>) -> Result<(StatusCode, Value)> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
        Ok((status, body))
    }

    pub async fn get(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> Result<(StatusCode, Value)> {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> Result<(StatusCode, Value)> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Onboard `sub` as admin of a new organization; returns (token, organization id)
    pub async fn onboard_admin(&self, sub: &str, organization: &str) -> Result<(String, String)> {
        let token = self.token(sub);
        let (status, body) = self
            .post("/api/onboarding", &token, json!({ "organization": { "name": organization } }))
            .await?;
        anyhow::ensure!(status == StatusCode::CREATED, "onboarding failed: {} {}", status, body);
        let org_id = body["data"]["organization"]["id"].as_str().context("organization id")?.to_string();
        Ok((token, org_id))
    }

    /// Insert a user record directly and return a token for it
    pub async fn add_member(&self, sub: &str, organization_id: &str, role: &str) -> Result<String> {
        let mut row = Row::new();
        row.insert("id".into(), json!(Uuid::new_v4().to_string()));
        row.insert("external_id".into(), json!(sub));
        row.insert("organization_id".into(), json!(organization_id));
        row.insert("role".into(), json!(role));
        row.insert("is_active".into(), json!(true));
        self.store.insert(&USERS, row).await?;
        Ok(self.token(sub))
    }

    pub async fn webhook(&self, payload: &Value, signature: Option<String>) -> Result<(StatusCode, Value)> {
        let bytes = serde_json::to_vec(payload)?;
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/webhooks/identity")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(sig) = signature {
            builder = builder.header(SIGNATURE_HEADER, sig);
        }
        self.send(builder.body(Body::from(bytes))?).await
    }

    pub fn sign(&self, payload: &Value) -> Result<String> {
        Ok(sign(&self.config.security.webhook_secret, &serde_json::to_vec(payload)?)?)
    }
}

// ---------------------------------------------------------------------------
// Spawned binary: `serve --memory` on a free port, probed over HTTP
// ---------------------------------------------------------------------------

static SERVER: OnceLock<TestServer> = OnceLock::new();

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_traceability-hub"));
        cmd.args(["serve", "--memory", "--port", &port.to_string()])
            .env("APP_ENV", "development")
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
                if resp.status() == reqwest::StatusCode::OK || resp.status() == reqwest::StatusCode::SERVICE_UNAVAILABLE {
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
