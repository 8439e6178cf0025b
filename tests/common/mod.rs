#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use project_management_api::config::AppConfig;
use project_management_api::database::MemoryStore;
use project_management_api::{app, AppState};

/// Router served in-process on a free port, backed by a fresh memory store
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    client: reqwest::Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(AppConfig::development()).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test port")?;
        let router = app(AppState::new(Arc::new(MemoryStore::new()), &config), &config);
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self { port, base_url, client: reqwest::Client::new() };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// POST a query with an optional `X-User-Role` header
    pub async fn graphql(&self, role: Option<&str>, query: &str) -> Result<Value> {
        self.graphql_with(role, None, query).await
    }

    pub async fn graphql_with(&self, role: Option<&str>, user_id: Option<&str>, query: &str) -> Result<Value> {
        let mut request = self.client.post(self.url("/query")).json(&json!({ "query": query }));
        if let Some(role) = role {
            request = request.header("X-User-Role", role);
        }
        if let Some(id) = user_id {
            request = request.header("X-User-Id", id);
        }

        let res = request.send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "unexpected status: {}", res.status());
        Ok(res.json().await?)
    }
}

/// `extensions.code` of the first error, if any
pub fn error_code(body: &Value) -> Option<&str> {
    body["errors"][0]["extensions"]["code"].as_str()
}
