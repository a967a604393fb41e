#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{redirect, Client, RequestBuilder};
use serde_json::Value;
use store_admin::config::AppConfig;
use store_admin::database::MemoryDatastore;
use store_admin::{app, AppState};

/// An in-process server on a free port, backed by the in-memory datastore.
///
/// Each test gets its own server because each `#[tokio::test]` owns its runtime.
pub struct TestServer {
    pub base_url: String,
    pub datastore: Arc<MemoryDatastore>,
    pub state: AppState,
    client: Client,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        Self::start_with(AppConfig::development()).await
    }

    pub async fn start_with(config: AppConfig) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let datastore = Arc::new(MemoryDatastore::new());
        let state = AppState::new(config, datastore.clone())?;

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        // Gates answer with redirects; tests assert on them directly
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;

        Ok(Self { base_url, datastore, state, client })
    }

    pub fn token(&self, user_id: &str) -> Result<String> {
        Ok(self.state.identity.issue(user_id)?)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path))
    }

    pub fn patch(&self, path: &str) -> RequestBuilder {
        self.client.patch(self.url(path))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.client.delete(self.url(path))
    }

    /// Request with the caller's bearer token attached
    pub fn as_user(&self, request: RequestBuilder, user_id: &str) -> Result<RequestBuilder> {
        Ok(request.bearer_auth(self.token(user_id)?))
    }
}

/// Status and plain-text body
pub async fn text(request: RequestBuilder) -> Result<(reqwest::StatusCode, String)> {
    let res = request.send().await?;
    let status = res.status();
    Ok((status, res.text().await?))
}

/// Status and JSON body
pub async fn json(request: RequestBuilder) -> Result<(reqwest::StatusCode, Value)> {
    let res = request.send().await?;
    let status = res.status();
    let body = res.json::<Value>().await?;
    Ok((status, body))
}
