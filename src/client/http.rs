use async_trait::async_trait;
use crate::client::{AlvaApi, CreatedSession};
use crate::client::stream::{LineDecoder, SessionTracker, WidgetTask};
use crate::config::AppConfig;
use crate::config::credentials::Credentials;
use crate::error::DashboardError;
use crate::model::DashboardConfig;
use crate::model::uri::DataUri;
use anyhow::{Result, anyhow};
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const TYPEDOC_QUERY: &str =
    "query GetNodeTypedoc($input: GetNodeTypedocInput!) { GetNodeTypedoc(input: $input) { typedoc } }";

/// reqwest-backed client. Proxies from `HTTPS_PROXY` are picked up by reqwest itself.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    config: Arc<AppConfig>,
    credentials: Credentials,
}

impl HttpClient {
    pub fn new(config: Arc<AppConfig>, credentials: Credentials) -> Result<Self> {
        let client = Client::builder().build()?;
        Ok(Self { client, config, credentials })
    }

    /// Persisted-query request body (Apollo style).
    pub fn persisted_query_body(config: &AppConfig, operation: &str, variables: Value, hash: &str) -> Value {
        json!({
            "operationName": operation,
            "variables": variables,
            "extensions": {
                "clientLibrary": { "name": config.apollo_client_name, "version": config.apollo_client_version },
                "persistedQuery": { "version": 1, "sha256Hash": hash }
            }
        })
    }

    pub fn create_body(config: &AppConfig, message: &str) -> Value {
        json!({
            "message": message,
            "skill_id": config.dashboard_skill_id,
            "session_kind": "Dashboard",
            "input_image_urls": [],
            "timezone": config.timezone,
            "timezone_offset_min": config.timezone_offset_min
        })
    }

    async fn post_query(&self, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(&self.config.query_endpoint)
            .header(AUTHORIZATION, &self.credentials.token)
            .json(body)
            .send()
            .await?;

        let payload: Value = response.json().await?;
        if let Some(first) = payload.get("errors").and_then(Value::as_array).and_then(|e| e.first()) {
            let message = first.get("message").and_then(Value::as_str).unwrap_or("unknown error");
            return Err(DashboardError::Api(message.to_string()).into());
        }
        Ok(payload.get("data").cloned().unwrap_or(Value::Null))
    }

    async fn gql_query(&self, operation: &str, variables: Value, hash: &str) -> Result<Value> {
        let body = Self::persisted_query_body(&self.config, operation, variables, hash);
        self.post_query(&body).await
    }
}

/// Payload fields arrive as JSON strings that need a second decode.
fn decode_nested(value: &Value, what: &'static str) -> Result<Value> {
    match value {
        Value::String(raw) => serde_json::from_str(raw).map_err(|e| DashboardError::malformed(what, e).into()),
        Value::Null => Err(anyhow!(DashboardError::Api(format!("{} missing from response", what)))),
        other => Ok(other.clone()),
    }
}

fn log_progress(tasks: &[WidgetTask]) {
    let summary: Vec<String> = tasks.iter().map(|t| format!("  {} {}", t.icon(), t.task_name)).collect();
    info!("📋 Widgets:\n{}", summary.join("\n"));
}

#[async_trait]
impl AlvaApi for HttpClient {
    async fn create_dashboard(&self, message: &str, timeout: Duration) -> Result<CreatedSession> {
        info!("⏳ Creating dashboard via Alva...");
        let mut response = self
            .client
            .post(&self.config.chat_endpoint)
            .header(AUTHORIZATION, &self.credentials.token)
            .json(&Self::create_body(&self.config, message))
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Transport { status: status.as_u16() }.into());
        }

        let mut decoder = LineDecoder::default();
        let mut tracker = SessionTracker::default();
        while let Some(chunk) = response.chunk().await? {
            for line in decoder.push(&chunk) {
                if let Some(tasks) = tracker.observe(&line) {
                    log_progress(&tasks);
                }
            }
        }
        if let Some(tasks) = decoder.finish().and_then(|line| tracker.observe(&line)) {
            log_progress(&tasks);
        }

        let session = tracker.finish()?;
        info!(
            "✅ Dashboard created: {} ({})",
            session.session_name.as_deref().unwrap_or("untitled"),
            session.session_id
        );
        Ok(session)
    }

    async fn dashboard_config(&self, session_id: &str) -> Result<DashboardConfig> {
        info!("📋 Fetching dashboard config...");
        let data = self
            .gql_query(
                "GetDashboardConfig",
                json!({ "input": { "sessionId": session_id } }),
                &self.config.dashboard_config_hash,
            )
            .await?;
        let config = decode_nested(&data["GetDashboardConfig"]["config"], "dashboard config")?;
        serde_json::from_value(config).map_err(|e| DashboardError::malformed("dashboard config", e).into())
    }

    async fn time_series(&self, uri: &str) -> Result<Value> {
        let data = self
            .gql_query("GetTimeSeriesData", json!({ "input": { "uri": uri } }), &self.config.time_series_hash)
            .await?;
        decode_nested(&data["GetTimeSeriesData"]["data"], "time series data")
    }

    async fn node_typedoc(&self, uri: &DataUri) -> Result<Option<String>> {
        let body = json!({
            "operationName": "GetNodeTypedoc",
            "query": TYPEDOC_QUERY,
            "variables": {
                "input": { "jagentId": uri.source_id, "nodeName": uri.node_name, "outputName": uri.output_name }
            }
        });
        let data = self.post_query(&body).await?;
        let typedoc = data["GetNodeTypedoc"]["typedoc"].as_str().filter(|s| !s.is_empty()).map(str::to_string);
        debug!(uri = %uri, found = typedoc.is_some(), "Typedoc lookup");
        Ok(typedoc)
    }
}
