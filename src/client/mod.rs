pub mod http;
pub mod stream;

use crate::model::DashboardConfig;
use crate::model::uri::DataUri;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Session returned by the dashboard-creation stream.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedSession {
    pub session_id: String,
    pub session_name: Option<String>,
}

/// Remote Alva service. Implemented over HTTP by [`http::HttpClient`];
/// tests substitute in-memory fakes.
#[async_trait]
pub trait AlvaApi: Send + Sync {
    /// Ask the service to build a dashboard; blocks until the event stream ends.
    async fn create_dashboard(&self, message: &str, timeout: Duration) -> Result<CreatedSession>;

    async fn dashboard_config(&self, session_id: &str) -> Result<DashboardConfig>;

    /// Decoded series payload behind a data URI.
    async fn time_series(&self, uri: &str) -> Result<Value>;

    /// Field documentation of the node output behind a data URI, if any.
    async fn node_typedoc(&self, uri: &DataUri) -> Result<Option<String>>;
}
