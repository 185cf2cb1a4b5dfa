use std::path::PathBuf;
use thiserror::Error;

/// 运行期错误分类
/// Fatal kinds bubble up to `main`; the rest are caught where they happen and logged.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("no Alva credentials found (searched env and {} file(s))", searched.len())]
    MissingCredentials { searched: Vec<PathBuf> },

    #[error("usage: {0}")]
    Usage(String),

    #[error("HTTP {status}")]
    Transport { status: u16 },

    #[error("Alva API error: {0}")]
    Api(String),

    #[error("malformed {what}: {source}")]
    MalformedPayload {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("dashboard stream ended without a session id")]
    MissingSession,

    #[error("transform failed: {0}")]
    Transform(String),
}

impl DashboardError {
    pub fn malformed(what: &'static str, source: serde_json::Error) -> Self {
        Self::MalformedPayload { what, source }
    }
}
