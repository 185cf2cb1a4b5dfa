pub mod credentials;
pub mod loader;

use chrono::{FixedOffset, Offset, Utc};
use serde::{Serialize, Deserialize};
use std::path::PathBuf;
use std::time::Duration;

/// 进程级配置 (Process-wide configuration)
/// Built once at start-up and shared via `Arc`; components never reach for globals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub chat_endpoint: String,
    pub query_endpoint: String,
    pub dashboard_skill_id: String,
    pub dashboard_config_hash: String,
    pub time_series_hash: String,
    pub apollo_client_name: String,
    pub apollo_client_version: String,
    /// Scheme of embedded data references, e.g. `alva` in `alva://time_series/...`
    pub uri_scheme: String,
    pub timezone: String,
    pub timezone_offset_min: i32,
    /// URIs fetched per group; each URI issues two requests.
    pub fetch_batch_size: usize,
    pub create_timeout_secs: u64,
    pub chart_library_url: String,
    pub credential_env: String,
    pub credential_paths: Vec<PathBuf>,
    pub output_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            chat_endpoint: "https://api-llm2.prd.alva.xyz/chat".to_string(),
            query_endpoint: "https://api-llm2.prd.alva.xyz/query".to_string(),
            dashboard_skill_id: "1982927545146347011".to_string(),
            dashboard_config_hash: "095ea7520bde2d2f6c491cd4816708db8a85a9f639256e567b158a56098a36f2".to_string(),
            time_series_hash: "790017e6116231f959b7169b1176fe0b07c9007f4a578d131e7a395bc32f302f".to_string(),
            apollo_client_name: "@apollo/client".to_string(),
            apollo_client_version: "4.0.9".to_string(),
            uri_scheme: "alva".to_string(),
            timezone: "Asia/Shanghai".to_string(),
            timezone_offset_min: 480,
            fetch_batch_size: 5,
            create_timeout_secs: 600,
            chart_library_url: "https://cdn.jsdelivr.net/npm/echarts@5.5.0/dist/echarts.min.js".to_string(),
            credential_env: "ALVA_JWT_TOKEN".to_string(),
            credential_paths: vec![
                PathBuf::from("secrets/alva.json"),
                PathBuf::from("alva-ask/data/credentials.json"),
            ],
            output_dir: None,
        }
    }
}

impl AppConfig {
    pub fn create_timeout(&self) -> Duration {
        Duration::from_secs(self.create_timeout_secs)
    }

    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.timezone_offset_min * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Default output location for a session when `--output` is not given.
    pub fn output_path_for(&self, session_id: &str) -> PathBuf {
        let dir = self.output_dir.clone().unwrap_or_else(std::env::temp_dir);
        dir.join(format!("alva-dashboard-{}.html", session_id))
    }
}
