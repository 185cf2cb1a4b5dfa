use crate::client::AlvaApi;
use crate::config::AppConfig;
use crate::fetch::{FetchFailure, FetchPool};
use crate::model::uri::UriExtractor;
use crate::render::dashboard::DashboardRenderer;
use crate::resolve::transform::TransformRegistry;
use crate::runtime::session::{RunRequest, bootstrap_session};
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub session_id: String,
    pub output_path: PathBuf,
    /// Widgets in the dashboard config, rendered or not.
    pub widget_count: usize,
    pub failures: Vec<FetchFailure>,
}

/// 端到端流水线：会话 -> 配置 -> 拉取 -> 渲染 -> 写文件
pub struct DashboardPipeline {
    config: Arc<AppConfig>,
    api: Arc<dyn AlvaApi>,
    extractor: Arc<UriExtractor>,
    renderer: DashboardRenderer,
}

impl DashboardPipeline {
    pub fn new(config: Arc<AppConfig>, api: Arc<dyn AlvaApi>) -> Result<Self> {
        Self::with_transforms(config, api, Arc::new(TransformRegistry::with_builtins()))
    }

    pub fn with_transforms(config: Arc<AppConfig>, api: Arc<dyn AlvaApi>, transforms: Arc<TransformRegistry>) -> Result<Self> {
        let extractor = Arc::new(UriExtractor::new(&config.uri_scheme)?);
        let renderer = DashboardRenderer::new(config.clone(), extractor.clone(), transforms);
        Ok(Self { config, api, extractor, renderer })
    }

    /// Fetch everything a session's dashboard needs and return the finished HTML.
    pub async fn render_session(&self, session_id: &str) -> Result<(String, usize, Vec<FetchFailure>)> {
        let dashboard = self.api.dashboard_config(session_id).await?;
        let widget_count = dashboard.config.len();
        info!("📊 {} widget(s) in \"{}\"", widget_count, dashboard.title());

        let mut uris: Vec<String> = Vec::new();
        for widget in &dashboard.config {
            let Some(chart_data) = widget.chart_data.as_deref() else { continue };
            for uri in self.extractor.extract(chart_data) {
                if !uris.contains(&uri) {
                    uris.push(uri);
                }
            }
        }

        let pool = FetchPool::new(self.api.clone(), self.extractor.clone(), self.config.fetch_batch_size);
        let fetched = pool.fetch_all(&uris).await;
        if !fetched.failures.is_empty() {
            warn!("⚠️ {} fetch(es) failed; affected widgets render empty", fetched.failures.len());
        }

        let generated_at = Utc::now().with_timezone(&self.config.offset());
        let html = self.renderer.render_document(&dashboard, &fetched, generated_at);
        Ok((html, widget_count, fetched.failures))
    }

    pub async fn run(&self, request: &RunRequest) -> Result<RunOutcome> {
        let plan = request.plan()?;
        let timeout = request.timeout.unwrap_or_else(|| self.config.create_timeout());
        let session = bootstrap_session(self.api.as_ref(), &plan, timeout).await?;

        let (html, widget_count, failures) = self.render_session(&session.session_id).await?;

        let output_path = request
            .output
            .clone()
            .unwrap_or_else(|| self.config.output_path_for(&session.session_id));
        if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
        }
        fs::write(&output_path, html)
            .with_context(|| format!("Failed to write dashboard to {}", output_path.display()))?;

        info!("💾 Saved: {}", output_path.display());
        Ok(RunOutcome { session_id: session.session_id, output_path, widget_count, failures })
    }
}
