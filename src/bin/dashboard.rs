use alva_dashboard::client::http::HttpClient;
use alva_dashboard::config::credentials::load_credentials;
use alva_dashboard::config::loader::load_config;
use alva_dashboard::runtime::pipeline::DashboardPipeline;
use alva_dashboard::runtime::session::RunRequest;
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, info, warn};

/// Build an Alva dashboard and render it to a standalone HTML file.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Dashboard request in natural language
    message: Vec<String>,

    /// Reuse an existing dashboard session instead of creating one
    #[arg(long, short)]
    session: Option<String>,

    /// Re-fetch and re-render an existing session
    #[arg(long, requires = "session")]
    refresh: bool,

    /// Output HTML path
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Dashboard creation timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// YAML file overriding endpoints and tuning
    #[arg(long)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    let config = Arc::new(load_config(cli.config.as_deref())?);
    let credentials = load_credentials(&config)?;
    let client = HttpClient::new(config.clone(), credentials)?;
    let pipeline = DashboardPipeline::new(config, Arc::new(client))?;

    let request = RunRequest {
        message: cli.message,
        session: cli.session,
        refresh: cli.refresh,
        output: cli.output,
        timeout: cli.timeout.map(Duration::from_secs),
    };
    let outcome = pipeline.run(&request).await?;

    if !outcome.failures.is_empty() {
        warn!("{} of the requested series/typedocs could not be fetched", outcome.failures.len());
    }
    info!("Session: {}", outcome.session_id);
    info!("Output: {}", outcome.output_path.display());
    info!("🔄 Refresh: dashboard --session {} --refresh", outcome.session_id);

    println!("MEDIA:{}", outcome.output_path.display());
    Ok(())
}
