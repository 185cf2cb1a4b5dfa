use crate::client::AlvaApi;
use crate::model::uri::UriExtractor;
use crate::resolve::SeriesMap;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Series,
    Typedoc,
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchKind::Series => f.write_str("series"),
            FetchKind::Typedoc => f.write_str("typedoc"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FetchFailure {
    pub uri: String,
    pub kind: FetchKind,
    pub error: String,
}

/// Everything fetched for one render. A URI whose fetch failed is simply absent.
#[derive(Debug, Clone, Default)]
pub struct FetchedData {
    pub series: SeriesMap,
    /// Raw typedoc strings keyed by URI.
    pub typedocs: HashMap<String, String>,
    pub failures: Vec<FetchFailure>,
}

/// Per-task result sent back to the batch collector.
enum FetchOutcome {
    Series { uri: String, result: Result<Value, String> },
    Typedoc { uri: String, result: Result<Option<String>, String> },
}

/// Fetches series data and typedocs in fixed-size groups.
/// Each URI yields two concurrent requests; a group must fully settle before
/// the next one starts. Failures are recorded and never abort siblings.
pub struct FetchPool {
    api: Arc<dyn AlvaApi>,
    extractor: Arc<UriExtractor>,
    batch_size: usize,
}

impl FetchPool {
    pub fn new(api: Arc<dyn AlvaApi>, extractor: Arc<UriExtractor>, batch_size: usize) -> Self {
        Self { api, extractor, batch_size: batch_size.max(1) }
    }

    pub async fn fetch_all(&self, uris: &[String]) -> FetchedData {
        let mut fetched = FetchedData::default();
        info!("📡 Fetching {} time series + typedocs...", uris.len());

        for batch in uris.chunks(self.batch_size) {
            let (tx, mut rx) = mpsc::channel(batch.len() * 2);

            for uri in batch {
                let api = self.api.clone();
                let tx_data = tx.clone();
                let data_uri = uri.clone();
                tokio::spawn(async move {
                    let result = api.time_series(&data_uri).await.map_err(|e| e.to_string());
                    let _ = tx_data.send(FetchOutcome::Series { uri: data_uri, result }).await;
                });

                // Typedocs are looked up by the parsed URI parts; unparseable URIs just have none.
                if let Some(parsed) = self.extractor.parse(uri) {
                    let api = self.api.clone();
                    let tx_doc = tx.clone();
                    tokio::spawn(async move {
                        let result = api.node_typedoc(&parsed).await.map_err(|e| e.to_string());
                        let _ = tx_doc.send(FetchOutcome::Typedoc { uri: parsed.raw, result }).await;
                    });
                }
            }
            drop(tx);

            // Channel closes once every task of the group has finished (or panicked).
            while let Some(outcome) = rx.recv().await {
                record(&mut fetched, outcome);
            }
        }

        fetched
    }
}

fn record(fetched: &mut FetchedData, outcome: FetchOutcome) {
    match outcome {
        FetchOutcome::Series { uri, result: Ok(data) } => {
            let points = data.as_array().map(Vec::len).unwrap_or(1);
            info!("  ✅ {} ({} pts)", short_name(&uri), points);
            fetched.series.insert(uri, data);
        }
        FetchOutcome::Typedoc { uri, result: Ok(Some(doc)) } => {
            info!("  📄 {} typedoc OK", short_name(&uri));
            fetched.typedocs.insert(uri, doc);
        }
        FetchOutcome::Typedoc { result: Ok(None), .. } => {}
        FetchOutcome::Series { uri, result: Err(error) } => fail(fetched, uri, FetchKind::Series, error),
        FetchOutcome::Typedoc { uri, result: Err(error) } => fail(fetched, uri, FetchKind::Typedoc, error),
    }
}

fn fail(fetched: &mut FetchedData, uri: String, kind: FetchKind, error: String) {
    warn!("  ❌ {} {}: {}", short_name(&uri), kind, error);
    fetched.failures.push(FetchFailure { uri, kind, error });
}

/// Last two path segments, e.g. `node/output?last=30`.
pub fn short_name(uri: &str) -> String {
    let mut parts: Vec<&str> = uri.rsplit('/').take(2).collect();
    parts.reverse();
    parts.join("/")
}
