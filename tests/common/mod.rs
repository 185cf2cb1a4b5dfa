#![allow(dead_code)]

use alva_dashboard::client::{AlvaApi, CreatedSession};
use alva_dashboard::model::DashboardConfig;
use alva_dashboard::model::uri::DataUri;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory Alva service that records how it was called.
#[derive(Default)]
pub struct FakeApi {
    pub dashboard: DashboardConfig,
    pub series: HashMap<String, Value>,
    pub typedocs: HashMap<String, String>,
    pub failing: HashSet<String>,
    pub new_session: Option<String>,
    pub delay: Duration,
    pub slow_series: HashMap<String, Duration>,
    pub slow_typedocs: HashMap<String, Duration>,

    pub create_calls: AtomicUsize,
    pub series_calls: AtomicUsize,
    pub typedoc_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub messages: Mutex<Vec<String>>,
    /// "start series <uri>", "end typedoc <uri>", ... in the order they happened.
    pub events: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn record(&self, event: &str, kind: &str, uri: &str) {
        self.events.lock().unwrap().push(format!("{} {} {}", event, kind, uri));
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlvaApi for FakeApi {
    async fn create_dashboard(&self, message: &str, _timeout: Duration) -> Result<CreatedSession> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().push(message.to_string());
        let session_id = self.new_session.clone().ok_or_else(|| anyhow!("stream ended early"))?;
        Ok(CreatedSession { session_id, session_name: Some("Fake".to_string()) })
    }

    async fn dashboard_config(&self, _session_id: &str) -> Result<DashboardConfig> {
        Ok(self.dashboard.clone())
    }

    async fn time_series(&self, uri: &str) -> Result<Value> {
        self.series_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.record("start", "series", uri);
        let delay = self.slow_series.get(uri).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.record("end", "series", uri);

        if self.failing.contains(uri) {
            return Err(anyhow!("HTTP 502"));
        }
        self.series.get(uri).cloned().ok_or_else(|| anyhow!("no series for {}", uri))
    }

    async fn node_typedoc(&self, uri: &DataUri) -> Result<Option<String>> {
        self.typedoc_calls.fetch_add(1, Ordering::SeqCst);
        self.record("start", "typedoc", &uri.raw);
        if let Some(delay) = self.slow_typedocs.get(&uri.raw) {
            tokio::time::sleep(*delay).await;
        }
        self.record("end", "typedoc", &uri.raw);
        Ok(self.typedocs.get(&uri.raw).cloned())
    }
}
