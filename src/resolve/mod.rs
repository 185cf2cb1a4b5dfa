pub mod style;
pub mod transform;

use crate::model::{DataSource, is_single_reference};
use crate::model::uri::UriExtractor;
use crate::resolve::transform::TransformRegistry;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Fetched payloads keyed by raw data URI.
pub type SeriesMap = HashMap<String, Value>;

const RESOLVER_KEY: &str = "dataResolver";

/// Substitutes fetched series into chart options.
/// Inputs are never mutated; each call works on a deep copy.
#[derive(Debug, Clone)]
pub struct DataResolver {
    extractor: Arc<UriExtractor>,
    transforms: Arc<TransformRegistry>,
}

impl DataResolver {
    pub fn new(extractor: Arc<UriExtractor>, transforms: Arc<TransformRegistry>) -> Self {
        Self { extractor, transforms }
    }

    /// Resolve `xAxis`, `yAxis` and `series` placeholders (`["<uri>"]`).
    /// A placeholder becomes the transformed payload when both the payload and a
    /// transform exist, and an empty array otherwise.
    pub fn resolve_props(&self, props: &Value, series: &SeriesMap) -> Value {
        let mut resolved = props.clone();
        let Some(obj) = resolved.as_object_mut() else {
            return resolved;
        };
        for key in ["xAxis", "yAxis", "series"] {
            if let Some(entries) = obj.get_mut(key) {
                match entries {
                    Value::Array(items) => {
                        for item in items.iter_mut().filter_map(Value::as_object_mut) {
                            self.resolve_entry(item, series);
                        }
                    }
                    Value::Object(item) => self.resolve_entry(item, series),
                    _ => {}
                }
            }
        }
        resolved
    }

    fn resolve_entry(&self, entry: &mut Map<String, Value>, series: &SeriesMap) {
        let resolver = entry.remove(RESOLVER_KEY);
        let uri = match entry.get("data") {
            Some(Value::Array(items)) if is_single_reference(items, &self.extractor) => {
                items[0].as_str().unwrap_or_default().to_string()
            }
            _ => return,
        };

        let data = match (series.get(&uri), resolver.as_ref().and_then(Value::as_str)) {
            (Some(payload), Some(annotation)) => self.apply(annotation, payload, &uri),
            _ => Value::Array(Vec::new()),
        };
        entry.insert("data".to_string(), data);
    }

    /// Records behind a widget-level data source. Missing payloads read as "no data".
    pub fn resolve_source(&self, source: &DataSource, series: &SeriesMap) -> Value {
        match source {
            DataSource::Uri { uri, resolver } => match (series.get(uri), resolver) {
                (Some(payload), Some(annotation)) => self.apply(annotation, payload, uri),
                (Some(payload), None) => payload.clone(),
                (None, _) => Value::Array(Vec::new()),
            },
            DataSource::Inline(value) => value.clone(),
            DataSource::Absent => Value::Null,
        }
    }

    fn apply(&self, annotation: &str, payload: &Value, uri: &str) -> Value {
        match self.transforms.compile(annotation).and_then(|t| t.apply(payload)) {
            Ok(value) => value,
            Err(e) => {
                warn!(uri = %uri, error = %e, "Data resolver failed, using empty series");
                Value::Array(Vec::new())
            }
        }
    }
}
