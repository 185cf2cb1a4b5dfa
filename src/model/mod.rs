pub mod uri;

use crate::error::DashboardError;
use crate::model::uri::UriExtractor;
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// Dashboard configuration as returned by `GetDashboardConfig` (after the second decode).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DashboardConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: Vec<Widget>,
}

impl DashboardConfig {
    pub fn title(&self) -> &str {
        self.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("Alva Dashboard")
    }
}

/// Widget entry of a dashboard. `chart_data` is itself JSON-encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Widget {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "chartData", default)]
    pub chart_data: Option<String>,
    /// ISO string or epoch milliseconds, depending on the backend version.
    #[serde(default)]
    pub create_time: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    widgets: Vec<RawDescriptor>,
}

#[derive(Debug, Deserialize)]
struct RawDescriptor {
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    props: Value,
    #[serde(default)]
    data: Option<Value>,
    #[serde(rename = "dataResolver", default)]
    data_resolver: Option<String>,
}

/// Where a widget's records come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// Remote series, optionally reshaped by a service-supplied transform.
    Uri { uri: String, resolver: Option<String> },
    Inline(Value),
    Absent,
}

impl DataSource {
    fn from_value(value: Option<Value>, resolver: Option<String>, extractor: &UriExtractor) -> Self {
        match value {
            None | Some(Value::Null) => DataSource::Absent,
            Some(Value::String(s)) if extractor.is_reference(&s) => DataSource::Uri { uri: s, resolver },
            Some(Value::Array(items)) if is_single_reference(&items, extractor) => {
                let uri = items[0].as_str().unwrap_or_default().to_string();
                DataSource::Uri { uri, resolver }
            }
            Some(other) => DataSource::Inline(other),
        }
    }
}

/// `["<scheme>://..."]`, the placeholder shape used across props.
pub fn is_single_reference(items: &[Value], extractor: &UriExtractor) -> bool {
    items.len() == 1 && items[0].as_str().is_some_and(|s| extractor.is_reference(s))
}

static NO_DATA: DataSource = DataSource::Absent;

/// Widget descriptor lowered into one variant per declared kind.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetSpec {
    Chart { props: Value },
    News { props: Value, data: DataSource },
    Social { props: Value, data: DataSource },
    Text { props: Value, data: DataSource },
    /// No (or an unknown) kind: presentation is inferred from the data shape.
    Auto { props: Value, data: DataSource },
}

impl WidgetSpec {
    /// Decode a widget's `chartData`. `Ok(None)` when it holds no descriptor.
    pub fn from_chart_data(chart_data: &str, extractor: &UriExtractor) -> Result<Option<Self>, DashboardError> {
        let parsed: ChartData = serde_json::from_str(chart_data)
            .map_err(|e| DashboardError::malformed("chartData", e))?;

        let Some(raw) = parsed.widgets.into_iter().next() else {
            return Ok(None);
        };

        let props = match raw.props {
            Value::Object(_) => raw.props,
            _ => Value::Object(Default::default()),
        };
        let data_value = raw.data.or_else(|| props.get("data").cloned());
        let data = DataSource::from_value(data_value, raw.data_resolver, extractor);

        let spec = match raw.kind.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("chart") | Some("echarts") => WidgetSpec::Chart { props },
            Some("news") | Some("feed") => WidgetSpec::News { props, data },
            Some("twitter") | Some("social") | Some("tweets") => WidgetSpec::Social { props, data },
            Some("text") | Some("markdown") => WidgetSpec::Text { props, data },
            _ => WidgetSpec::Auto { props, data },
        };
        Ok(Some(spec))
    }

    pub fn props(&self) -> &Value {
        match self {
            WidgetSpec::Chart { props }
            | WidgetSpec::News { props, .. }
            | WidgetSpec::Social { props, .. }
            | WidgetSpec::Text { props, .. }
            | WidgetSpec::Auto { props, .. } => props,
        }
    }

    pub fn data(&self) -> &DataSource {
        match self {
            WidgetSpec::Chart { .. } => &NO_DATA,
            WidgetSpec::News { data, .. }
            | WidgetSpec::Social { data, .. }
            | WidgetSpec::Text { data, .. }
            | WidgetSpec::Auto { data, .. } => data,
        }
    }
}
