use anyhow::Result;
use regex::Regex;
use std::collections::HashSet;
use std::fmt;

/// One remote time-series stream: `<scheme>://time_series/<source>/<node>/<output>[?query]`.
/// `raw` (query included) is the join key between widget props and fetched data.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataUri {
    pub source_id: String,
    pub node_name: String,
    pub output_name: String,
    pub raw: String,
}

impl DataUri {
    /// `node/output`, used in progress logs.
    pub fn short(&self) -> String {
        format!("{}/{}", self.node_name, self.output_name)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Finds and parses data references for one URI scheme.
#[derive(Debug, Clone)]
pub struct UriExtractor {
    prefix: String,
    pattern: Regex,
    parts: Regex,
}

impl UriExtractor {
    pub fn new(scheme: &str) -> Result<Self> {
        let escaped = regex::escape(scheme);
        Ok(Self {
            prefix: format!("{}://", scheme),
            pattern: Regex::new(&format!(r#"{}://time_series/[^"'\s\\]+"#, escaped))?,
            parts: Regex::new(&format!(r"^{}://time_series/(\d+)/([^/?]+)/([^/?]+)", escaped))?,
        })
    }

    /// Unique URIs in first-seen order. No matches yields an empty list.
    pub fn extract(&self, chart_data: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.pattern
            .find_iter(chart_data)
            .map(|m| m.as_str().to_string())
            .filter(|uri| seen.insert(uri.clone()))
            .collect()
    }

    pub fn parse(&self, uri: &str) -> Option<DataUri> {
        let caps = self.parts.captures(uri)?;
        Some(DataUri {
            source_id: caps[1].to_string(),
            node_name: caps[2].to_string(),
            output_name: caps[3].to_string(),
            raw: uri.to_string(),
        })
    }

    /// True for any string under this scheme, parseable or not.
    pub fn is_reference(&self, s: &str) -> bool {
        s.starts_with(&self.prefix)
    }
}
