use crate::client::CreatedSession;
use crate::error::DashboardError;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

static WIDGET_BUILDING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<WIDGET_BUILDING>(.*?)</WIDGET_BUILDING>").unwrap());

/// One widget build step reported while the dashboard is being created.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WidgetTask {
    pub task_name: String,
    #[serde(default)]
    pub status: String,
}

impl WidgetTask {
    pub fn icon(&self) -> &'static str {
        match self.status.as_str() {
            "completed" => "✅",
            "in_progress" => "🔄",
            _ => "⏳",
        }
    }
}

/// Splits a byte stream into `\n`-terminated lines, across chunk boundaries.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
}

impl LineDecoder {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line[..line.len() - 1]).into_owned());
        }
        lines
    }

    /// Trailing data without a final newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Parse the task list embedded in a `WIDGET_BUILDING` progress message.
pub fn widget_progress(msg: &str) -> Option<Vec<WidgetTask>> {
    let caps = WIDGET_BUILDING.captures(msg)?;
    serde_json::from_str(&caps[1]).ok()
}

/// Accumulates session identity from stream events; last value seen wins.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionTracker {
    pub session_id: Option<String>,
    pub session_name: Option<String>,
}

impl SessionTracker {
    /// Feed one line. Returns widget progress when the event carried some.
    /// Blank or non-JSON lines are ignored.
    pub fn observe(&mut self, line: &str) -> Option<Vec<WidgetTask>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let event: Value = serde_json::from_str(line).ok()?;

        if let Some(id) = non_empty(event.get("session_id")) {
            self.session_id = Some(id);
        }
        if let Some(name) = non_empty(event.get("session_name")) {
            self.session_name = Some(name);
        }

        event
            .get("msg")
            .and_then(Value::as_str)
            .filter(|m| m.contains("WIDGET_BUILDING"))
            .and_then(widget_progress)
    }

    pub fn finish(self) -> Result<CreatedSession, DashboardError> {
        let session_id = self.session_id.ok_or(DashboardError::MissingSession)?;
        Ok(CreatedSession { session_id, session_name: self.session_name })
    }
}

fn non_empty(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
