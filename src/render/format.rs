use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde_json::Value;

/// Values above this are treated as epoch milliseconds, below as seconds.
const MILLIS_THRESHOLD: f64 = 1e11;

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// JSON safe to embed inside a `<script>` element.
pub fn script_json(value: &Value) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

pub fn epoch_to_datetime(epoch: f64, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let millis = if epoch.abs() >= MILLIS_THRESHOLD { epoch } else { epoch * 1000.0 };
    Utc.timestamp_millis_opt(millis as i64).single().map(|dt| dt.with_timezone(offset))
}

/// Epoch seconds/milliseconds or date strings as `YYYY-MM-DD`; anything else verbatim.
pub fn format_date(value: &Value, offset: &FixedOffset) -> String {
    match value {
        Value::Number(n) => n
            .as_f64()
            .and_then(|e| epoch_to_datetime(e, offset))
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| n.to_string()),
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(offset).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|_| s.clone()),
        other => format_plain(other),
    }
}

/// Widget creation time as `MM/DD/YYYY, HH:MM`.
pub fn format_timestamp(value: Option<&Value>, offset: &FixedOffset) -> String {
    let parsed = match value {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(offset)),
        Some(Value::Number(n)) => n.as_f64().and_then(|e| epoch_to_datetime(e, offset)),
        _ => None,
    };
    match (parsed, value) {
        (Some(dt), _) => dt.format("%m/%d/%Y, %H:%M").to_string(),
        (None, Some(Value::String(s))) => s.clone(),
        _ => String::new(),
    }
}

/// Thousands separators, at most two decimals.
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return n.to_string();
    }
    let rounded = format!("{:.2}", n.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let frac = frac_part.trim_end_matches('0');
    let sign = if n < 0.0 && (int_part != "0" || !frac.is_empty()) { "-" } else { "" };
    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

/// Human-readable cell text (not escaped).
pub fn format_plain(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push('…');
    out
}
