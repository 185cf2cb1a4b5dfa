use crate::model::WidgetSpec;
use crate::typedoc::FieldDef;
use crate::typedoc::roles::infer_field_roles;
use serde_json::Value;

/// Grid columns in a row.
pub const GRID_COLUMNS: u8 = 12;

/// Records at or below this count may be shown as KPI tiles.
const KPI_MAX_RECORDS: usize = 5;

const CONTENT_NAMES: &[&str] = &["content", "text", "full_text", "body"];
const AUTHOR_NAMES: &[&str] = &["author", "user", "username", "user_name", "screen_name", "handle", "source", "publisher"];
const SOCIAL_STAT_HINTS: &[&str] = &["like", "retweet", "repost", "comment", "repl", "favorite"];
const TITLE_NAMES: &[&str] = &["title", "headline"];
const URL_NAMES: &[&str] = &["url", "link", "href"];

/// Which renderer handles a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    Chart,
    NewsFeed,
    SocialFeed,
    Text,
    KpiGrid,
    Table,
}

/// Presentation chosen for a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    /// Server-built chart options.
    Chart,
    /// Line chart generated from time-indexed records.
    AutoLineChart,
    NewsFeed,
    SocialFeed,
    Text,
    KpiGrid,
    Table,
}

impl Presentation {
    pub fn renderer(&self) -> RendererKind {
        match self {
            Presentation::Chart | Presentation::AutoLineChart => RendererKind::Chart,
            Presentation::NewsFeed => RendererKind::NewsFeed,
            Presentation::SocialFeed => RendererKind::SocialFeed,
            Presentation::Text => RendererKind::Text,
            Presentation::KpiGrid => RendererKind::KpiGrid,
            Presentation::Table => RendererKind::Table,
        }
    }

    fn is_full_row(&self) -> bool {
        matches!(self, Presentation::NewsFeed | Presentation::SocialFeed | Presentation::Text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub presentation: Presentation,
    pub span: u8,
}

/// Feeds and text take the whole row; everything else splits it by widget count.
pub fn span_for(presentation: Presentation, widget_count: usize) -> u8 {
    if presentation.is_full_row() {
        return GRID_COLUMNS;
    }
    match widget_count {
        1 => GRID_COLUMNS,
        2 => GRID_COLUMNS / 2,
        3 => GRID_COLUMNS / 3,
        _ => GRID_COLUMNS / 2,
    }
}

/// Pick a presentation from the declared kind, or from the resolved data shape.
/// `None` means no heuristic applies and the widget should be dropped.
pub fn classify(spec: &WidgetSpec, data: &Value, fields: &[FieldDef], widget_count: usize) -> Option<Classification> {
    let presentation = match spec {
        WidgetSpec::Chart { .. } => Presentation::Chart,
        WidgetSpec::News { .. } => Presentation::NewsFeed,
        WidgetSpec::Social { .. } => Presentation::SocialFeed,
        WidgetSpec::Text { .. } => Presentation::Text,
        WidgetSpec::Auto { props, .. } => infer_presentation(props, data, fields)?,
    };
    Some(Classification { presentation, span: span_for(presentation, widget_count) })
}

/// Ordered checks; the first match wins.
pub fn infer_presentation(props: &Value, data: &Value, fields: &[FieldDef]) -> Option<Presentation> {
    if data.is_string() {
        return Some(Presentation::Text);
    }

    let records = match data {
        Value::Array(items) if !items.is_empty() => items,
        Value::Null | Value::Array(_) => {
            let prebuilt = props.get("series").is_some() || props.get("xAxis").is_some();
            return prebuilt.then_some(Presentation::Chart);
        }
        _ => return None,
    };

    let has = |names: &[&str]| fields.iter().any(|f| name_matches(&f.name, names));
    let has_content = has(CONTENT_NAMES);
    let has_author = has(AUTHOR_NAMES);

    if has_content && has_author {
        let social = fields.iter().any(|f| {
            let lower = f.name.to_ascii_lowercase();
            SOCIAL_STAT_HINTS.iter().any(|hint| lower.contains(hint))
        });
        return Some(if social { Presentation::SocialFeed } else { Presentation::NewsFeed });
    }
    if has(TITLE_NAMES) && has(URL_NAMES) {
        return Some(Presentation::NewsFeed);
    }

    let roles = infer_field_roles(fields);
    if records.len() <= KPI_MAX_RECORDS && roles.value_fields.len() >= 2 {
        return Some(Presentation::KpiGrid);
    }
    if roles.time_field.is_some() && !roles.value_fields.is_empty() && records.len() > KPI_MAX_RECORDS {
        return Some(Presentation::AutoLineChart);
    }
    if fields.len() >= 3 && records.len() > 1 {
        return Some(Presentation::Table);
    }
    Some(Presentation::Text)
}

/// Exact name, or the keyword as a `_`-separated prefix/suffix (`author_name`, `tweet_text`).
pub fn name_matches(name: &str, keywords: &[&str]) -> bool {
    let lower = name.to_ascii_lowercase();
    keywords.iter().any(|kw| {
        lower == *kw || lower.starts_with(&format!("{}_", kw)) || lower.ends_with(&format!("_{}", kw))
    })
}
