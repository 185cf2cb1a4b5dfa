pub mod chart;
pub mod classify;
pub mod dashboard;
pub mod document;
pub mod feed;
pub mod format;
pub mod kpi;
pub mod table;
pub mod text;

use crate::model::Widget;
use crate::render::classify::{Presentation, RendererKind};
use crate::render::format::escape_html;
use crate::typedoc::FieldDef;
use crate::typedoc::roles::FieldRoles;
use chrono::FixedOffset;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;

/// Output of one renderer: markup, optional init script, grid span (of 12).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderResult {
    pub html: String,
    pub script: Option<String>,
    pub span: u8,
}

/// Typedoc attached to a widget, exposed on the card as `data-typedoc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetDoc {
    pub node: String,
    pub output: String,
    pub typedoc: String,
}

/// Everything a renderer may look at. Renderers are pure over this.
#[derive(Debug)]
pub struct RenderContext<'a> {
    /// Position in the dashboard; also the source of unique DOM ids.
    pub index: usize,
    pub widget: &'a Widget,
    pub presentation: Presentation,
    pub span: u8,
    /// Chart options after data substitution and house styling.
    pub props: &'a Value,
    /// Widget-level records (or text) after resolution.
    pub data: &'a Value,
    pub fields: &'a [FieldDef],
    pub roles: &'a FieldRoles,
    pub docs: &'a [WidgetDoc],
    pub offset: FixedOffset,
    pub timestamp: String,
}

impl<'a> RenderContext<'a> {
    pub fn records(&self) -> &'a [Value] {
        self.data.as_array().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn chart_id(&self) -> String {
        format!("chart_{}", self.index)
    }

    pub fn field_desc(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.desc.as_str())
            .filter(|d| !d.is_empty())
    }
}

/// 渲染器接口：每种展示形式一个实现
pub trait WidgetRenderer: Send + Sync {
    fn kind(&self) -> RendererKind;
    fn render(&self, ctx: &RenderContext) -> RenderResult;
}

/// Renderers by kind.
pub struct RendererSet {
    renderers: HashMap<RendererKind, Box<dyn WidgetRenderer>>,
}

impl RendererSet {
    pub fn new() -> Self {
        Self { renderers: HashMap::new() }
    }

    pub fn standard() -> Self {
        let mut set = Self::new();
        set.register(Box::new(chart::ChartRenderer));
        set.register(Box::new(feed::NewsFeedRenderer));
        set.register(Box::new(feed::SocialFeedRenderer));
        set.register(Box::new(text::TextRenderer));
        set.register(Box::new(kpi::KpiGridRenderer));
        set.register(Box::new(table::TableRenderer));
        set
    }

    pub fn register(&mut self, renderer: Box<dyn WidgetRenderer>) {
        self.renderers.insert(renderer.kind(), renderer);
    }

    pub fn get(&self, kind: RendererKind) -> Option<&dyn WidgetRenderer> {
        self.renderers.get(&kind).map(|r| r.as_ref())
    }
}

impl Default for RendererSet {
    fn default() -> Self {
        Self::standard()
    }
}

/// Card chrome shared by all renderers.
pub(crate) fn card(ctx: &RenderContext, class: &str, body: &str) -> String {
    let typedoc_attr = if ctx.docs.is_empty() {
        String::new()
    } else {
        let json = serde_json::to_string(ctx.docs).unwrap_or_default();
        format!(" data-typedoc=\"{}\"", escape_html(&json))
    };
    format!(
        r#"
    <div class="widget-card {class}" style="grid-column: span {span};"{typedoc_attr}>
      <div class="widget-title">
        <span class="widget-title-text">{title}</span>
        <span class="widget-timestamp">{timestamp}</span>
      </div>
      {body}
    </div>"#,
        class = class,
        span = ctx.span,
        typedoc_attr = typedoc_attr,
        title = escape_html(&ctx.widget.name),
        timestamp = escape_html(&ctx.timestamp),
        body = body,
    )
}

/// Placeholder body for widgets whose data came back empty.
pub(crate) fn empty_body() -> String {
    r#"<div class="widget-body widget-empty">No data</div>"#.to_string()
}
