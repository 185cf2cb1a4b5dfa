use crate::render::classify::RendererKind;
use crate::render::format::escape_html;
use crate::render::{RenderContext, RenderResult, WidgetRenderer, card, empty_body};
use serde_json::Value;

/// Free-form text; anything that isn't a string is dumped as formatted JSON.
#[derive(Debug)]
pub struct TextRenderer;

fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
        .collect::<Vec<_>>()
        .join("\n")
}

impl WidgetRenderer for TextRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Text
    }

    fn render(&self, ctx: &RenderContext) -> RenderResult {
        let inline = ["content", "text", "markdown"]
            .iter()
            .find_map(|k| ctx.props.get(*k).and_then(Value::as_str));

        let body = match (ctx.data, inline) {
            (Value::String(s), _) if !s.trim().is_empty() => {
                format!(r#"<div class="widget-body text-body">{}</div>"#, paragraphs(s))
            }
            (Value::Null, Some(s)) | (Value::String(_), Some(s)) => {
                format!(r#"<div class="widget-body text-body">{}</div>"#, paragraphs(s))
            }
            (Value::Null, None) | (Value::String(_), None) => empty_body(),
            (Value::Array(items), _) if items.is_empty() => empty_body(),
            (other, _) => {
                let dump = serde_json::to_string_pretty(other).unwrap_or_default();
                format!(r#"<div class="widget-body text-body"><pre>{}</pre></div>"#, escape_html(&dump))
            }
        };

        RenderResult { html: card(ctx, "text-card", &body), script: None, span: ctx.span }
    }
}
