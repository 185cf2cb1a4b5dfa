use crate::render::classify::RendererKind;
use crate::render::format::{escape_html, format_date, format_plain};
use crate::render::{RenderContext, RenderResult, WidgetRenderer, card, empty_body};
use serde_json::Value;

const MAX_ROWS: usize = 200;

#[derive(Debug)]
pub struct TableRenderer;

impl WidgetRenderer for TableRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Table
    }

    fn render(&self, ctx: &RenderContext) -> RenderResult {
        let rows: Vec<&Value> = ctx.records().iter().filter(|r| r.is_object()).take(MAX_ROWS).collect();
        if rows.is_empty() || ctx.fields.is_empty() {
            return RenderResult { html: card(ctx, "table-card", &empty_body()), script: None, span: ctx.span };
        }

        let time_name = ctx.roles.time_field.as_ref().map(|f| f.name.as_str());
        let header: String = ctx
            .fields
            .iter()
            .map(|f| {
                let title = if f.desc.is_empty() { &f.name } else { &f.desc };
                format!(r#"<th title="{}">{}</th>"#, escape_html(title), escape_html(&f.name))
            })
            .collect();

        let body_rows: Vec<String> = rows
            .iter()
            .map(|row| {
                let cells: String = ctx
                    .fields
                    .iter()
                    .map(|f| {
                        let value = row.get(&f.name).cloned().unwrap_or(Value::Null);
                        let text = if Some(f.name.as_str()) == time_name {
                            format_date(&value, &ctx.offset)
                        } else {
                            format_plain(&value)
                        };
                        let class = if value.is_number() { " class=\"num\"" } else { "" };
                        format!("<td{}>{}</td>", class, escape_html(&text))
                    })
                    .collect();
                format!("<tr>{}</tr>", cells)
            })
            .collect();

        let body = format!(
            r#"<div class="widget-body table-wrap"><table class="data-table"><thead><tr>{}</tr></thead><tbody>{}</tbody></table></div>"#,
            header,
            body_rows.join("\n")
        );
        RenderResult { html: card(ctx, "table-card", &body), script: None, span: ctx.span }
    }
}
