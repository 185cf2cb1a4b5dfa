use crate::render::classify::RendererKind;
use crate::render::format::{escape_html, format_number};
use crate::render::{RenderContext, RenderResult, WidgetRenderer, card, empty_body};
use serde_json::Value;

/// One tile per non-time numeric field: latest value plus change vs. the previous record.
#[derive(Debug)]
pub struct KpiGridRenderer;

/// Records ordered oldest to newest (by the time field when there is one).
fn ordered<'a>(ctx: &RenderContext<'a>) -> Vec<&'a Value> {
    let mut rows: Vec<&Value> = ctx.data.as_array().into_iter().flatten().filter(|r| r.is_object()).collect();
    if let Some(time) = ctx.roles.time_field.as_ref() {
        rows.sort_by(|a, b| {
            let ta = a.get(&time.name).and_then(Value::as_f64).unwrap_or(f64::MIN);
            let tb = b.get(&time.name).and_then(Value::as_f64).unwrap_or(f64::MIN);
            ta.total_cmp(&tb)
        });
    }
    rows
}

fn delta_html(latest: f64, previous: Option<f64>) -> String {
    match previous {
        Some(prev) if prev != 0.0 => {
            let pct = (latest - prev) / prev.abs() * 100.0;
            let class = if pct >= 0.0 { "up" } else { "down" };
            let sign = if pct >= 0.0 { "+" } else { "" };
            format!(r#"<div class="kpi-delta {}">{}{}%</div>"#, class, sign, format_number(pct))
        }
        _ => String::new(),
    }
}

impl WidgetRenderer for KpiGridRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::KpiGrid
    }

    fn render(&self, ctx: &RenderContext) -> RenderResult {
        let rows = ordered(ctx);
        let latest = rows.last();
        let previous = rows.len().checked_sub(2).and_then(|i| rows.get(i));

        let items: Vec<String> = match latest {
            None => Vec::new(),
            Some(latest) => ctx
                .roles
                .value_fields
                .iter()
                .map(|field| {
                    let value = latest.get(&field.name).and_then(Value::as_f64);
                    let prev = previous.and_then(|p| p.get(&field.name)).and_then(Value::as_f64);
                    let shown = value.map(format_number).unwrap_or_else(|| "–".to_string());
                    let title = ctx.field_desc(&field.name).unwrap_or(&field.name);
                    format!(
                        r#"<div class="kpi-item"><div class="kpi-label" title="{}">{}</div><div class="kpi-value">{}</div>{}</div>"#,
                        escape_html(title),
                        escape_html(&field.name),
                        shown,
                        value.map(|v| delta_html(v, prev)).unwrap_or_default()
                    )
                })
                .collect(),
        };

        let body = if items.is_empty() {
            empty_body()
        } else {
            format!(r#"<div class="widget-body kpi-grid">{}</div>"#, items.join("\n"))
        };
        RenderResult { html: card(ctx, "kpi-card", &body), script: None, span: ctx.span }
    }
}
