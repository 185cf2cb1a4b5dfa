use crate::render::classify::{Presentation, RendererKind};
use crate::render::format::{format_date, script_json};
use crate::render::{RenderContext, RenderResult, WidgetRenderer, card};
use crate::resolve::style::apply_house_style;
use crate::typedoc::FieldDef;
use crate::typedoc::roles::FieldRoles;
use chrono::FixedOffset;
use serde_json::{Map, Value, json};

const TOOLTIP_FORMATTER: &str = r#"
      opts.tooltip = opts.tooltip || {};
      opts.tooltip.formatter = function(params) {
        if (!Array.isArray(params)) params = [params];
        let header = params[0]?.axisValueLabel || params[0]?.name || '';
        let html = '<div style="font-weight:500;margin-bottom:6px;font-size:12px">' + header + '</div>';
        for (const p of params) {
          const desc = _descMap[p.seriesName] || '';
          const label = desc ? '<span style="color:rgba(0,0,0,0.5);font-size:10px"> ' + desc + '</span>' : '';
          const val = typeof p.value === 'number' ? p.value.toLocaleString() :
                      Array.isArray(p.value) ? (p.value[1] ?? p.value).toLocaleString() : p.value;
          html += '<div style="display:flex;align-items:center;gap:6px;margin:3px 0">'
            + (p.marker || '') + '<span style="font-size:12px">' + p.seriesName + ': <b>' + val + '</b></span>'
            + label + '</div>';
        }
        return html;
      };"#;

fn normalize(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_lowercase()
}

/// Description for one series name. Tiers, first hit wins:
/// exact field name, normalized name, series name inside a field description,
/// normalized field name inside the normalized series name (numeric fields only).
pub fn describe_series<'a>(series_name: &str, fields: &'a [FieldDef]) -> Option<&'a str> {
    let documented: Vec<&FieldDef> = fields.iter().filter(|f| !f.desc.is_empty()).collect();
    let wanted = normalize(series_name);
    let lower = series_name.to_lowercase();

    documented
        .iter()
        .find(|f| f.name == series_name)
        .or_else(|| documented.iter().find(|f| normalize(&f.name) == wanted))
        .or_else(|| documented.iter().find(|f| f.desc.to_lowercase().contains(&lower)))
        .or_else(|| {
            documented.iter().find(|f| {
                let name = normalize(&f.name);
                f.is_number() && !name.is_empty() && wanted.contains(&name)
            })
        })
        .copied()
        .map(|f| f.desc.as_str())
}

/// Series name -> field description, in series order; unmatched series are left out.
pub fn series_descriptions(props: &Value, fields: &[FieldDef]) -> Map<String, Value> {
    let mut out = Map::new();
    let series: Vec<&Value> = match props.get("series") {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(item @ Value::Object(_)) => vec![item],
        _ => Vec::new(),
    };
    for s in series {
        let Some(name) = s.get("name").and_then(Value::as_str).filter(|n| !n.is_empty()) else {
            continue;
        };
        if out.contains_key(name) {
            continue;
        }
        if let Some(desc) = describe_series(name, fields) {
            out.insert(name.to_string(), json!(desc));
        }
    }
    out
}

/// Line chart options generated from time-indexed records, oldest first.
pub fn auto_line_chart(records: &[Value], roles: &FieldRoles, offset: &FixedOffset) -> Value {
    let Some(time_field) = roles.time_field.as_ref() else {
        return json!({});
    };
    let time_key = time_field.name.as_str();

    let mut rows: Vec<&Value> = records.iter().filter(|r| r.is_object()).collect();
    rows.sort_by(|a, b| {
        let ta = a.get(time_key).and_then(Value::as_f64).unwrap_or(f64::MIN);
        let tb = b.get(time_key).and_then(Value::as_f64).unwrap_or(f64::MIN);
        ta.total_cmp(&tb)
    });

    let categories: Vec<Value> = rows
        .iter()
        .map(|r| json!(format_date(&r.get(time_key).cloned().unwrap_or(Value::Null), offset)))
        .collect();
    let series: Vec<Value> = roles
        .value_fields
        .iter()
        .map(|f| {
            let data: Vec<Value> = rows.iter().map(|r| r.get(&f.name).cloned().unwrap_or(Value::Null)).collect();
            json!({ "name": f.name, "type": "line", "data": data })
        })
        .collect();
    let names: Vec<&str> = roles.value_fields.iter().map(|f| f.name.as_str()).collect();

    let mut props = json!({
        "legend": { "data": names, "top": 0, "left": 0, "icon": "circle", "itemWidth": 8, "itemHeight": 8 },
        "xAxis": { "type": "category", "boundaryGap": false, "data": categories },
        "yAxis": { "type": "value", "scale": true },
        "series": series
    });
    apply_house_style(&mut props);
    props
}

#[derive(Debug)]
pub struct ChartRenderer;

impl WidgetRenderer for ChartRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Chart
    }

    fn render(&self, ctx: &RenderContext) -> RenderResult {
        let props = if ctx.presentation == Presentation::AutoLineChart {
            auto_line_chart(ctx.records(), ctx.roles, &ctx.offset)
        } else {
            ctx.props.clone()
        };
        let desc_map = series_descriptions(&props, ctx.fields);
        let chart_id = ctx.chart_id();

        let body = format!(
            r#"<div class="widget-body chart-dotted-background">
        <div class="chart-body">
          <div id="{id}" style="width:100%;height:340px;"></div>
          <div class="alva-watermark">Alva</div>
        </div>
      </div>"#,
            id = chart_id
        );

        let (desc_decl, formatter) = if desc_map.is_empty() {
            (String::new(), "")
        } else {
            (format!("const _descMap = {};", script_json(&Value::Object(desc_map))), TOOLTIP_FORMATTER)
        };
        let script = format!(
            r#"
    {{
      const chart = echarts.init(document.getElementById('{id}'));
      {desc_decl}
      const opts = {opts};{formatter}
      chart.setOption(opts);
      window.addEventListener('resize', () => chart.resize());
    }}"#,
            id = chart_id,
            desc_decl = desc_decl,
            opts = script_json(&props),
            formatter = formatter,
        );

        RenderResult { html: card(ctx, "chart-card", &body), script: Some(script), span: ctx.span }
    }
}
