use crate::render::RenderResult;
use crate::render::format::escape_html;

const STYLE_SHEET: &str = r#"
:root {
  --text-n10: rgb(0,0,0);
  --text-n9: rgba(0,0,0,0.9);
  --text-n7: rgba(0,0,0,0.7);
  --text-n5: rgba(0,0,0,0.5);
  --text-n3: rgba(0,0,0,0.3);
  --main-m1: #49A3A6;
  --main-m3: #2a9b7d;
  --main-m4: #e05357;
  --main-m5: #E6A91A;
  --b0-page: #ffffff;
  --grey-g01: #fafafa;
  --line-l07: rgba(0,0,0,0.07);
  --line-l05: rgba(0,0,0,0.05);
  --spacing-xs: 8px;
  --spacing-s: 12px;
  --spacing-m: 16px;
  --spacing-l: 20px;
  --spacing-xl: 24px;
  --radius-ct-s: 4px;
  --radius-ct-m: 6px;
}
* { margin:0; padding:0; box-sizing:border-box; }
body {
  background: var(--b0-page);
  font-family: 'Delight', -apple-system, BlinkMacSystemFont, sans-serif;
  padding: var(--spacing-xl);
  max-width: 2560px;
  margin: 0 auto;
  -webkit-font-smoothing: antialiased;
}
.dashboard-header { margin-bottom: var(--spacing-xl); }
.dashboard-title { font-size: 22px; font-weight: 400; color: var(--text-n9); letter-spacing: 0.3px; }
.dashboard-desc { font-size: 14px; color: var(--text-n5); margin-top: var(--spacing-xs); line-height: 22px; }
.dashboard-grid {
  display: grid;
  grid-template-columns: repeat(12, minmax(0, 1fr));
  gap: var(--spacing-xl);
}
@media (max-width: 900px) { .widget-card { grid-column: 1 / -1 !important; } }
.widget-card { background: transparent; display: flex; flex-direction: column; position: relative; overflow: hidden; }
.widget-title { display: flex; align-items: center; justify-content: space-between; height: 22px; margin-bottom: var(--spacing-m); }
.widget-title-text { font-size: 14px; font-weight: 400; color: var(--text-n9); letter-spacing: 0.14px; line-height: 22px; }
.widget-timestamp { font-size: 12px; color: var(--text-n5); line-height: 20px; }
.widget-body { border-radius: var(--radius-ct-m); overflow: hidden; }
.widget-empty { padding: var(--spacing-m); color: var(--text-n5); font-size: 13px; background: var(--grey-g01); }
.chart-dotted-background {
  background-color: #ffffff;
  background-image: radial-gradient(circle, rgba(0,0,0,0.18) 0.6px, transparent 0.6px);
  background-size: 3px 3px;
}
.chart-body { flex: 1; padding: var(--spacing-m); position: relative; }
.alva-watermark {
  position: absolute; bottom: var(--spacing-m); left: var(--spacing-m);
  font-size: 16px; font-weight: 600; color: var(--text-n10); opacity: 0.2;
}
.feed-list { display: flex; flex-direction: column; border: 1px solid var(--line-l07); }
.feed-item { padding: var(--spacing-s) var(--spacing-m); border-bottom: 1px solid var(--line-l05); }
.feed-item:last-child { border-bottom: none; }
.feed-title { font-size: 14px; color: var(--text-n9); line-height: 22px; }
.feed-title a { color: inherit; text-decoration: none; }
.feed-title a:hover { color: var(--main-m1); }
.feed-snippet, .social-content { font-size: 13px; color: var(--text-n7); line-height: 20px; margin-top: 4px; }
.feed-meta { font-size: 12px; color: var(--text-n5); margin-top: 4px; }
.feed-meta a { color: var(--main-m1); }
.social-stats { font-size: 12px; color: var(--text-n5); margin-top: 6px; }
.text-body { font-size: 14px; color: var(--text-n7); line-height: 22px; padding: var(--spacing-m); background: var(--grey-g01); }
.text-body p + p { margin-top: var(--spacing-xs); }
.text-body pre { font-size: 12px; white-space: pre-wrap; word-break: break-word; }
.kpi-grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(140px, 1fr)); gap: var(--spacing-s); }
.kpi-item { padding: var(--spacing-m); background: var(--grey-g01); border-radius: var(--radius-ct-m); }
.kpi-label { font-size: 12px; color: var(--text-n5); }
.kpi-value { font-size: 22px; color: var(--text-n9); margin-top: 4px; }
.kpi-delta { font-size: 12px; margin-top: 2px; }
.kpi-delta.up { color: var(--main-m3); }
.kpi-delta.down { color: var(--main-m4); }
.table-wrap { overflow-x: auto; border: 1px solid var(--line-l07); }
.data-table { width: 100%; border-collapse: collapse; font-size: 12px; color: var(--text-n9); }
.data-table th { text-align: left; font-weight: 400; color: var(--text-n5); padding: 8px 12px; border-bottom: 1px solid var(--line-l07); }
.data-table td { padding: 8px 12px; border-bottom: 1px solid var(--line-l05); }
.data-table td.num { text-align: right; font-variant-numeric: tabular-nums; }
.footer { margin-top: var(--spacing-xl); text-align: center; font-size: 11px; color: var(--text-n3); }
"#;

/// Document-level text around the widget grid.
#[derive(Debug, Clone)]
pub struct DocumentMeta {
    pub title: String,
    pub description: Option<String>,
    pub generated_at: String,
    pub chart_library_url: String,
}

/// Concatenate rendered widgets into one HTML document.
/// Fragments are embedded as-is; scripts are injected in fragment order.
pub fn assemble(meta: &DocumentMeta, fragments: &[RenderResult]) -> String {
    let cards: Vec<&str> = fragments.iter().map(|f| f.html.as_str()).collect();
    let scripts: Vec<&str> = fragments.iter().filter_map(|f| f.script.as_deref()).collect();
    let description = meta
        .description
        .as_deref()
        .filter(|d| !d.is_empty())
        .map(|d| format!(r#"<div class="dashboard-desc">{}</div>"#, escape_html(d)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="zh">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<script src="{library}"></script>
<style>{style}</style>
</head>
<body>

<div class="dashboard-header">
  <div class="dashboard-title">{title}</div>
  {description}
</div>

<div class="dashboard-grid">
  {cards}
</div>

<div class="footer">
  Generated {generated} · Data by Alva · Rendered with Alva Design System
</div>

<script>
{scripts}
</script>
</body>
</html>"#,
        title = escape_html(&meta.title),
        library = escape_html(&meta.chart_library_url),
        style = STYLE_SHEET,
        description = description,
        cards = cards.join("\n"),
        generated = escape_html(&meta.generated_at),
        scripts = scripts.join("\n"),
    )
}
