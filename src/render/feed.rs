use crate::render::classify::{RendererKind, name_matches};
use crate::render::format::{escape_html, format_date, format_plain, truncate_chars};
use crate::render::{RenderContext, RenderResult, WidgetRenderer, card, empty_body};
use serde_json::Value;

const MAX_ITEMS: usize = 50;
const SNIPPET_CHARS: usize = 280;

const TITLE: &[&str] = &["title", "headline"];
const URL: &[&str] = &["url", "link", "href"];
const CONTENT: &[&str] = &["content", "text", "full_text", "body", "summary", "description"];
const AUTHOR: &[&str] = &["author", "user", "username", "user_name", "screen_name", "handle", "source", "publisher"];
const TIME: &[&str] = &["date", "time", "timestamp", "published_at", "created_at", "publish_time"];
const STATS: &[(&str, &str)] = &[("like", "♥"), ("favorite", "♥"), ("retweet", "🔁"), ("repost", "🔁"), ("comment", "💬"), ("repl", "💬")];

fn pick<'a>(record: &'a Value, names: &[&str]) -> Option<&'a Value> {
    record
        .as_object()?
        .iter()
        .find(|(k, v)| !v.is_null() && name_matches(k, names))
        .map(|(_, v)| v)
}

fn pick_text(record: &Value, names: &[&str]) -> Option<String> {
    pick(record, names).map(format_plain).filter(|s| !s.is_empty())
}

/// Only http(s) links are emitted.
fn safe_url(record: &Value) -> Option<String> {
    pick_text(record, URL).filter(|u| u.starts_with("https://") || u.starts_with("http://"))
}

fn item_time(ctx: &RenderContext, record: &Value) -> Option<String> {
    let value = ctx
        .roles
        .time_field
        .as_ref()
        .and_then(|f| record.get(&f.name))
        .or_else(|| pick(record, TIME))?;
    Some(format_date(value, &ctx.offset))
}

fn feed_items<'a>(ctx: &RenderContext<'a>) -> Vec<&'a Value> {
    ctx.records().iter().filter(|r| r.is_object()).take(MAX_ITEMS).collect()
}

fn wrap(ctx: &RenderContext, items: Vec<String>) -> RenderResult {
    let body = if items.is_empty() {
        empty_body()
    } else {
        format!(r#"<div class="widget-body feed-list">{}</div>"#, items.join("\n"))
    };
    RenderResult { html: card(ctx, "feed-card", &body), script: None, span: ctx.span }
}

#[derive(Debug)]
pub struct NewsFeedRenderer;

impl WidgetRenderer for NewsFeedRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::NewsFeed
    }

    fn render(&self, ctx: &RenderContext) -> RenderResult {
        let items = feed_items(ctx)
            .into_iter()
            .map(|record| {
                let content = pick_text(record, CONTENT).map(|c| truncate_chars(&c, SNIPPET_CHARS));
                let title = pick_text(record, TITLE).or_else(|| content.clone()).unwrap_or_default();
                let title_html = match safe_url(record) {
                    Some(url) => format!(
                        r#"<a href="{}" target="_blank" rel="noopener noreferrer">{}</a>"#,
                        escape_html(&url),
                        escape_html(&title)
                    ),
                    None => escape_html(&title),
                };
                let snippet = match (&content, pick_text(record, TITLE)) {
                    (Some(c), Some(_)) => format!(r#"<div class="feed-snippet">{}</div>"#, escape_html(c)),
                    _ => String::new(),
                };
                let meta: Vec<String> = [pick_text(record, AUTHOR), item_time(ctx, record)]
                    .into_iter()
                    .flatten()
                    .map(|m| escape_html(&m))
                    .collect();
                format!(
                    r#"<div class="feed-item"><div class="feed-title">{}</div>{}<div class="feed-meta">{}</div></div>"#,
                    title_html,
                    snippet,
                    meta.join(" · ")
                )
            })
            .collect();
        wrap(ctx, items)
    }
}

#[derive(Debug)]
pub struct SocialFeedRenderer;

impl WidgetRenderer for SocialFeedRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::SocialFeed
    }

    fn render(&self, ctx: &RenderContext) -> RenderResult {
        let items = feed_items(ctx)
            .into_iter()
            .map(|record| {
                let author = pick_text(record, AUTHOR).unwrap_or_else(|| "unknown".to_string());
                let content = pick_text(record, CONTENT).unwrap_or_default();
                let stats: Vec<String> = record
                    .as_object()
                    .into_iter()
                    .flatten()
                    .filter_map(|(k, v)| {
                        let lower = k.to_ascii_lowercase();
                        let (_, icon) = STATS.iter().find(|(hint, _)| lower.contains(hint))?;
                        v.is_number().then(|| format!("{} {}", icon, escape_html(&format_plain(v))))
                    })
                    .collect();
                let when = item_time(ctx, record).map(|t| format!(" · {}", escape_html(&t))).unwrap_or_default();
                let link = safe_url(record)
                    .map(|u| format!(r#" · <a href="{}" target="_blank" rel="noopener noreferrer">open</a>"#, escape_html(&u)))
                    .unwrap_or_default();
                format!(
                    r#"<div class="feed-item social-item"><div class="feed-meta"><b>@{}</b>{}{}</div><div class="social-content">{}</div><div class="social-stats">{}</div></div>"#,
                    escape_html(author.trim_start_matches('@')),
                    when,
                    link,
                    escape_html(&content).replace('\n', "<br>"),
                    stats.join("&nbsp;&nbsp;")
                )
            })
            .collect();
        wrap(ctx, items)
    }
}
