use alva_dashboard::client::http::HttpClient;
use alva_dashboard::client::stream::{LineDecoder, SessionTracker, WidgetTask, widget_progress};
use alva_dashboard::config::AppConfig;
use alva_dashboard::error::DashboardError;
use serde_json::json;

#[test]
fn test_line_decoder_joins_split_chunks() {
    let mut decoder = LineDecoder::default();
    assert_eq!(decoder.push(b"{\"a\":1}\n{\"b\""), vec!["{\"a\":1}".to_string()]);
    assert_eq!(decoder.push(b":2}\n\n"), vec!["{\"b\":2}".to_string(), String::new()]);
    assert_eq!(decoder.finish(), None);

    decoder.push(b"tail");
    assert_eq!(decoder.finish(), Some("tail".to_string()));
}

#[test]
fn test_line_decoder_keeps_multibyte_chars_intact() {
    let text = "{\"session_name\":\"比特币\"}\n";
    let bytes = text.as_bytes();
    let mut decoder = LineDecoder::default();
    let mut lines = decoder.push(&bytes[..18]);
    lines.extend(decoder.push(&bytes[18..]));
    assert_eq!(lines, vec!["{\"session_name\":\"比特币\"}".to_string()]);
}

#[test]
fn test_tracker_last_session_wins_and_reports_progress() {
    let mut tracker = SessionTracker::default();
    assert!(tracker.observe("").is_none());
    assert!(tracker.observe("data: not json").is_none());
    assert!(tracker.observe(r#"{"session_id": "s-1"}"#).is_none());
    assert!(tracker.observe(r#"{"session_id": "s-2", "session_name": "BTC board"}"#).is_none());
    assert!(tracker.observe(r#"{"session_id": ""}"#).is_none());

    let progress = json!({
        "msg": "building <WIDGET_BUILDING>[{\"task_name\":\"Price\",\"status\":\"completed\"},{\"task_name\":\"Flows\",\"status\":\"in_progress\"}]</WIDGET_BUILDING>"
    })
    .to_string();
    let tasks = tracker.observe(&progress).expect("progress parsed");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].icon(), "✅");
    assert_eq!(tasks[1].icon(), "🔄");

    let session = tracker.finish().expect("session id seen");
    assert_eq!(session.session_id, "s-2");
    assert_eq!(session.session_name.as_deref(), Some("BTC board"));
}

#[test]
fn test_stream_without_session_is_an_error() {
    let mut tracker = SessionTracker::default();
    tracker.observe(r#"{"msg": "thinking"}"#);
    assert!(matches!(tracker.finish(), Err(DashboardError::MissingSession)));
}

#[test]
fn test_widget_progress_ignores_garbage() {
    assert!(widget_progress("no markers").is_none());
    assert!(widget_progress("<WIDGET_BUILDING>oops</WIDGET_BUILDING>").is_none());
    let pending = WidgetTask { task_name: "X".to_string(), status: "queued".to_string() };
    assert_eq!(pending.icon(), "⏳");
}

#[test]
fn test_request_bodies() {
    let config = AppConfig::default();
    let body = HttpClient::persisted_query_body(&config, "GetTimeSeriesData", json!({"input": {"uri": "u"}}), "abc");
    assert_eq!(body["operationName"], "GetTimeSeriesData");
    assert_eq!(body["variables"]["input"]["uri"], "u");
    assert_eq!(body["extensions"]["persistedQuery"], json!({"version": 1, "sha256Hash": "abc"}));
    assert_eq!(body["extensions"]["clientLibrary"]["name"], "@apollo/client");

    let create = HttpClient::create_body(&config, "BTC vs ETH");
    assert_eq!(create["message"], "BTC vs ETH");
    assert_eq!(create["session_kind"], "Dashboard");
    assert_eq!(create["input_image_urls"], json!([]));
    assert_eq!(create["timezone_offset_min"], 480);
    assert_eq!(create["skill_id"], config.dashboard_skill_id.as_str());
}
