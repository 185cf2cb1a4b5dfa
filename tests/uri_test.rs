use alva_dashboard::fetch::short_name;
use alva_dashboard::model::uri::UriExtractor;

fn extractor() -> UriExtractor {
    UriExtractor::new("alva").expect("valid scheme")
}

#[test]
fn test_extract_unique_in_first_seen_order() {
    let chart_data = r#"{"widgets":[{"props":{"series":[
        {"data":["alva://time_series/12/btc_price/close?last=30"]},
        {"data":["alva://time_series/7/eth_price/close"]},
        {"data":["alva://time_series/12/btc_price/close?last=30"]}
    ]}}]}"#;
    let uris = extractor().extract(chart_data);
    assert_eq!(
        uris,
        vec![
            "alva://time_series/12/btc_price/close?last=30".to_string(),
            "alva://time_series/7/eth_price/close".to_string(),
        ]
    );
}

#[test]
fn test_extract_stops_at_escaped_quotes() {
    // chartData often arrives with its quotes escaped.
    let escaped = r#"{\"data\":[\"alva://time_series/1/node/out\"]}"#;
    assert_eq!(extractor().extract(escaped), vec!["alva://time_series/1/node/out".to_string()]);
}

#[test]
fn test_extract_without_references_is_empty() {
    assert!(extractor().extract(r#"{"widgets":[{"data":[{"a":1}]}]}"#).is_empty());
    assert!(extractor().extract("https://time_series/1/a/b").is_empty());
}

#[test]
fn test_parse_keeps_query_in_raw_key() {
    let uri = extractor().parse("alva://time_series/99/funding_rate/rates?last=10").expect("parses");
    assert_eq!(uri.source_id, "99");
    assert_eq!(uri.node_name, "funding_rate");
    assert_eq!(uri.output_name, "rates");
    assert_eq!(uri.raw, "alva://time_series/99/funding_rate/rates?last=10");
    assert_eq!(uri.short(), "funding_rate/rates");
    assert_eq!(uri.to_string(), uri.raw);
}

#[test]
fn test_parse_rejects_malformed_references() {
    let ex = extractor();
    assert!(ex.parse("alva://time_series/abc/node/out").is_none());
    assert!(ex.parse("alva://time_series/1/node").is_none());
    assert!(ex.is_reference("alva://time_series/abc"));
    assert!(!ex.is_reference("other://time_series/1/a/b"));
}

#[test]
fn test_custom_scheme() {
    let ex = UriExtractor::new("acme").expect("valid scheme");
    assert_eq!(ex.extract(r#"["acme://time_series/3/n/o", "alva://time_series/3/n/o"]"#).len(), 1);
}

#[test]
fn test_short_name_for_logs() {
    assert_eq!(short_name("alva://time_series/1/node/out?last=5"), "node/out?last=5");
}
