mod common;

use alva_dashboard::fetch::{FetchKind, FetchPool};
use alva_dashboard::model::uri::UriExtractor;
use common::FakeApi;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn uri(i: usize) -> String {
    format!("alva://time_series/{}/node_{}/out", i, i)
}

fn pool(api: Arc<FakeApi>, batch_size: usize) -> FetchPool {
    FetchPool::new(api, Arc::new(UriExtractor::new("alva").unwrap()), batch_size)
}

#[tokio::test]
async fn test_no_uris_makes_no_calls() {
    let api = Arc::new(FakeApi::default());
    let fetched = pool(api.clone(), 5).fetch_all(&[]).await;

    assert!(fetched.series.is_empty());
    assert!(fetched.failures.is_empty());
    assert_eq!(FakeApi::count(&api.series_calls), 0);
    assert_eq!(FakeApi::count(&api.typedoc_calls), 0);
}

#[tokio::test]
async fn test_fetches_series_and_typedocs() {
    let mut fake = FakeApi::default();
    fake.series.insert(uri(1), json!([{"v": 1}, {"v": 2}]));
    fake.series.insert(uri(2), json!([{"v": 3}]));
    fake.typedocs.insert(uri(1), "fields:\n- v(number): value".to_string());
    let api = Arc::new(fake);

    let fetched = pool(api.clone(), 5).fetch_all(&[uri(1), uri(2)]).await;

    assert_eq!(fetched.series.len(), 2);
    assert_eq!(fetched.series[&uri(1)], json!([{"v": 1}, {"v": 2}]));
    assert_eq!(fetched.typedocs.len(), 1);
    assert!(fetched.typedocs.contains_key(&uri(1)));
    assert!(fetched.failures.is_empty());
    assert_eq!(FakeApi::count(&api.series_calls), 2);
    assert_eq!(FakeApi::count(&api.typedoc_calls), 2);
}

#[tokio::test]
async fn test_failed_fetch_does_not_block_siblings() {
    let mut fake = FakeApi::default();
    for i in 0..4 {
        fake.series.insert(uri(i), json!([i]));
    }
    fake.failing.insert(uri(2));
    let api = Arc::new(fake);

    let uris: Vec<String> = (0..4).map(uri).collect();
    let fetched = pool(api, 5).fetch_all(&uris).await;

    assert_eq!(fetched.series.len(), 3);
    assert!(!fetched.series.contains_key(&uri(2)));
    assert_eq!(fetched.failures.len(), 1);
    assert_eq!(fetched.failures[0].uri, uri(2));
    assert_eq!(fetched.failures[0].kind, FetchKind::Series);
    assert!(fetched.failures[0].error.contains("502"));
}

#[tokio::test]
async fn test_groups_settle_before_next_starts() {
    let mut fake = FakeApi::default();
    for i in 0..12 {
        fake.series.insert(uri(i), json!([i]));
    }
    fake.delay = Duration::from_millis(20);
    let api = Arc::new(fake);

    let uris: Vec<String> = (0..12).map(uri).collect();
    let fetched = pool(api.clone(), 5).fetch_all(&uris).await;

    assert_eq!(fetched.series.len(), 12);
    assert_eq!(FakeApi::count(&api.series_calls), 12);
    assert_eq!(FakeApi::count(&api.max_in_flight), 5);
}

#[tokio::test]
async fn test_next_group_waits_for_slowest_call() {
    let mut fake = FakeApi::default();
    for i in 0..7 {
        fake.series.insert(uri(i), json!([i]));
    }
    fake.slow_series.insert(uri(0), Duration::from_millis(60));
    fake.slow_typedocs.insert(uri(3), Duration::from_millis(40));
    let api = Arc::new(fake);

    let uris: Vec<String> = (0..7).map(uri).collect();
    let fetched = pool(api.clone(), 5).fetch_all(&uris).await;
    assert_eq!(fetched.series.len(), 7);

    let events = api.events();
    let position = |event: String| {
        events
            .iter()
            .position(|e| *e == event)
            .unwrap_or_else(|| panic!("missing event `{}` in {:?}", event, events))
    };
    let second_group_start = ["series", "typedoc"]
        .iter()
        .flat_map(|kind| (5..7).map(move |i| format!("start {} {}", kind, uri(i))))
        .map(&position)
        .min()
        .expect("second group started");
    for i in 0..5 {
        for kind in ["series", "typedoc"] {
            assert!(
                position(format!("end {} {}", kind, uri(i))) < second_group_start,
                "{} of {} still running when the next group began",
                kind,
                uri(i)
            );
        }
    }
}

#[tokio::test]
async fn test_unparseable_uri_skips_typedoc() {
    let mut fake = FakeApi::default();
    let odd = "alva://time_series/latest".to_string();
    fake.series.insert(odd.clone(), json!([1]));
    let api = Arc::new(fake);

    let fetched = pool(api.clone(), 5).fetch_all(&[odd.clone()]).await;

    assert_eq!(fetched.series[&odd], json!([1]));
    assert_eq!(FakeApi::count(&api.series_calls), 1);
    assert_eq!(FakeApi::count(&api.typedoc_calls), 0);
}
