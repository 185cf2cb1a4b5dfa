use alva_dashboard::model::DataSource;
use alva_dashboard::model::uri::UriExtractor;
use alva_dashboard::resolve::style::{apply_house_style, overlay};
use alva_dashboard::resolve::transform::TransformRegistry;
use alva_dashboard::resolve::{DataResolver, SeriesMap};
use serde_json::{Value, json};
use std::sync::Arc;

const BTC: &str = "alva://time_series/1/btc_price/close";
const ETH: &str = "alva://time_series/2/eth_price/close";

fn resolver() -> DataResolver {
    DataResolver::new(
        Arc::new(UriExtractor::new("alva").unwrap()),
        Arc::new(TransformRegistry::with_builtins()),
    )
}

fn series() -> SeriesMap {
    let mut map = SeriesMap::new();
    map.insert(BTC.to_string(), json!([{"date": 1, "close": 100}, {"date": 2, "close": 110}]));
    map.insert(ETH.to_string(), json!([{"date": 1, "close": 5}]));
    map
}

fn chart_props() -> Value {
    json!({
        "xAxis": {"type": "time"},
        "series": [
            {"name": "BTC", "type": "line", "data": [BTC], "dataResolver": "(data) => data.map((d) => [d.date, d.close])"},
            {"name": "ETH", "type": "line", "data": [ETH]},
            {"name": "SOL", "type": "line", "data": ["alva://time_series/3/sol_price/close"], "dataResolver": "@pairs(date, close)"},
            {"name": "Static", "type": "bar", "data": [1, 2, 3]}
        ]
    })
}

#[test]
fn test_resolve_series_placeholders() {
    let resolved = resolver().resolve_props(&chart_props(), &series());
    let s = resolved["series"].as_array().unwrap();

    assert_eq!(s[0]["data"], json!([[1, 100], [2, 110]]));
    assert!(s[0].get("dataResolver").is_none());
    // Payload present but no transform.
    assert_eq!(s[1]["data"], json!([]));
    // Transform present but no payload.
    assert_eq!(s[2]["data"], json!([]));
    assert!(s[2].get("dataResolver").is_none());
    assert_eq!(s[3]["data"], json!([1, 2, 3]));
}

#[test]
fn test_resolve_does_not_mutate_and_is_deterministic() {
    let props = chart_props();
    let before = props.clone();
    let first = resolver().resolve_props(&props, &series());
    let second = resolver().resolve_props(&props, &series());
    assert_eq!(props, before);
    assert_eq!(first, second);
}

#[test]
fn test_axis_placeholder_and_failing_transform() {
    let props = json!({
        "xAxis": [{"type": "category", "data": [BTC], "dataResolver": "(data) => data.map((d) => d.date)"}],
        "yAxis": {"type": "value", "data": [ETH], "dataResolver": "(data) => data.sort()"}
    });
    let resolved = resolver().resolve_props(&props, &series());
    assert_eq!(resolved["xAxis"][0]["data"], json!([1, 2]));
    assert_eq!(resolved["yAxis"]["data"], json!([]));
    assert!(resolved["yAxis"].get("dataResolver").is_none());
}

#[test]
fn test_non_object_props_pass_through() {
    assert_eq!(resolver().resolve_props(&json!([1, 2]), &series()), json!([1, 2]));
}

#[test]
fn test_resolve_widget_sources() {
    let r = resolver();
    let s = series();

    let raw = DataSource::Uri { uri: ETH.to_string(), resolver: None };
    assert_eq!(r.resolve_source(&raw, &s), json!([{"date": 1, "close": 5}]));

    let shaped = DataSource::Uri { uri: BTC.to_string(), resolver: Some("@pluck(close)".to_string()) };
    assert_eq!(r.resolve_source(&shaped, &s), json!([100, 110]));

    let missing = DataSource::Uri { uri: "alva://time_series/9/x/y".to_string(), resolver: None };
    assert_eq!(r.resolve_source(&missing, &s), json!([]));

    assert_eq!(r.resolve_source(&DataSource::Inline(json!("hello")), &s), json!("hello"));
    assert_eq!(r.resolve_source(&DataSource::Absent, &s), Value::Null);
}

#[test]
fn test_overlay_is_shallow() {
    let merged = overlay(json!({"a": 1, "nested": {"x": 1, "y": 2}}), &json!({"nested": {"x": 9}, "b": 2}));
    assert_eq!(merged, json!({"a": 1, "nested": {"x": 9}, "b": 2}));
    assert_eq!(overlay(json!({"a": 1}), &Value::Null), json!({"a": 1}));
}

#[test]
fn test_house_style_axes_tooltip_and_background() {
    let mut props = json!({
        "xAxis": {"type": "category", "axisLabel": {"color": "red"}},
        "yAxis": [{"type": "value"}],
        "tooltip": {"trigger": "item"},
        "series": [{"type": "line", "itemStyle": {"color": "#ff0000"}}, {"type": "bar"}]
    });
    apply_house_style(&mut props);

    assert_eq!(props["xAxis"]["axisLabel"]["color"], "red");
    assert_eq!(props["xAxis"]["axisLabel"]["fontSize"], 10);
    assert_eq!(props["xAxis"]["axisLine"]["show"], false);
    assert_eq!(props["yAxis"][0]["splitLine"]["show"], false);

    assert_eq!(props["tooltip"]["trigger"], "item");
    assert_eq!(props["tooltip"]["borderRadius"], 6);

    assert_eq!(props["series"][0]["lineStyle"]["width"], 1);
    assert_eq!(props["series"][0]["symbol"], "circle");
    assert_eq!(props["series"][0]["emphasis"]["itemStyle"]["color"], "#ff0000");
    assert!(props["series"][1].get("lineStyle").is_none());

    assert_eq!(props["grid"]["containLabel"], true);
    assert_eq!(props["backgroundColor"], "transparent");
}

#[test]
fn test_house_style_grid_shapes() {
    let mut indexed = json!({"grid": {"1": {"top": 20}, "0": {"top": 10}}});
    apply_house_style(&mut indexed);
    assert_eq!(
        indexed["grid"],
        json!([{"containLabel": true, "top": 10}, {"containLabel": true, "top": 20}])
    );

    let mut listed = json!({"grid": [{"left": 4, "containLabel": false}]});
    apply_house_style(&mut listed);
    assert_eq!(listed["grid"], json!([{"containLabel": false, "left": 4}]));

    let mut plain = json!({"grid": {"top": 5}});
    apply_house_style(&mut plain);
    assert_eq!(plain["grid"]["top"], 5);
    assert_eq!(plain["grid"]["left"], 12);
}
