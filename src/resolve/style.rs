use serde_json::{Map, Value, json};

const FONT_FAMILY: &str = "'Delight',-apple-system,BlinkMacSystemFont,sans-serif";
const ACCENT: &str = "#49A3A6";

fn axis_defaults() -> Value {
    json!({
        "axisLine": { "show": false },
        "axisTick": { "show": false },
        "axisLabel": { "fontSize": 10, "color": "rgba(0,0,0,0.7)", "fontFamily": FONT_FAMILY, "margin": 8 },
        "splitLine": { "show": false }
    })
}

fn grid_defaults() -> Value {
    json!({ "top": 50, "right": 12, "bottom": 0, "left": 12, "containLabel": true })
}

fn tooltip_defaults() -> Value {
    json!({
        "trigger": "axis",
        "backgroundColor": "rgba(255,255,255,0.96)",
        "borderColor": "rgba(0,0,0,0.08)",
        "borderWidth": 1,
        "borderRadius": 6,
        "padding": 12,
        "textStyle": { "fontFamily": FONT_FAMILY, "fontSize": 12, "fontWeight": 400, "color": "rgba(0,0,0,0.9)" },
        "axisPointer": { "type": "line", "lineStyle": { "color": "rgba(0,0,0,0.1)", "width": 1 } },
        "extraCssText": "box-shadow:none;"
    })
}

/// Shallow merge: keys of `top` win over keys of `base`.
pub fn overlay(base: Value, top: &Value) -> Value {
    match (base, top) {
        (Value::Object(mut b), Value::Object(t)) => {
            for (k, v) in t {
                b.insert(k.clone(), v.clone());
            }
            Value::Object(b)
        }
        (base, Value::Null) => base,
        (_, top) => top.clone(),
    }
}

fn style_axis(axis: &mut Value) {
    let own_label = axis.get("axisLabel").cloned().unwrap_or(Value::Null);
    let defaults = axis_defaults();
    let label = overlay(defaults["axisLabel"].clone(), &own_label);
    let mut styled = overlay(defaults, axis);
    styled["axisLabel"] = label;
    *axis = styled;
}

fn style_grid(grid: Option<&Value>) -> Value {
    let contain = json!({ "containLabel": true });
    match grid {
        Some(Value::Array(items)) => Value::Array(items.iter().map(|g| overlay(contain.clone(), g)).collect()),
        Some(Value::Object(obj)) => {
            // The backend sometimes sends arrays as {"0": {...}, "1": {...}}.
            let mut indexed: Vec<(u64, &Value)> = obj
                .iter()
                .filter_map(|(k, v)| k.parse::<u64>().ok().map(|i| (i, v)))
                .collect();
            if indexed.is_empty() {
                overlay(grid_defaults(), &Value::Object(obj.clone()))
            } else {
                indexed.sort_by_key(|(i, _)| *i);
                Value::Array(indexed.into_iter().map(|(_, g)| overlay(contain.clone(), g)).collect())
            }
        }
        _ => grid_defaults(),
    }
}

fn style_line_series(series: &mut Map<String, Value>) {
    if series.get("type").and_then(Value::as_str) != Some("line") {
        return;
    }
    let line_style = overlay(series.get("lineStyle").cloned().unwrap_or(json!({})), &json!({ "width": 1 }));
    let color = series
        .get("itemStyle")
        .and_then(|s| s.get("color"))
        .or_else(|| line_style.get("color"))
        .cloned()
        .unwrap_or_else(|| json!(ACCENT));

    series.insert("lineStyle".to_string(), line_style);
    series.insert("symbol".to_string(), json!("circle"));
    series.insert("symbolSize".to_string(), json!(10));
    series.insert("showSymbol".to_string(), json!(false));
    series.insert(
        "emphasis".to_string(),
        json!({ "itemStyle": { "borderColor": "#ffffff", "borderWidth": 1, "color": color } }),
    );
}

/// Normalize resolved chart options to the dashboard's house style.
pub fn apply_house_style(props: &mut Value) {
    let Some(obj) = props.as_object_mut() else {
        return;
    };

    for key in ["xAxis", "yAxis"] {
        match obj.get_mut(key) {
            Some(Value::Array(axes)) => axes.iter_mut().filter(|a| a.is_object()).for_each(style_axis),
            Some(axis @ Value::Object(_)) => style_axis(axis),
            _ => {}
        }
    }

    let grid = style_grid(obj.get("grid"));
    obj.insert("grid".to_string(), grid);

    let tooltip = match obj.get("tooltip") {
        Some(own) => overlay(tooltip_defaults(), own),
        None => tooltip_defaults(),
    };
    obj.insert("tooltip".to_string(), tooltip);

    match obj.get_mut("series") {
        Some(Value::Array(items)) => items.iter_mut().filter_map(Value::as_object_mut).for_each(style_line_series),
        Some(Value::Object(item)) => style_line_series(item),
        _ => {}
    }

    obj.insert("backgroundColor".to_string(), json!("transparent"));
}
