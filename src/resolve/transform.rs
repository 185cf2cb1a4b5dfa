use crate::error::DashboardError;
use anyhow::{Result, anyhow};
use evalexpr::{build_operator_tree, Context, ContextWithMutableVariables, DefaultNumericTypes, HashMapContext, Node as EvalNode};
use regex::Regex;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, LazyLock};

static NAMED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)^@(\w+)\s*(?:\((.*)\))?$").unwrap());
static ARROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\(?\s*(\w+)\s*\)?\s*=>\s*(.+?)\s*;?$").unwrap());
static MAP_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(\w+)\.map\(\s*\(?\s*(\w+)\s*\)?\s*=>\s*(.+)\)$").unwrap());
static BLOCK_RETURN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^\{\s*return\s+(.+?)\s*;?\s*\}$").unwrap());

/// 数据变换插件接口：按名称注册，由服务端在 widget 定义里选择
pub trait SeriesTransform: Send + Sync + Debug {
    fn name(&self) -> &str;
    fn apply(&self, payload: &Value, args: &[String]) -> Result<Value>;
}

fn records<'a>(payload: &'a Value, transform: &str) -> Result<&'a Vec<Value>> {
    payload
        .as_array()
        .ok_or_else(|| anyhow!(DashboardError::Transform(format!("{} expects an array payload", transform))))
}

fn arg<'a>(args: &'a [String], idx: usize, transform: &str) -> Result<&'a str> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| anyhow!(DashboardError::Transform(format!("{} is missing argument #{}", transform, idx + 1))))
}

#[derive(Debug)]
pub struct IdentityTransform;

impl SeriesTransform for IdentityTransform {
    fn name(&self) -> &str { "identity" }
    fn apply(&self, payload: &Value, _args: &[String]) -> Result<Value> {
        Ok(payload.clone())
    }
}

/// `@pluck(field)`: one value per record.
#[derive(Debug)]
pub struct PluckTransform;

impl SeriesTransform for PluckTransform {
    fn name(&self) -> &str { "pluck" }
    fn apply(&self, payload: &Value, args: &[String]) -> Result<Value> {
        let field = arg(args, 0, self.name())?;
        let values = records(payload, self.name())?
            .iter()
            .map(|r| r.get(field).cloned().unwrap_or(Value::Null))
            .collect();
        Ok(Value::Array(values))
    }
}

/// `@pairs(x, y)`: `[x, y]` per record, the shape time-axis line series use.
#[derive(Debug)]
pub struct PairsTransform;

impl SeriesTransform for PairsTransform {
    fn name(&self) -> &str { "pairs" }
    fn apply(&self, payload: &Value, args: &[String]) -> Result<Value> {
        let x = arg(args, 0, self.name())?;
        let y = arg(args, 1, self.name())?;
        let values = records(payload, self.name())?
            .iter()
            .map(|r| json!([r.get(x).cloned().unwrap_or(Value::Null), r.get(y).cloned().unwrap_or(Value::Null)]))
            .collect();
        Ok(Value::Array(values))
    }
}

#[derive(Debug)]
pub struct ReverseTransform;

impl SeriesTransform for ReverseTransform {
    fn name(&self) -> &str { "reverse" }
    fn apply(&self, payload: &Value, _args: &[String]) -> Result<Value> {
        let mut values = records(payload, self.name())?.clone();
        values.reverse();
        Ok(Value::Array(values))
    }
}

/// A `dataResolver` annotation compiled into something safe to run.
#[derive(Debug)]
pub enum CompiledTransform {
    Identity,
    Named { transform: Arc<dyn SeriesTransform>, args: Vec<String> },
    /// Sandboxed per-record expression (`data.map(d => EXPR)`).
    PerRecord { record_var: String, expr: EvalNode, raw: String, reverse: bool },
}

impl CompiledTransform {
    pub fn apply(&self, payload: &Value) -> Result<Value> {
        match self {
            CompiledTransform::Identity => Ok(payload.clone()),
            CompiledTransform::Named { transform, args } => transform.apply(payload, args),
            CompiledTransform::PerRecord { record_var, expr, raw, reverse } => {
                let mut out = Vec::new();
                for record in records(payload, "map")? {
                    let ctx = record_context(record_var, record, expr);
                    let result = expr
                        .eval_with_context(&ctx)
                        .map_err(|e| anyhow!(DashboardError::Transform(format!("`{}`: {}", raw, e))))?;
                    out.push(from_eval(result));
                }
                if *reverse {
                    out.reverse();
                }
                Ok(Value::Array(out))
            }
        }
    }
}

/// Registry of named transforms. Unknown names fail to compile.
#[derive(Debug, Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Arc<dyn SeriesTransform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(IdentityTransform));
        registry.register(Arc::new(PluckTransform));
        registry.register(Arc::new(PairsTransform));
        registry.register(Arc::new(ReverseTransform));
        registry
    }

    pub fn register(&mut self, transform: Arc<dyn SeriesTransform>) {
        self.transforms.insert(transform.name().to_string(), transform);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn SeriesTransform>> {
        self.transforms.get(name).cloned()
    }

    /// Compile an annotation: `@name(args)` or an arrow function of the form
    /// `(data) => data` / `(data) => data.map((d) => EXPR)[.reverse()]`.
    pub fn compile(&self, annotation: &str) -> Result<CompiledTransform> {
        let text = annotation.trim();

        if let Some(caps) = NAMED.captures(text) {
            let name = &caps[1];
            let transform = self
                .get(name)
                .ok_or_else(|| anyhow!(DashboardError::Transform(format!("unknown transform @{}", name))))?;
            let args = caps
                .get(2)
                .map(|m| split_args(m.as_str()))
                .unwrap_or_default();
            return Ok(CompiledTransform::Named { transform, args });
        }

        let caps = ARROW
            .captures(text)
            .ok_or_else(|| anyhow!(DashboardError::Transform(format!("unsupported resolver `{}`", text))))?;
        let param = caps[1].to_string();
        let mut body = caps[2].trim().to_string();
        if let Some(inner) = BLOCK_RETURN.captures(&body) {
            body = inner[1].trim().to_string();
        }
        if body == param {
            return Ok(CompiledTransform::Identity);
        }

        let reverse = body.ends_with(".reverse()");
        if reverse {
            body.truncate(body.len() - ".reverse()".len());
        }

        let map = MAP_CALL
            .captures(&body)
            .filter(|m| m[1] == param)
            .ok_or_else(|| anyhow!(DashboardError::Transform(format!("unsupported resolver body `{}`", body))))?;
        let record_var = map[2].to_string();
        let mut expr_src = map[3].trim().to_string();
        if let Some(inner) = BLOCK_RETURN.captures(&expr_src) {
            expr_src = inner[1].trim().to_string();
        }

        let rewritten = rewrite_expression(&expr_src, &record_var)?;
        let expr = build_operator_tree::<DefaultNumericTypes>(&rewritten)
            .map_err(|e| anyhow!(DashboardError::Transform(format!("`{}`: {}", rewritten, e))))?;

        Ok(CompiledTransform::PerRecord { record_var, expr, raw: rewritten, reverse })
    }
}

fn split_args(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|a| a.trim().trim_matches(|c| c == '"' || c == '\'').to_string())
        .filter(|a| !a.is_empty())
        .collect()
}

/// `d.close` -> `close`, `[a, b]` -> `(a, b)`, strict equality -> `==`.
fn rewrite_expression(src: &str, record_var: &str) -> Result<String> {
    let member = Regex::new(&format!(r"\b{}\.(\w+)", regex::escape(record_var)))?;
    let out = member
        .replace_all(src, "$1")
        .replace("===", "==")
        .replace("!==", "!=")
        .replace('[', "(")
        .replace(']', ")");
    Ok(out)
}

/// Keys the expression reads but the record lacks are bound to empty, so sparse
/// records yield `null` instead of failing the whole series.
fn record_context(record_var: &str, record: &Value, expr: &EvalNode) -> HashMapContext<DefaultNumericTypes> {
    let mut ctx = HashMapContext::<DefaultNumericTypes>::new();
    match record {
        Value::Object(obj) => {
            for (k, v) in obj {
                if let Some(ev) = to_eval(v) {
                    let _ = ctx.set_value(k.clone(), ev);
                }
            }
        }
        scalar => {
            if let Some(ev) = to_eval(scalar) {
                let _ = ctx.set_value(record_var.to_string(), ev);
            }
        }
    }
    let missing: Vec<String> = expr
        .iter_variable_identifiers()
        .filter(|id| ctx.get_value(id).is_none())
        .map(str::to_string)
        .collect();
    for id in missing {
        let _ = ctx.set_value(id, evalexpr::Value::Empty);
    }
    ctx
}

fn to_eval(v: &Value) -> Option<evalexpr::Value> {
    match v {
        Value::String(s) => Some(evalexpr::Value::String(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() { Some(evalexpr::Value::Int(i)) }
            else { n.as_f64().map(evalexpr::Value::Float) }
        }
        Value::Bool(b) => Some(evalexpr::Value::Boolean(*b)),
        Value::Null => Some(evalexpr::Value::Empty),
        _ => None,
    }
}

fn from_eval(v: evalexpr::Value) -> Value {
    match v {
        evalexpr::Value::String(s) => Value::String(s),
        evalexpr::Value::Int(i) => json!(i),
        evalexpr::Value::Float(f) => serde_json::Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        evalexpr::Value::Boolean(b) => Value::Bool(b),
        evalexpr::Value::Tuple(items) => Value::Array(items.into_iter().map(from_eval).collect()),
        evalexpr::Value::Empty => Value::Null,
    }
}
