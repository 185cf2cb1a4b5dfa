pub mod roles;

use regex::Regex;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

static FIELDS_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^fields:\s*$").unwrap());
static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-\s*(\w+)\((\w+)\):\s*(.+)$").unwrap());

/// Records inspected when guessing fields from data that has no typedoc.
const SAMPLE_RECORDS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Number,
    String,
    Boolean,
    #[serde(untagged)]
    Other(String),
}

impl FieldType {
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "number" | "float" | "int" | "integer" => FieldType::Number,
            "string" | "str" => FieldType::String,
            "boolean" | "bool" => FieldType::Boolean,
            _ => FieldType::Other(raw.to_string()),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Number => f.write_str("number"),
            FieldType::String => f.write_str("string"),
            FieldType::Boolean => f.write_str("boolean"),
            FieldType::Other(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub desc: String,
}

impl FieldDef {
    pub fn new(name: &str, field_type: FieldType, desc: &str) -> Self {
        Self { name: name.to_string(), field_type, desc: desc.to_string() }
    }

    pub fn is_number(&self) -> bool {
        self.field_type == FieldType::Number
    }
}

/// Parsed typedoc: free-text description plus the documented fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    pub description: String,
    pub fields: Vec<FieldDef>,
}

/// Parse a typedoc string:
///
/// ```text
/// Daily close prices.
/// fields:
/// - date(number): unix timestamp
/// - close(number): closing price
/// ```
///
/// Lines under `fields:` that don't look like `- name(type): desc` (unindented) are skipped.
pub fn parse_typedoc(typedoc: Option<&str>) -> Option<TypeDescriptor> {
    let text = typedoc?;
    if text.trim().is_empty() {
        return None;
    }

    let mut description = Vec::new();
    let mut fields = Vec::new();
    let mut in_fields = false;

    for raw in text.lines() {
        let line = raw.trim();
        if FIELDS_MARKER.is_match(line) {
            in_fields = true;
            continue;
        }
        if in_fields {
            // Entries must start at column 0; indented lines are continuation text.
            if let Some(caps) = FIELD_LINE.captures(raw.trim_end()) {
                fields.push(FieldDef {
                    name: caps[1].to_string(),
                    field_type: FieldType::parse(&caps[2]),
                    desc: caps[3].trim().to_string(),
                });
            }
        } else if !line.is_empty() {
            description.push(line);
        }
    }

    Some(TypeDescriptor { description: description.join(" "), fields })
}

/// Merge the fields of several descriptors; the first definition of a name wins.
pub fn merge_fields<'a>(descriptors: impl IntoIterator<Item = &'a TypeDescriptor>) -> Vec<FieldDef> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for doc in descriptors {
        for field in &doc.fields {
            if seen.insert(field.name.clone()) {
                merged.push(field.clone());
            }
        }
    }
    merged
}

/// Guess fields from record values (first non-null value decides the type).
pub fn infer_fields_from_records(records: &[Value]) -> Vec<FieldDef> {
    let mut seen = HashSet::new();
    let mut fields = Vec::new();
    for record in records.iter().take(SAMPLE_RECORDS) {
        let Some(obj) = record.as_object() else { continue };
        for (key, value) in obj {
            let field_type = match value {
                Value::Number(_) => FieldType::Number,
                Value::String(_) => FieldType::String,
                Value::Bool(_) => FieldType::Boolean,
                Value::Null => continue,
                Value::Array(_) => FieldType::Other("array".to_string()),
                Value::Object(_) => FieldType::Other("object".to_string()),
            };
            if seen.insert(key.clone()) {
                fields.push(FieldDef::new(key, field_type, ""));
            }
        }
    }
    fields
}

/// Documented fields first, then undocumented keys found in the records.
pub fn complete_fields(documented: &[FieldDef], records: &[Value]) -> Vec<FieldDef> {
    let mut fields = documented.to_vec();
    for inferred in infer_fields_from_records(records) {
        if !fields.iter().any(|f| f.name == inferred.name) {
            fields.push(inferred);
        }
    }
    fields
}
