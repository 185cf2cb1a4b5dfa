use crate::typedoc::{FieldDef, FieldType};
use regex::Regex;
use std::sync::LazyLock;

static TIME_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(date|time|timestamp|epoch)\b").unwrap());

/// Presentation roles of a record's fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRoles {
    pub time_field: Option<FieldDef>,
    pub value_fields: Vec<FieldDef>,
    pub label_fields: Vec<FieldDef>,
    pub bool_fields: Vec<FieldDef>,
}

impl FieldRoles {
    /// All classified fields, time field first.
    pub fn all(&self) -> Vec<FieldDef> {
        self.time_field
            .iter()
            .chain(&self.value_fields)
            .chain(&self.label_fields)
            .chain(&self.bool_fields)
            .cloned()
            .collect()
    }
}

/// Only the first numeric time-like field becomes the time axis; later ones are values.
pub fn infer_field_roles(fields: &[FieldDef]) -> FieldRoles {
    let mut roles = FieldRoles::default();
    for field in fields {
        match field.field_type {
            FieldType::Boolean => roles.bool_fields.push(field.clone()),
            FieldType::String => roles.label_fields.push(field.clone()),
            FieldType::Number => {
                if roles.time_field.is_none() && looks_like_time(field) {
                    roles.time_field = Some(field.clone());
                } else {
                    roles.value_fields.push(field.clone());
                }
            }
            FieldType::Other(_) => {}
        }
    }
    roles
}

pub fn looks_like_time(field: &FieldDef) -> bool {
    TIME_HINT.is_match(&format!("{} {}", field.name, field.desc))
}
