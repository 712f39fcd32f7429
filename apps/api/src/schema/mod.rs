//! Schema Registry: declarative shapes for everything exchanged with the LLM.
//!
//! A `Schema` is pure data. It is used three ways:
//! - rendered into prompts (`example_json`, `field_guide`) so the model sees intent, not just types
//! - rendered as JSON Schema (`json_schema`) for tool declarations
//! - applied at runtime (`validate_and_coerce`) as the boundary between raw model output and typed results

use serde_json::{json, Map, Number, Value};
use thiserror::Error;

pub mod registry;

/// The type of a single schema field.
#[derive(Debug, Clone, Copy)]
pub enum FieldType {
    String,
    /// Numbers outside `[min, max]` are clamped, then rounded to an integer.
    Number { min: f64, max: f64 },
    Enum(&'static [&'static str]),
    Array(&'static FieldType),
    Record(&'static Schema),
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub ty: FieldType,
    pub description: &'static str,
    /// Optional fields may be absent or null; they are normalized to an empty value.
    pub optional: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub name: &'static str,
    pub description: &'static str,
    pub fields: &'static [Field],
}

/// Why a value failed validation. `path` is a dotted JSON path, e.g. `experience[0].title`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaViolation {
    #[error("{path}: expected {expected}, found {found}")]
    WrongType {
        path: String,
        expected: String,
        found: String,
    },

    #[error("{path}: required field is missing")]
    Missing { path: String },

    #[error("{path}: '{value}' is not one of {allowed:?}")]
    NotInEnum {
        path: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{path}: nested JSON payload could not be parsed: {message}")]
    NestedPayload { path: String, message: String },
}

/// A schema definition defect, detected at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaDefect {
    #[error("schema '{0}' has no description")]
    MissingSchemaDescription(&'static str),

    #[error("field '{schema}.{field}' has no description")]
    MissingFieldDescription {
        schema: &'static str,
        field: &'static str,
    },

    #[error("field '{schema}.{field}' is declared more than once")]
    DuplicateField {
        schema: &'static str,
        field: &'static str,
    },

    #[error("enum field '{schema}.{field}' has no variants")]
    EmptyEnum {
        schema: &'static str,
        field: &'static str,
    },
}

impl Schema {
    /// Checks the definition itself (recursively into nested records).
    pub fn verify(&self) -> Result<(), SchemaDefect> {
        if self.description.trim().is_empty() {
            return Err(SchemaDefect::MissingSchemaDescription(self.name));
        }
        for (i, field) in self.fields.iter().enumerate() {
            if field.description.trim().is_empty() {
                return Err(SchemaDefect::MissingFieldDescription {
                    schema: self.name,
                    field: field.name,
                });
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(SchemaDefect::DuplicateField {
                    schema: self.name,
                    field: field.name,
                });
            }
            verify_type(self.name, field.name, &field.ty)?;
        }
        Ok(())
    }

    /// Validates `value` against this schema, applying best-effort coercion.
    ///
    /// Returns a new value that contains exactly the declared fields.
    pub fn validate_and_coerce(&self, value: Value) -> Result<Value, SchemaViolation> {
        coerce_record(self, value, "")
    }

    /// JSON Schema rendering, used for tool `input_schema` declarations.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in self.fields {
            let mut prop = type_json_schema(&field.ty);
            if let Value::Object(ref mut obj) = prop {
                obj.insert("description".into(), Value::String(field.description.into()));
            }
            properties.insert(field.name.to_string(), prop);
            if !field.optional {
                required.push(Value::String(field.name.to_string()));
            }
        }
        json!({
            "type": "object",
            "description": self.description,
            "properties": properties,
            "required": required,
        })
    }

    /// A literal example of the expected JSON shape, embedded verbatim in prompts.
    pub fn example_json(&self) -> String {
        serde_json::to_string_pretty(&self.example_value()).unwrap_or_else(|_| "{}".to_string())
    }

    fn example_value(&self) -> Value {
        let mut obj = Map::new();
        for field in self.fields {
            obj.insert(field.name.to_string(), type_example(&field.ty));
        }
        Value::Object(obj)
    }

    /// One line per field: `- name (type[, optional]): description`, nested records indented.
    pub fn field_guide(&self) -> String {
        let mut out = String::new();
        write_guide(self, 0, &mut out);
        out.trim_end().to_string()
    }
}

fn verify_type(schema: &'static str, field: &'static str, ty: &FieldType) -> Result<(), SchemaDefect> {
    match ty {
        FieldType::Enum(variants) if variants.is_empty() => {
            Err(SchemaDefect::EmptyEnum { schema, field })
        }
        FieldType::Array(inner) => verify_type(schema, field, inner),
        FieldType::Record(nested) => nested.verify(),
        _ => Ok(()),
    }
}

fn write_guide(schema: &Schema, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for field in schema.fields {
        let optional = if field.optional { ", optional" } else { "" };
        out.push_str(&format!(
            "{indent}- {} ({}{optional}): {}\n",
            field.name,
            type_label(&field.ty),
            field.description
        ));
        match field.ty {
            FieldType::Record(nested) => write_guide(nested, depth + 1, out),
            FieldType::Array(FieldType::Record(nested)) => write_guide(nested, depth + 1, out),
            _ => {}
        }
    }
}

fn type_label(ty: &FieldType) -> String {
    match ty {
        FieldType::String => "string".to_string(),
        FieldType::Number { min, max } => format!("number {min}-{max}"),
        FieldType::Enum(variants) => format!("one of {}", variants.join("|")),
        FieldType::Array(inner) => format!("array of {}", type_label(inner)),
        FieldType::Record(nested) => format!("object {}", nested.name),
    }
}

fn type_json_schema(ty: &FieldType) -> Value {
    match ty {
        FieldType::String => json!({ "type": "string" }),
        FieldType::Number { min, max } => json!({ "type": "number", "minimum": min, "maximum": max }),
        FieldType::Enum(variants) => json!({ "type": "string", "enum": variants }),
        FieldType::Array(inner) => json!({ "type": "array", "items": type_json_schema(inner) }),
        FieldType::Record(nested) => nested.json_schema(),
    }
}

fn type_example(ty: &FieldType) -> Value {
    match ty {
        FieldType::String => Value::String("...".into()),
        FieldType::Number { min, .. } => json!(*min as i64),
        FieldType::Enum(variants) => Value::String(variants.first().copied().unwrap_or("").into()),
        FieldType::Array(inner) => Value::Array(vec![type_example(inner)]),
        FieldType::Record(nested) => nested.example_value(),
    }
}

fn empty_value(ty: &FieldType) -> Option<Value> {
    match ty {
        FieldType::String => Some(Value::String(String::new())),
        FieldType::Array(_) => Some(Value::Array(vec![])),
        _ => None,
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn join_path(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        child.to_string()
    } else {
        format!("{parent}.{child}")
    }
}

fn coerce_record(schema: &Schema, value: Value, path: &str) -> Result<Value, SchemaViolation> {
    let mut input = match value {
        Value::Object(map) => map,
        other => {
            return Err(SchemaViolation::WrongType {
                path: if path.is_empty() { "$".to_string() } else { path.to_string() },
                expected: format!("object {}", schema.name),
                found: describe(&other).to_string(),
            })
        }
    };

    let mut out = Map::new();
    for field in schema.fields {
        let field_path = join_path(path, field.name);
        let raw = input.remove(field.name).unwrap_or(Value::Null);
        let coerced = match raw {
            Value::Null if field.optional => match empty_value(&field.ty) {
                Some(empty) => empty,
                None => continue,
            },
            // Lists the model left out are treated as empty rather than missing.
            Value::Null if matches!(field.ty, FieldType::Array(_)) => Value::Array(vec![]),
            Value::Null => return Err(SchemaViolation::Missing { path: field_path }),
            raw => coerce_value(&field.ty, raw, &field_path)?,
        };
        out.insert(field.name.to_string(), coerced);
    }
    Ok(Value::Object(out))
}

fn coerce_value(ty: &FieldType, value: Value, path: &str) -> Result<Value, SchemaViolation> {
    match (ty, value) {
        (FieldType::String, Value::String(s)) => Ok(Value::String(s)),
        (FieldType::String, Value::Number(n)) => Ok(Value::String(n.to_string())),
        (FieldType::String, Value::Bool(b)) => Ok(Value::String(b.to_string())),

        (FieldType::Number { min, max }, value) => {
            let n = match &value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
                _ => None,
            };
            match n.filter(|n| n.is_finite()) {
                Some(n) => {
                    let clamped = n.clamp(*min, *max).round();
                    Ok(Value::Number(Number::from(clamped as i64)))
                }
                None => Err(SchemaViolation::WrongType {
                    path: path.to_string(),
                    expected: "number".to_string(),
                    found: describe(&value).to_string(),
                }),
            }
        }

        (FieldType::Enum(variants), Value::String(s)) => {
            let normalized = s.trim().to_lowercase();
            match variants.iter().find(|v| v.to_lowercase() == normalized) {
                Some(v) => Ok(Value::String((*v).to_string())),
                None => Err(SchemaViolation::NotInEnum {
                    path: path.to_string(),
                    value: s,
                    allowed: variants.iter().map(|v| v.to_string()).collect(),
                }),
            }
        }

        (FieldType::Array(inner), Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| coerce_value(inner, item, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        // A lone string where a list of strings is expected becomes a one-element list.
        (FieldType::Array(FieldType::String), Value::String(s)) => {
            Ok(Value::Array(vec![Value::String(s)]))
        }

        (FieldType::Record(nested), Value::Object(map)) => {
            coerce_record(nested, Value::Object(map), path)
        }
        // The model sometimes encodes a nested record as a JSON string; parse it once.
        (FieldType::Record(nested), Value::String(s)) => {
            let text = crate::llm_client::strip_json_fences(&s);
            let parsed: Value =
                serde_json::from_str(text).map_err(|e| SchemaViolation::NestedPayload {
                    path: path.to_string(),
                    message: e.to_string(),
                })?;
            if !parsed.is_object() {
                return Err(SchemaViolation::NestedPayload {
                    path: path.to_string(),
                    message: format!("expected a JSON object, found {}", describe(&parsed)),
                });
            }
            coerce_record(nested, parsed, path)
        }

        (ty, other) => Err(SchemaViolation::WrongType {
            path: path.to_string(),
            expected: type_label(ty),
            found: describe(&other).to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEM: Schema = Schema {
        name: "Item",
        description: "An item.",
        fields: &[
            Field { name: "label", ty: FieldType::String, description: "Label.", optional: false },
            Field { name: "url", ty: FieldType::String, description: "Link.", optional: true },
        ],
    };

    const OUTER: Schema = Schema {
        name: "Outer",
        description: "Outer record.",
        fields: &[
            Field {
                name: "score",
                ty: FieldType::Number { min: 0.0, max: 100.0 },
                description: "Score.",
                optional: false,
            },
            Field {
                name: "items",
                ty: FieldType::Array(&FieldType::Record(&ITEM)),
                description: "Items.",
                optional: false,
            },
            Field {
                name: "nested",
                ty: FieldType::Record(&ITEM),
                description: "Nested item.",
                optional: true,
            },
            Field {
                name: "mood",
                ty: FieldType::Enum(&["calm", "loud"]),
                description: "Mood.",
                optional: true,
            },
        ],
    };

    const BROKEN: Schema = Schema {
        name: "Broken",
        description: "Has an undocumented field.",
        fields: &[Field { name: "x", ty: FieldType::String, description: " ", optional: false }],
    };

    #[test]
    fn test_verify_accepts_well_formed_schema() {
        assert!(OUTER.verify().is_ok());
    }

    #[test]
    fn test_verify_rejects_missing_field_description() {
        assert_eq!(
            BROKEN.verify(),
            Err(SchemaDefect::MissingFieldDescription { schema: "Broken", field: "x" })
        );
    }

    #[test]
    fn test_score_is_clamped_and_rounded() {
        let v = OUTER
            .validate_and_coerce(json!({"score": 140.6, "items": []}))
            .unwrap();
        assert_eq!(v["score"], json!(100));

        let v = OUTER
            .validate_and_coerce(json!({"score": "72.4%", "items": []}))
            .unwrap();
        assert_eq!(v["score"], json!(72));
    }

    #[test]
    fn test_non_numeric_score_is_rejected() {
        let err = OUTER
            .validate_and_coerce(json!({"score": "high", "items": []}))
            .unwrap_err();
        assert!(matches!(err, SchemaViolation::WrongType { ref path, .. } if path == "score"));
    }

    #[test]
    fn test_optional_string_becomes_empty() {
        let v = OUTER
            .validate_and_coerce(json!({"score": 1, "items": [{"label": "a"}]}))
            .unwrap();
        assert_eq!(v["items"][0]["url"], json!(""));
        assert!(v.get("nested").is_none());
    }

    #[test]
    fn test_missing_array_becomes_empty() {
        let v = OUTER.validate_and_coerce(json!({"score": 1})).unwrap();
        assert_eq!(v["items"], json!([]));
    }

    #[test]
    fn test_missing_required_nested_field_reports_path() {
        let err = OUTER
            .validate_and_coerce(json!({"score": 1, "items": [{"url": "x"}]}))
            .unwrap_err();
        assert_eq!(err, SchemaViolation::Missing { path: "items[0].label".into() });
    }

    #[test]
    fn test_nested_record_encoded_as_string_is_parsed() {
        let v = OUTER
            .validate_and_coerce(json!({"score": 1, "nested": "{\"label\": \"inner\"}"}))
            .unwrap();
        assert_eq!(v["nested"]["label"], json!("inner"));
    }

    #[test]
    fn test_nested_record_with_invalid_json_is_nested_payload_error() {
        let err = OUTER
            .validate_and_coerce(json!({"score": 1, "nested": "{label: oops"}))
            .unwrap_err();
        assert!(matches!(err, SchemaViolation::NestedPayload { ref path, .. } if path == "nested"));
    }

    #[test]
    fn test_enum_matches_case_insensitively() {
        let v = OUTER
            .validate_and_coerce(json!({"score": 1, "mood": "LOUD"}))
            .unwrap();
        assert_eq!(v["mood"], json!("loud"));

        let err = OUTER
            .validate_and_coerce(json!({"score": 1, "mood": "angry"}))
            .unwrap_err();
        assert!(matches!(err, SchemaViolation::NotInEnum { .. }));
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let v = OUTER
            .validate_and_coerce(json!({"score": 1, "extra": true}))
            .unwrap();
        assert!(v.get("extra").is_none());
    }

    #[test]
    fn test_json_schema_lists_required_fields() {
        let s = OUTER.json_schema();
        assert_eq!(s["type"], "object");
        assert_eq!(s["required"], json!(["score", "items"]));
        assert_eq!(s["properties"]["score"]["maximum"], json!(100.0));
        assert_eq!(s["properties"]["items"]["items"]["properties"]["label"]["description"], "Label.");
    }

    #[test]
    fn test_field_guide_indents_nested_records() {
        let guide = OUTER.field_guide();
        assert!(guide.contains("- score (number 0-100): Score."));
        assert!(guide.contains("  - label (string): Label."));
        assert!(guide.contains("- mood (one of calm|loud, optional): Mood."));
    }

    #[test]
    fn test_example_json_contains_every_field() {
        let example: Value = serde_json::from_str(&OUTER.example_json()).unwrap();
        for field in OUTER.fields {
            assert!(example.get(field.name).is_some(), "missing {}", field.name);
        }
    }
}
