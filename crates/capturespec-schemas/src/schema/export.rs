//! JSON Schema export
//!
//! Describes the normalized form a schema accepts. Coercions (numeric and
//! boolean strings) and conditional forbids are not expressible here, so
//! the export is a superset check for clients, not a replacement for
//! [`Schema::validate`].
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::rules::{Constraint, DefaultValue, FieldRule, Kind, Presence, Rule};
use crate::schema::{ObjectConstraint, Schema};
use serde_json::{json, Map, Value};

const DRAFT: &str = "https://json-schema.org/draft/2020-12/schema";

impl Schema {
    /// Export as a draft 2020-12 JSON Schema document
    pub fn to_json_schema(&self) -> Value {
        let mut document = Map::new();
        document.insert("$schema".into(), json!(DRAFT));
        document.extend(object_schema(self));
        Value::Object(document)
    }
}

fn object_schema(schema: &Schema) -> Map<String, Value> {
    let mut out = Map::new();
    out.insert("title".into(), json!(schema.name()));
    out.insert("type".into(), json!("object"));

    let mut properties = Map::new();
    let mut required = Vec::new();
    for descriptor in schema.fields() {
        properties.insert(descriptor.name().to_string(), rule_schema(descriptor.rule()));
        if let Rule::Always(rule) = descriptor.rule() {
            if rule.presence() == Presence::Required {
                required.push(json!(descriptor.name()));
            }
        }
    }
    out.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        out.insert("required".into(), Value::Array(required));
    }
    out.insert("additionalProperties".into(), json!(false));

    let all_of: Vec<Value> = schema.constraints().iter().map(constraint_schema).collect();
    if !all_of.is_empty() {
        out.insert("allOf".into(), Value::Array(all_of));
    }
    out
}

fn constraint_schema(constraint: &ObjectConstraint) -> Value {
    match constraint {
        ObjectConstraint::ExclusivePair(a, b) => json!({ "not": { "required": [a, b] } }),
        ObjectConstraint::AtLeastOneOf(group) => {
            let any_of: Vec<Value> = group.iter().map(|f| json!({ "required": [f] })).collect();
            json!({ "anyOf": any_of })
        }
    }
}

fn rule_schema(rule: &Rule) -> Value {
    match rule {
        Rule::Always(rule) => field_schema(rule),
        Rule::When(_) => {
            let candidates = rule.candidates();
            match candidates.as_slice() {
                [] => json!(false),
                [only] => field_schema(only),
                many => json!({ "anyOf": many.iter().map(|r| field_schema(r)).collect::<Vec<_>>() }),
            }
        }
    }
}

fn field_schema(rule: &FieldRule) -> Value {
    let mut out = Map::new();
    match rule.kind() {
        Kind::Any => {}
        Kind::Object(Some(schema)) => {
            out.extend(object_schema(schema));
        }
        kind => {
            out.insert("type".into(), json!(kind.type_name()));
        }
    }
    if let Kind::Array(Some(element)) = rule.kind() {
        out.insert("items".into(), field_schema(element));
    }

    let is_string = matches!(rule.kind(), Kind::String);
    let mut has_min_length = false;
    for constraint in rule.constraints() {
        match constraint {
            Constraint::Range { min, max } => {
                if let Some(min) = min {
                    out.insert("minimum".into(), json!(min));
                }
                if let Some(max) = max {
                    out.insert("maximum".into(), json!(max));
                }
            }
            Constraint::Length { min, max } => {
                let (min_key, max_key) = if is_string {
                    ("minLength", "maxLength")
                } else {
                    ("minItems", "maxItems")
                };
                if let Some(min) = min {
                    has_min_length |= is_string;
                    out.insert(min_key.into(), json!(min));
                }
                if let Some(max) = max {
                    out.insert(max_key.into(), json!(max));
                }
            }
            Constraint::Membership(values) => {
                out.insert("enum".into(), Value::Array(values.clone()));
            }
            Constraint::Pattern(pattern) => {
                out.insert("pattern".into(), json!(pattern.source()));
            }
            Constraint::Custom(predicate) => {
                if let Some(format) = predicate.json_schema_format() {
                    out.insert("format".into(), json!(format));
                }
            }
        }
    }

    let allows_empty = rule.constraints().iter().any(Constraint::allows_empty_string);
    if is_string && !has_min_length && !allows_empty {
        out.insert("minLength".into(), json!(1));
    }

    if let Some(DefaultValue::Literal(value)) = rule.default_value() {
        out.insert("default".into(), value.clone());
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{field, forbidden, when, Condition};

    fn sample() -> Schema {
        Schema::builder("sample")
            .fields([
                field("format", FieldRule::string().one_of(["png", "jpg"]).default("jpg")),
                field("quality", when(Condition::equals("format", "jpg"), FieldRule::integer().range(0, 100), forbidden())),
                field("acl", FieldRule::string().one_of(["public-read", ""])),
                field("url", FieldRule::string()),
                field("html", FieldRule::string()),
            ])
            .at_least_one(["url", "html"])
            .exclusive("url", "html")
            .build()
            .unwrap()
    }

    #[test]
    fn test_document_shape() {
        let doc = sample().to_json_schema();
        assert_eq!(doc["$schema"], json!(DRAFT));
        assert_eq!(doc["type"], json!("object"));
        assert_eq!(doc["additionalProperties"], json!(false));
        assert_eq!(doc["properties"]["format"]["enum"], json!(["png", "jpg"]));
        assert_eq!(doc["properties"]["format"]["default"], json!("jpg"));
        assert_eq!(doc["properties"]["quality"]["type"], json!("integer"));
        assert_eq!(doc["properties"]["quality"]["maximum"], json!(100.0));
        assert_eq!(doc["properties"]["url"]["minLength"], json!(1));
        assert!(doc["properties"]["acl"].get("minLength").is_none());
    }

    #[test]
    fn test_object_constraints_exported() {
        let doc = sample().to_json_schema();
        assert_eq!(
            doc["allOf"],
            json!([
                { "anyOf": [{ "required": ["url"] }, { "required": ["html"] }] },
                { "not": { "required": ["url", "html"] } }
            ])
        );
    }
}
