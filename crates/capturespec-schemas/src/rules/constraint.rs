//! Primitive validators: kinds, transforms and constraints
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::rules::field::FieldRule;
use crate::schema::Schema;
use crate::validation::error::{ErrorKind, Rejection, SchemaError, SchemaResult};
use regex::Regex;
use serde_json::{Number, Value};
use std::fmt;
use std::sync::Arc;

/// Largest integer a JSON client can round-trip exactly
pub const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Injected check for logic the declarative constraints cannot express
pub trait Predicate: Send + Sync + fmt::Debug {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Check a value and return its normalized form
    fn check(&self, label: &str, value: &Value) -> Result<Value, Rejection>;

    /// `format` keyword to use when exporting as JSON Schema
    fn json_schema_format(&self) -> Option<&str> {
        None
    }
}

/// JSON shape a field accepts
#[derive(Debug, Clone)]
pub enum Kind {
    /// JSON string
    String,
    /// Any finite number, strings are coerced
    Number,
    /// Integral number within the safe range, strings are coerced
    Integer,
    /// JSON boolean, `"true"`/`"false"` strings are coerced
    Boolean,
    /// JSON array, each element checked against the rule if one is given
    Array(Option<Box<FieldRule>>),
    /// JSON object, validated as a nested schema if one is given
    Object(Option<Arc<Schema>>),
    /// Anything, including `null`
    Any,
}

impl Kind {
    /// Name used in type-mismatch messages and JSON Schema export
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Any => "any",
        }
    }
}

/// String normalization applied before constraints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Remove surrounding whitespace
    Trim,
    /// Lowercase the whole value
    Lowercase,
}

impl Transform {
    fn apply(self, s: &str) -> String {
        match self {
            Self::Trim => s.trim().to_string(),
            Self::Lowercase => s.to_lowercase(),
        }
    }
}

/// A compiled regular-expression constraint
#[derive(Debug, Clone)]
pub struct Pattern {
    name: String,
    regex: Regex,
    requirement: String,
}

impl Pattern {
    /// Compile a pattern. `requirement` completes the sentence `"field" must ...`.
    pub fn new(name: &str, source: &str, requirement: &str) -> SchemaResult<Self> {
        let regex = Regex::new(source).map_err(|e| SchemaError::InvalidPattern {
            pattern: name.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            name: name.to_string(),
            regex,
            requirement: requirement.to_string(),
        })
    }

    /// ASCII letters and digits only
    pub fn alphanumeric() -> SchemaResult<Self> {
        Self::new("alphanum", "^[a-zA-Z0-9]+$", "only contain alpha-numeric characters")
    }

    /// Pattern name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Regex source
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    fn is_match(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }
}

/// Declarative check applied after type coercion and transforms
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Inclusive numeric bounds
    Range { min: Option<f64>, max: Option<f64> },
    /// Inclusive bounds on string length (chars) or array size
    Length { min: Option<usize>, max: Option<usize> },
    /// Value must equal one of these
    Membership(Vec<Value>),
    /// String must match
    Pattern(Pattern),
    /// Delegated check
    Custom(Arc<dyn Predicate>),
}

impl Constraint {
    /// Check an array size given as a count; only `Length` applies
    pub fn check_count(&self, label: &str, count: usize) -> Result<(), Rejection> {
        match self {
            Self::Length { min, max } => check_length(label, count, false, *min, *max),
            _ => Ok(()),
        }
    }

    /// Run the constraint, returning the possibly rewritten value
    pub fn check(&self, label: &str, value: Value) -> Result<Value, Rejection> {
        match self {
            Self::Range { min, max } => {
                let Some(n) = value.as_f64() else {
                    return Ok(value);
                };
                if let Some(min) = min {
                    if n < *min {
                        return Err(Rejection::new(
                            ErrorKind::OutOfRange,
                            format!("\"{label}\" must be greater than or equal to {}", format_bound(*min)),
                        ));
                    }
                }
                if let Some(max) = max {
                    if n > *max {
                        return Err(Rejection::new(
                            ErrorKind::OutOfRange,
                            format!("\"{label}\" must be less than or equal to {}", format_bound(*max)),
                        ));
                    }
                }
                Ok(value)
            }
            Self::Length { min, max } => {
                let measured = match &value {
                    Value::String(s) => Some((s.chars().count(), true)),
                    Value::Array(items) => Some((items.len(), false)),
                    _ => None,
                };
                match measured {
                    Some((len, is_string)) => check_length(label, len, is_string, *min, *max).map(|()| value),
                    None => Ok(value),
                }
            }
            Self::Membership(allowed) => {
                if allowed.iter().any(|a| values_equal(a, &value)) {
                    Ok(value)
                } else {
                    Err(Rejection::new(
                        ErrorKind::NotAMember,
                        format!("\"{label}\" must be one of [{}]", join_values(allowed)),
                    ))
                }
            }
            Self::Pattern(pattern) => {
                if value.as_str().map_or(true, |s| pattern.is_match(s)) {
                    Ok(value)
                } else {
                    Err(Rejection::new(
                        ErrorKind::MalformedInput,
                        format!("\"{label}\" must {}", pattern.requirement),
                    ))
                }
            }
            Self::Custom(predicate) => predicate.check(label, &value),
        }
    }

    /// Whether this is a membership list containing the empty string
    pub(crate) fn allows_empty_string(&self) -> bool {
        matches!(self, Self::Membership(allowed) if allowed.iter().any(|v| v.as_str() == Some("")))
    }
}

/// JSON equality that treats `1` and `1.0` as the same number
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn check_length(
    label: &str,
    len: usize,
    is_string: bool,
    min: Option<usize>,
    max: Option<usize>,
) -> Result<(), Rejection> {
    let (unit_min, unit_max, suffix) = if is_string {
        ("length must be at least", "length must be less than or equal to", "characters long")
    } else {
        ("must contain at least", "must contain less than or equal to", "items")
    };
    if let Some(min) = min {
        if len < min {
            return Err(Rejection::new(
                ErrorKind::OutOfRange,
                format!("\"{label}\" {unit_min} {min} {suffix}"),
            ));
        }
    }
    if let Some(max) = max {
        if len > max {
            return Err(Rejection::new(
                ErrorKind::OutOfRange,
                format!("\"{label}\" {unit_max} {max} {suffix}"),
            ));
        }
    }
    Ok(())
}

fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_bound(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// Number value for an f64, integral values become JSON integers
pub(crate) fn number_value(n: f64) -> Option<Value> {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Some(Value::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number)
    }
}

/// Coerce a raw value to the kind, before transforms and constraints
pub(crate) fn coerce(kind: &Kind, label: &str, value: &Value) -> Result<Value, Rejection> {
    let mismatch = |what: &str| {
        Rejection::new(ErrorKind::TypeMismatch, format!("\"{label}\" must be {what}"))
    };

    match kind {
        Kind::Any => Ok(value.clone()),
        Kind::String => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(mismatch("a string")),
        },
        Kind::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(mismatch("a boolean")),
        },
        Kind::Number | Kind::Integer => {
            let n = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
                _ => None,
            }
            .ok_or_else(|| mismatch("a number"))?;

            if matches!(kind, Kind::Number) {
                return match value {
                    Value::Number(_) => Ok(value.clone()),
                    _ => number_value(n).ok_or_else(|| mismatch("a number")),
                };
            }
            if n.fract() != 0.0 {
                return Err(mismatch("an integer"));
            }
            if n.abs() > MAX_SAFE_INTEGER {
                return Err(Rejection::new(
                    ErrorKind::OutOfRange,
                    format!("\"{label}\" must be a safe number"),
                ));
            }
            Ok(Value::from(n as i64))
        }
        Kind::Array(_) => match value {
            Value::Array(_) => Ok(value.clone()),
            _ => Err(mismatch("an array")),
        },
        Kind::Object(_) => match value {
            Value::Object(_) => Ok(value.clone()),
            _ => Err(mismatch("of type object")),
        },
    }
}

/// Apply string transforms in declaration order
pub(crate) fn transform(transforms: &[Transform], value: Value) -> Value {
    match value {
        Value::String(s) if !transforms.is_empty() => {
            Value::String(transforms.iter().fold(s, |acc, t| t.apply(&acc)))
        }
        other => other,
    }
}
