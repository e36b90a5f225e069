//! Field rules, conditional branches and field descriptors
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::rules::condition::Condition;
use crate::rules::constraint::{coerce, transform, Constraint, Kind, Pattern, Predicate, Transform};
use crate::schema::Schema;
use crate::validation::base::ValidationContext;
use crate::validation::error::{ErrorKind, ValidationErrors};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Value used when a field is absent
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A fixed value
    Literal(Value),
    /// The resolved value of another field
    Ref(String),
}

/// Whether an absent field is an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Presence {
    /// May be omitted
    #[default]
    Optional,
    /// Must be supplied when this rule applies
    Required,
}

/// Validator, default and presence policy for one field
#[derive(Debug, Clone)]
pub struct FieldRule {
    kind: Kind,
    transforms: Vec<Transform>,
    constraints: Vec<Constraint>,
    default: Option<DefaultValue>,
    presence: Presence,
}

impl FieldRule {
    /// Rule for a value of the given kind
    pub fn of(kind: Kind) -> Self {
        Self {
            kind,
            transforms: Vec::new(),
            constraints: Vec::new(),
            default: None,
            presence: Presence::Optional,
        }
    }

    pub fn string() -> Self {
        Self::of(Kind::String)
    }

    pub fn number() -> Self {
        Self::of(Kind::Number)
    }

    pub fn integer() -> Self {
        Self::of(Kind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(Kind::Boolean)
    }

    /// Array with unconstrained elements
    pub fn array() -> Self {
        Self::of(Kind::Array(None))
    }

    /// Array whose elements follow `element`
    pub fn array_of(element: FieldRule) -> Self {
        Self::of(Kind::Array(Some(Box::new(element))))
    }

    /// Free-form object
    pub fn object() -> Self {
        Self::of(Kind::Object(None))
    }

    /// Object validated as a full instance of `schema`
    pub fn nested(schema: Arc<Schema>) -> Self {
        Self::of(Kind::Object(Some(schema)))
    }

    pub fn any() -> Self {
        Self::of(Kind::Any)
    }

    pub fn trim(mut self) -> Self {
        self.transforms.push(Transform::Trim);
        self
    }

    pub fn lowercase(mut self) -> Self {
        self.transforms.push(Transform::Lowercase);
        self
    }

    /// Inclusive lower bound
    pub fn min(self, min: impl Into<f64>) -> Self {
        self.constrain(Constraint::Range {
            min: Some(min.into()),
            max: None,
        })
    }

    /// Inclusive upper bound
    pub fn max(self, max: impl Into<f64>) -> Self {
        self.constrain(Constraint::Range {
            min: None,
            max: Some(max.into()),
        })
    }

    /// Inclusive bounds
    pub fn range(self, min: impl Into<f64>, max: impl Into<f64>) -> Self {
        self.constrain(Constraint::Range {
            min: Some(min.into()),
            max: Some(max.into()),
        })
    }

    /// Inclusive bounds on string length or array size
    pub fn length(self, min: usize, max: usize) -> Self {
        self.constrain(Constraint::Length {
            min: Some(min),
            max: Some(max),
        })
    }

    /// Value must be one of `values`
    pub fn one_of<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constrain(Constraint::Membership(
            values.into_iter().map(Into::into).collect(),
        ))
    }

    pub fn pattern(self, pattern: Pattern) -> Self {
        self.constrain(Constraint::Pattern(pattern))
    }

    /// Delegate to a custom predicate
    pub fn custom(self, predicate: impl Predicate + 'static) -> Self {
        self.constrain(Constraint::Custom(Arc::new(predicate)))
    }

    pub fn constrain(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Literal(value.into()));
        self
    }

    /// Default to the resolved value of `field`
    pub fn default_ref(mut self, field: &str) -> Self {
        self.default = Some(DefaultValue::Ref(field.to_string()));
        self
    }

    pub fn required(mut self) -> Self {
        self.presence = Presence::Required;
        self
    }

    pub fn kind(&self) -> &Kind {
        &self.kind
    }

    pub fn transforms(&self) -> &[Transform] {
        &self.transforms
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Validate a supplied value, pushing violations and returning the
    /// normalized value when the field is clean
    pub(crate) fn apply(
        &self,
        value: &Value,
        ctx: &ValidationContext,
        errors: &mut ValidationErrors,
    ) -> Option<Value> {
        let label = ctx.label();
        let before = errors.len();

        let mut current = match coerce(&self.kind, label, value) {
            Ok(v) => transform(&self.transforms, v),
            Err(rejection) => {
                errors.add(ctx.violation(rejection));
                return None;
            }
        };

        if matches!(self.kind, Kind::String) && current.as_str() == Some("") {
            if self.constraints.iter().any(Constraint::allows_empty_string) {
                return Some(current);
            }
            errors.add(ctx.violation_of(
                ErrorKind::MissingValue,
                format!("\"{label}\" is not allowed to be empty"),
            ));
            return None;
        }

        // Item-checked arrays are sized as supplied, before failing items drop out
        let mut counted = false;
        match (&self.kind, current) {
            (Kind::Array(Some(element)), Value::Array(items)) => {
                for constraint in &self.constraints {
                    if let Err(rejection) = constraint.check_count(label, items.len()) {
                        errors.add(ctx.violation(rejection));
                    }
                }
                counted = true;

                let mut normalized = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    if ctx.should_stop(errors) {
                        break;
                    }
                    if let Some(v) = element.apply(item, &ctx.child_index(i), errors) {
                        normalized.push(v);
                    }
                }
                current = Value::Array(normalized);
            }
            (Kind::Object(Some(schema)), nested @ Value::Object(_)) => {
                let validated = schema.validate_in(&nested, ctx);
                errors.extend(validated.errors);
                current = Value::Object(validated.value);
            }
            (_, other) => current = other,
        }

        for constraint in &self.constraints {
            if counted && matches!(constraint, Constraint::Length { .. }) {
                continue;
            }
            match constraint.check(label, current.clone()) {
                Ok(v) => current = v,
                Err(rejection) => errors.add(ctx.violation(rejection)),
            }
        }

        (errors.len() == before).then_some(current)
    }

    /// Value to fill in for an absent field
    pub(crate) fn default_for(&self, resolved: &Map<String, Value>) -> Option<Value> {
        match self.default.as_ref()? {
            DefaultValue::Literal(v) => Some(v.clone()),
            DefaultValue::Ref(field) => resolved.get(field).cloned(),
        }
    }

    fn default_ref_target(&self) -> Option<&str> {
        match &self.default {
            Some(DefaultValue::Ref(field)) => Some(field),
            _ => None,
        }
    }
}

/// Outcome of one side of a conditional
#[derive(Debug, Clone)]
pub enum Branch {
    /// The field must not be supplied
    Forbidden { message: Option<String> },
    /// The field follows this rule
    Apply(FieldRule),
    /// Decided by a further condition
    When(Box<Conditional>),
}

impl From<FieldRule> for Branch {
    fn from(rule: FieldRule) -> Self {
        Self::Apply(rule)
    }
}

impl From<Conditional> for Branch {
    fn from(conditional: Conditional) -> Self {
        Self::When(Box::new(conditional))
    }
}

/// `when condition then A otherwise B`
#[derive(Debug, Clone)]
pub struct Conditional {
    pub condition: Condition,
    pub then: Branch,
    pub otherwise: Branch,
}

/// The rule that applies to a field for one request
#[derive(Debug, Clone, Copy)]
pub enum Resolved<'a> {
    /// Supplying the field is an error, with an optional custom message
    Forbidden(Option<&'a str>),
    /// Validate against this rule
    Apply(&'a FieldRule),
}

impl Branch {
    fn resolve(&self, resolved: &Map<String, Value>) -> Resolved<'_> {
        match self {
            Self::Forbidden { message } => Resolved::Forbidden(message.as_deref()),
            Self::Apply(rule) => Resolved::Apply(rule),
            Self::When(conditional) => conditional.resolve(resolved),
        }
    }

    fn collect<'a>(&'a self, drivers: &mut Vec<&'a str>, rules: &mut Vec<&'a FieldRule>) {
        match self {
            Self::Forbidden { .. } => {}
            Self::Apply(rule) => rules.push(rule),
            Self::When(conditional) => conditional.collect(drivers, rules),
        }
    }
}

impl Conditional {
    fn resolve(&self, resolved: &Map<String, Value>) -> Resolved<'_> {
        if self.condition.evaluate(resolved) {
            self.then.resolve(resolved)
        } else {
            self.otherwise.resolve(resolved)
        }
    }

    fn collect<'a>(&'a self, drivers: &mut Vec<&'a str>, rules: &mut Vec<&'a FieldRule>) {
        drivers.push(self.condition.driver());
        self.then.collect(drivers, rules);
        self.otherwise.collect(drivers, rules);
    }
}

/// Unconditional or conditional rule of a field
#[derive(Debug, Clone)]
pub enum Rule {
    Always(FieldRule),
    When(Conditional),
}

impl From<FieldRule> for Rule {
    fn from(rule: FieldRule) -> Self {
        Self::Always(rule)
    }
}

impl From<Conditional> for Rule {
    fn from(conditional: Conditional) -> Self {
        Self::When(conditional)
    }
}

impl Rule {
    /// Pick the applicable rule given the resolved sibling values
    pub fn resolve(&self, resolved: &Map<String, Value>) -> Resolved<'_> {
        match self {
            Self::Always(rule) => Resolved::Apply(rule),
            Self::When(conditional) => conditional.resolve(resolved),
        }
    }

    /// Every rule some branch can select, in declaration order
    pub fn candidates(&self) -> Vec<&FieldRule> {
        let mut drivers = Vec::new();
        let mut rules = Vec::new();
        self.collect(&mut drivers, &mut rules);
        rules
    }

    /// Whether some branch forbids the field
    pub fn can_forbid(&self) -> bool {
        fn branch_forbids(branch: &Branch) -> bool {
            match branch {
                Branch::Forbidden { .. } => true,
                Branch::Apply(_) => false,
                Branch::When(c) => branch_forbids(&c.then) || branch_forbids(&c.otherwise),
            }
        }
        match self {
            Self::Always(_) => false,
            Self::When(c) => branch_forbids(&c.then) || branch_forbids(&c.otherwise),
        }
    }

    fn collect<'a>(&'a self, drivers: &mut Vec<&'a str>, rules: &mut Vec<&'a FieldRule>) {
        match self {
            Self::Always(rule) => rules.push(rule),
            Self::When(conditional) => conditional.collect(drivers, rules),
        }
    }
}

/// Named field with its rule
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    rule: Rule,
}

impl FieldDescriptor {
    pub fn new(name: &str, rule: impl Into<Rule>) -> Self {
        Self {
            name: name.to_string(),
            rule: rule.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    /// Fields that must resolve before this one: condition drivers and
    /// default references, without duplicates
    pub fn dependencies(&self) -> Vec<&str> {
        let mut drivers = Vec::new();
        let mut rules = Vec::new();
        self.rule.collect(&mut drivers, &mut rules);
        drivers.extend(rules.iter().filter_map(|r| r.default_ref_target()));

        let mut seen = Vec::with_capacity(drivers.len());
        for driver in drivers {
            if !seen.contains(&driver) {
                seen.push(driver);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{field, forbidden, when};
    use crate::validation::ValidateOptions;
    use serde_json::json;

    fn ctx(name: &str) -> ValidationContext {
        ValidationContext::new(ValidateOptions::default()).child(name)
    }

    #[test]
    fn test_apply_collects_all_constraint_failures() {
        let rule = FieldRule::string()
            .length(1, 3)
            .pattern(Pattern::alphanumeric().unwrap());
        let mut errors = ValidationErrors::new();
        assert!(rule.apply(&json!("ab-cd"), &ctx("cache_key"), &mut errors).is_none());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.count_of(ErrorKind::OutOfRange), 1);
        assert_eq!(errors.count_of(ErrorKind::MalformedInput), 1);
    }

    #[test]
    fn test_transforms_run_before_membership() {
        let rule = FieldRule::string().trim().lowercase().one_of(["png", "jpg"]);
        let mut errors = ValidationErrors::new();
        let value = rule.apply(&json!(" PNG "), &ctx("format"), &mut errors);
        assert_eq!(value, Some(json!("png")));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_empty_string_needs_explicit_membership() {
        let mut errors = ValidationErrors::new();
        assert!(FieldRule::string().apply(&json!(""), &ctx("html"), &mut errors).is_none());
        assert_eq!(errors.violations[0].code, ErrorKind::MissingValue);

        let acl = FieldRule::string().one_of(["public-read", ""]);
        let mut errors = ValidationErrors::new();
        assert_eq!(acl.apply(&json!(""), &ctx("storage_acl"), &mut errors), Some(json!("")));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_array_elements_are_index_labelled() {
        let rule = FieldRule::array_of(FieldRule::string().one_of(["load", "networkidle0"]));
        let mut errors = ValidationErrors::new();
        assert!(rule
            .apply(&json!(["load", "idle", 3]), &ctx("wait_until"), &mut errors)
            .is_none());
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.violations[0].path, "$.wait_until[1]");
        assert_eq!(errors.violations[0].message, "\"wait_until[1]\" must be one of [load, networkidle0]");
        assert_eq!(errors.violations[1].code, ErrorKind::TypeMismatch);
    }

    #[test]
    fn test_resolve_nested_branches() {
        let descriptor = field(
            "delay",
            when(
                Condition::equals("async", true),
                FieldRule::integer().max(600),
                when(Condition::greater_than("timeout", 30.0), FieldRule::integer().max(60), forbidden()),
            ),
        );
        assert_eq!(descriptor.dependencies(), vec!["async", "timeout"]);

        let resolved = json!({"async": false, "timeout": 10});
        let resolved = resolved.as_object().unwrap();
        assert!(matches!(descriptor.rule().resolve(resolved), Resolved::Forbidden(None)));
        assert_eq!(descriptor.rule().candidates().len(), 2);
        assert!(descriptor.rule().can_forbid());
    }

    #[test]
    fn test_default_ref_is_a_dependency() {
        let descriptor = field(
            "capture_beyond_viewport",
            when(
                Condition::present("selector"),
                FieldRule::boolean().default(true),
                FieldRule::boolean().default_ref("full_page"),
            ),
        );
        assert_eq!(descriptor.dependencies(), vec!["selector", "full_page"]);
        let resolved = json!({"full_page": true});
        let rule = descriptor.rule().candidates()[1];
        assert_eq!(rule.default_for(resolved.as_object().unwrap()), Some(json!(true)));
    }
}
