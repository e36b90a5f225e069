//! Resolution order and the per-request working instance
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::rules::{FieldDescriptor, Presence, Resolved};
use crate::schema::{Schema, Validated};
use crate::validation::base::ValidationContext;
use crate::validation::error::{ErrorKind, SchemaError, SchemaResult, ValidationErrors};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Order fields so every driver and default reference resolves first.
///
/// Ties keep declaration order. Unknown references and cycles are build errors.
pub(crate) fn resolution_order(
    schema: &str,
    fields: &[FieldDescriptor],
    index: &HashMap<String, usize>,
) -> SchemaResult<Vec<usize>> {
    let mut deps: Vec<Vec<usize>> = Vec::with_capacity(fields.len());
    for descriptor in fields {
        let mut resolved = Vec::new();
        for name in descriptor.dependencies() {
            let Some(&i) = index.get(name) else {
                return Err(SchemaError::UnknownField {
                    schema: schema.to_string(),
                    referrer: descriptor.name().to_string(),
                    field: name.to_string(),
                });
            };
            resolved.push(i);
        }
        deps.push(resolved);
    }

    let mut placed = vec![false; fields.len()];
    let mut order = Vec::with_capacity(fields.len());
    while order.len() < fields.len() {
        let next = (0..fields.len()).find(|&i| !placed[i] && deps[i].iter().all(|&d| placed[d]));
        match next {
            Some(i) => {
                placed[i] = true;
                order.push(i);
            }
            None => {
                return Err(SchemaError::DependencyCycle {
                    schema: schema.to_string(),
                    fields: cycle_members(&deps, &placed)
                        .into_iter()
                        .map(|i| fields[i].name().to_string())
                        .collect(),
                });
            }
        }
    }
    Ok(order)
}

/// Unplaced fields that can reach themselves; the rest only depend on a cycle
fn cycle_members(deps: &[Vec<usize>], placed: &[bool]) -> Vec<usize> {
    (0..deps.len())
        .filter(|&start| !placed[start])
        .filter(|&start| {
            let mut stack: Vec<usize> = deps[start].clone();
            let mut seen = vec![false; deps.len()];
            while let Some(i) = stack.pop() {
                if i == start {
                    return true;
                }
                if !seen[i] && !placed[i] {
                    seen[i] = true;
                    stack.extend(deps[i].iter().copied());
                }
            }
            false
        })
        .collect()
}

/// Working copy of one request: raw input, resolved values, output, violations
pub(crate) struct RequestInstance<'s, 'r> {
    schema: &'s Schema,
    raw: &'r Map<String, Value>,
    working: Map<String, Value>,
    output: Map<String, Value>,
    errors: ValidationErrors,
}

impl<'s, 'r> RequestInstance<'s, 'r> {
    pub(crate) fn new(schema: &'s Schema, raw: &'r Map<String, Value>) -> Self {
        Self {
            schema,
            raw,
            working: Map::new(),
            output: Map::new(),
            errors: ValidationErrors::new(),
        }
    }

    pub(crate) fn run(&mut self, ctx: &ValidationContext) {
        self.resolve_fields(ctx);
        if ctx.should_stop(&self.errors) {
            return;
        }
        self.reject_unknown(ctx);
        if ctx.should_stop(&self.errors) {
            return;
        }
        self.check_object_constraints(ctx);
    }

    pub(crate) fn finish(mut self, ctx: &ValidationContext) -> Validated {
        if !ctx.options.aggregate_all_errors {
            self.errors.violations.truncate(1);
        }
        let max = ctx.options.max_errors;
        if max > 0 {
            self.errors.violations.truncate(max);
        }
        Validated {
            value: self.output,
            errors: self.errors,
        }
    }

    fn resolve_fields(&mut self, ctx: &ValidationContext) {
        let schema = self.schema;
        for &i in schema.order_indices() {
            let descriptor = schema.descriptor_at(i);
            self.resolve_field(descriptor, &ctx.child(descriptor.name()));
            if ctx.should_stop(&self.errors) {
                return;
            }
        }
    }

    fn resolve_field(&mut self, descriptor: &FieldDescriptor, ctx: &ValidationContext) {
        let name = descriptor.name();
        let supplied = self.raw.get(name);

        match (descriptor.rule().resolve(&self.working), supplied) {
            (Resolved::Forbidden(message), Some(_)) => {
                let message = message
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("\"{}\" is not allowed", ctx.label()));
                self.errors.add(ctx.violation_of(ErrorKind::UnexpectedField, message));
            }
            (Resolved::Forbidden(_), None) => {}
            (Resolved::Apply(rule), Some(raw)) => match rule.apply(raw, ctx, &mut self.errors) {
                Some(value) => {
                    self.working.insert(name.to_string(), value.clone());
                    self.output.insert(name.to_string(), value);
                }
                None => {
                    // dependents are judged against what the caller sent
                    self.working.insert(name.to_string(), raw.clone());
                }
            },
            (Resolved::Apply(rule), None) => {
                if let Some(value) = rule.default_for(&self.working) {
                    self.working.insert(name.to_string(), value.clone());
                    self.output.insert(name.to_string(), value);
                } else if rule.presence() == Presence::Required {
                    self.errors.add(ctx.violation_of(
                        ErrorKind::MissingValue,
                        format!("\"{}\" is required", ctx.label()),
                    ));
                }
            }
        }
    }

    fn reject_unknown(&mut self, ctx: &ValidationContext) {
        for key in self.raw.keys() {
            if !self.schema.contains(key) {
                let child = ctx.child(key);
                let message = format!("\"{}\" is not allowed", child.label());
                self.errors.add(child.violation_of(ErrorKind::UnexpectedField, message));
                if ctx.should_stop(&self.errors) {
                    return;
                }
            }
        }
    }

    fn check_object_constraints(&mut self, ctx: &ValidationContext) {
        for constraint in self.schema.constraints() {
            if let Some(violation) = constraint.check(self.raw, ctx) {
                self.errors.add(violation);
                if ctx.should_stop(&self.errors) {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{field, when, Condition, FieldRule};

    fn index_of(fields: &[FieldDescriptor]) -> HashMap<String, usize> {
        fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().to_string(), i))
            .collect()
    }

    #[test]
    fn test_chain_is_ordered_transitively() {
        let fields = vec![
            field(
                "full_page_scroll_delay",
                when(Condition::equals("full_page_scroll", true), FieldRule::integer(), crate::rules::forbidden()),
            ),
            field(
                "full_page_scroll",
                when(Condition::equals("full_page", true), FieldRule::boolean().default(true), crate::rules::forbidden()),
            ),
            field("full_page", FieldRule::boolean().default(false)),
        ];
        let order = resolution_order("demo", &fields, &index_of(&fields)).unwrap();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn test_independent_fields_keep_declaration_order() {
        let fields = vec![
            field("b", FieldRule::string()),
            field("a", FieldRule::string()),
            field("c", FieldRule::string()),
        ];
        let order = resolution_order("demo", &fields, &index_of(&fields)).unwrap();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn test_cycle_reports_members_only() {
        let fields = vec![
            field("a", FieldRule::boolean().default_ref("b")),
            field("b", FieldRule::boolean().default_ref("a")),
            field("c", FieldRule::boolean().default_ref("a")),
            field("d", FieldRule::boolean()),
        ];
        let err = resolution_order("demo", &fields, &index_of(&fields)).unwrap_err();
        assert_eq!(
            err,
            SchemaError::DependencyCycle {
                schema: "demo".into(),
                fields: vec!["a".into(), "b".into()],
            }
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let fields = vec![field(
            "a",
            when(Condition::present("a"), FieldRule::string(), crate::rules::forbidden()),
        )];
        assert!(matches!(
            resolution_order("demo", &fields, &index_of(&fields)),
            Err(SchemaError::DependencyCycle { .. })
        ));
    }

    #[test]
    fn test_unknown_reference() {
        let fields = vec![field("a", FieldRule::boolean().default_ref("missing"))];
        let err = resolution_order("demo", &fields, &index_of(&fields)).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownField { ref field, .. } if field == "missing"));
    }
}
