//! Declarative field rules and the primitives they are built from
//!
//! A schema is a list of [`FieldDescriptor`]s. Each descriptor holds either
//! one [`FieldRule`] or a [`Conditional`] tree whose leaves are rules or
//! [`Branch::Forbidden`]. Conditions are plain data so the schema builder can
//! derive the resolution order from them.
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

pub mod condition;
pub mod constraint;
pub mod field;

pub use condition::Condition;
pub use constraint::{Constraint, Kind, Pattern, Predicate, Transform};
pub use field::{Branch, Conditional, DefaultValue, FieldDescriptor, FieldRule, Presence, Resolved, Rule};

/// Shorthand for [`FieldDescriptor::new`]
pub fn field(name: &str, rule: impl Into<Rule>) -> FieldDescriptor {
    FieldDescriptor::new(name, rule)
}

/// `when condition then A otherwise B`
pub fn when(condition: Condition, then: impl Into<Branch>, otherwise: impl Into<Branch>) -> Conditional {
    Conditional {
        condition,
        then: then.into(),
        otherwise: otherwise.into(),
    }
}

/// Branch that rejects the field with the default message
pub fn forbidden() -> Branch {
    Branch::Forbidden { message: None }
}

/// Branch that rejects the field with a custom message
pub fn forbidden_with(message: &str) -> Branch {
    Branch::Forbidden {
        message: Some(message.to_string()),
    }
}
