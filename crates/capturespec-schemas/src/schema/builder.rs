//! Layered schema composition
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::rules::FieldDescriptor;
use crate::schema::resolver::resolution_order;
use crate::schema::{ObjectConstraint, Schema};
use crate::validation::error::{SchemaError, SchemaResult};
use std::collections::HashMap;
use tracing::debug;

/// Builds a [`Schema`] from ordered layers
///
/// `fields` and `auxiliary` reject names already declared; `extend`
/// replaces a prior declaration in place or appends a new one. The first
/// composition error is kept and reported by [`SchemaBuilder::build`].
///
/// ```
/// use capturespec_schemas::rules::{field, FieldRule};
/// use capturespec_schemas::Schema;
///
/// let schema = Schema::builder("example")
///     .fields([field("url", FieldRule::string())])
///     .extend([field("url", FieldRule::string().trim())])
///     .build()
///     .unwrap();
/// assert_eq!(schema.len(), 1);
/// ```
#[derive(Debug)]
pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldDescriptor>,
    index: HashMap<String, usize>,
    constraints: Vec<ObjectConstraint>,
    error: Option<SchemaError>,
}

impl SchemaBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
            index: HashMap::new(),
            constraints: Vec::new(),
            error: None,
        }
    }

    /// Start from an existing schema's fields and constraints
    pub fn from_schema(name: &str, base: &Schema) -> Self {
        let mut builder = Self::new(name);
        builder.fields = base.fields().to_vec();
        builder.index = base
            .fields()
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name().to_string(), i))
            .collect();
        builder.constraints = base.constraints().to_vec();
        builder
    }

    /// Add new fields; a name already declared is an error
    pub fn fields<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        for descriptor in fields {
            self.insert_new(descriptor);
        }
        self
    }

    /// Add one new field
    pub fn field(self, descriptor: FieldDescriptor) -> Self {
        self.fields([descriptor])
    }

    /// Override declared fields in place or append new ones
    pub fn extend<I>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        for descriptor in fields {
            match self.index.get(descriptor.name()) {
                Some(&i) => self.fields[i] = descriptor,
                None => self.push(descriptor),
            }
        }
        self
    }

    /// Add fields every variant accepts, such as credentials
    pub fn auxiliary<I>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = FieldDescriptor>,
    {
        self.fields(fields)
    }

    /// At most one of `a` and `b` may be supplied
    pub fn exclusive(mut self, a: &str, b: &str) -> Self {
        self.constraints
            .push(ObjectConstraint::ExclusivePair(a.to_string(), b.to_string()));
        self
    }

    /// At least one of `group` must be supplied
    pub fn at_least_one<I, S>(mut self, group: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.push(ObjectConstraint::AtLeastOneOf(
            group.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Check references, compute the resolution order and freeze the schema
    pub fn build(self) -> SchemaResult<Schema> {
        if let Some(error) = self.error {
            return Err(error);
        }

        for constraint in &self.constraints {
            for name in constraint.fields() {
                if !self.index.contains_key(name) {
                    return Err(SchemaError::UnknownField {
                        schema: self.name.clone(),
                        referrer: constraint_name(constraint).to_string(),
                        field: name.to_string(),
                    });
                }
            }
        }

        let order = resolution_order(&self.name, &self.fields, &self.index)?;
        debug!(
            schema = %self.name,
            fields = self.fields.len(),
            constraints = self.constraints.len(),
            "schema built"
        );
        Ok(Schema::from_parts(
            self.name,
            self.fields,
            self.index,
            order,
            self.constraints,
        ))
    }

    fn insert_new(&mut self, descriptor: FieldDescriptor) {
        if self.index.contains_key(descriptor.name()) {
            if self.error.is_none() {
                self.error = Some(SchemaError::DuplicateField {
                    schema: self.name.clone(),
                    field: descriptor.name().to_string(),
                });
            }
            return;
        }
        self.push(descriptor);
    }

    fn push(&mut self, descriptor: FieldDescriptor) {
        self.index
            .insert(descriptor.name().to_string(), self.fields.len());
        self.fields.push(descriptor);
    }
}

fn constraint_name(constraint: &ObjectConstraint) -> &'static str {
    match constraint {
        ObjectConstraint::ExclusivePair(..) => "oxor",
        ObjectConstraint::AtLeastOneOf(_) => "or",
    }
}
