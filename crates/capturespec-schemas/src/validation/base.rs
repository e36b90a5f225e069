//! Validation context and path tracking
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::{ErrorKind, Rejection, ValidationErrors, Violation};
use crate::validation::ValidateOptions;

/// Location and options for one validation pass
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Current path, `$` at the root
    pub path: String,
    /// Options passed by the caller
    pub options: ValidateOptions,
}

impl ValidationContext {
    /// Create a root context
    pub fn new(options: ValidateOptions) -> Self {
        Self {
            path: "$".to_string(),
            options,
        }
    }

    /// Create a child context with updated path
    pub fn child<P: AsRef<str>>(&self, path_segment: P) -> Self {
        Self {
            path: format!("{}.{}", self.path, path_segment.as_ref()),
            options: self.options,
        }
    }

    /// Create a child context for array index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
            options: self.options,
        }
    }

    /// Label used inside messages: the path without the `$.` root marker
    pub fn label(&self) -> &str {
        match self.path.strip_prefix("$.") {
            Some(rest) => rest,
            None if self.path == "$" => "value",
            None => self.path.trim_start_matches('$'),
        }
    }

    /// Place a rejection at this context's path
    pub fn violation(&self, rejection: Rejection) -> Violation {
        Violation::new(self.path.clone(), rejection.message, rejection.code)
    }

    /// Build a violation at this path
    pub fn violation_of(&self, code: ErrorKind, message: impl Into<String>) -> Violation {
        Violation::new(self.path.clone(), message, code)
    }

    /// Whether collection must stop given what has been gathered so far
    pub fn should_stop(&self, errors: &ValidationErrors) -> bool {
        if errors.is_empty() {
            return false;
        }
        if !self.options.aggregate_all_errors {
            return true;
        }
        self.options.max_errors > 0 && errors.len() >= self.options.max_errors
    }
}
