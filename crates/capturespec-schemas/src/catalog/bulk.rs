//! Bulk (`bulk`) request envelope
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::catalog::common::flag;
use crate::rules::{field, FieldDescriptor, FieldRule};
use crate::schema::Schema;
use std::sync::Arc;

/// Largest number of screenshot requests one bulk call may carry
pub const MAX_BULK_REQUESTS: usize = 20;

/// Envelope fields; every entry of `requests` is a full screenshot request
pub(crate) fn bulk_fields(request: Arc<Schema>) -> Vec<FieldDescriptor> {
    vec![
        field("optimize", flag(false)),
        field("execute", flag(false)),
        field("options", FieldRule::object()),
        field(
            "requests",
            FieldRule::array_of(FieldRule::nested(request)).length(1, MAX_BULK_REQUESTS),
        ),
    ]
}
