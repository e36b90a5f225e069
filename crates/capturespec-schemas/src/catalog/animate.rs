//! Animation (`animate`) options
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::catalog::common::flag;
use crate::rules::{field, forbidden, when, Condition, FieldDescriptor, FieldRule};
use crate::validation::UriChecker;
use serde_json::json;

/// Formats accepted by the animation endpoint
pub const FORMATS: [&str; 5] = ["mp4", "avi", "mov", "webm", "gif"];

const SCROLL_EASINGS: [&str; 13] = [
    "linear",
    "ease_in_quad",
    "ease_out_quad",
    "ease_in_out_quad",
    "ease_in_cubic",
    "ease_out_cubic",
    "ease_in_out_cubic",
    "ease_in_quart",
    "ease_out_quart",
    "ease_in_out_quart",
    "ease_in_quint",
    "ease_out_quint",
    "ease_in_out_quint",
];

fn lowercase_choice<const N: usize>(values: [&str; N], default: &str) -> FieldRule {
    FieldRule::string().trim().lowercase().one_of(values).default(default)
}

fn gif_only_clip(name: &str) -> FieldDescriptor {
    field(
        name,
        when(Condition::equals("format", "gif"), FieldRule::integer(), forbidden()),
    )
}

pub(crate) fn animate_fields() -> Vec<FieldDescriptor> {
    let mut fields = vec![
        field("format", lowercase_choice(FORMATS, "mp4")),
        field("duration", FieldRule::number().range(1, 30).default(5)),
        field(
            "omit_background",
            when(Condition::equals("format", "mov"), flag(false), forbidden()),
        ),
        field("width", FieldRule::integer()),
        field("height", FieldRule::integer()),
        field("aspect_ratio", lowercase_choice(["4:3", "16:9"], "4:3")),
        field("scenario", lowercase_choice(["", "default", "scroll"], "default")),
    ];
    fields.extend(scroll_fields());
    fields.extend(["clip_x", "clip_y", "clip_height", "clip_width"].map(gif_only_clip));
    fields.push(field("scroll_easing", lowercase_choice(SCROLL_EASINGS, "ease_in_out_quint")));
    fields
}

fn scroll_fields() -> Vec<FieldDescriptor> {
    vec![
        field("scroll_duration", FieldRule::number().min(100).default(1500)),
        field("scroll_delay", FieldRule::number().min(0).default(500)),
        field("scroll_by", FieldRule::number().min(1).default(1000)),
        field("scroll_start_immediately", flag(true)),
        field("scroll_start_delay", FieldRule::number().min(0).default(0)),
        field("scroll_complete", flag(true)),
        field("scroll_back_after_duration", FieldRule::integer()),
        field("scroll_back", flag(true)),
        field("scroll_back_algorithm", lowercase_choice(["once", "repeat"], "once")),
        field(
            "scroll_stop_after_duration",
            when(Condition::equals("scroll_back", false), FieldRule::integer(), forbidden()),
        ),
        field("scroll_till_selector", FieldRule::string()),
        field("scroll_till_selector_adjust_top", FieldRule::integer()),
        field("scroll_try_navigate", flag(false)),
        field("scroll_navigate_after", FieldRule::integer()),
        field("scroll_navigate_to_url", FieldRule::string().custom(UriChecker::web())),
        field(
            "scroll_navigate_link_hints",
            FieldRule::array_of(FieldRule::string().trim())
                .default(json!(["pricing", "about", "customers"])),
        ),
        field(
            "scroll_to_end_after",
            when(Condition::equals("scenario", "scroll"), FieldRule::integer(), forbidden()),
        ),
    ]
}
