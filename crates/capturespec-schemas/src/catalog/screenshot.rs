//! Screenshot (`take`) options
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::catalog::common::flag;
use crate::rules::{field, forbidden, forbidden_with, when, Condition, FieldDescriptor, FieldRule};

/// Formats accepted by the screenshot endpoint
pub const FORMATS: [&str; 12] = [
    "png", "jpeg", "jpg", "webp", "gif", "jp2", "tiff", "avif", "heif", "html", "pdf", "markdown",
];

const QUALITY_FORMATS: [&str; 8] = ["jpeg", "jpg", "webp", "png", "tiff", "jp2", "avif", "heif"];

const PAPER_FORMATS: [&str; 10] = [
    "a0", "a1", "a2", "a3", "a4", "a5", "a6", "legal", "letter", "tabloid",
];

const OMIT_BACKGROUND_FORBIDDEN: &str = "The \"omit_background\" option is only allowed to use with image formats that support transparent backgrounds, like PNG.";
const SELECTOR_FORBIDDEN: &str = "Rendering PDFs by \"selector\" is not allowed.";

pub(crate) fn screenshot_fields() -> Vec<FieldDescriptor> {
    let mut fields = image_fields();
    fields.extend(full_page_fields());
    fields.extend(selector_fields());
    fields.extend(output_fields());
    fields
}

fn image_fields() -> Vec<FieldDescriptor> {
    vec![
        field(
            "image_quality",
            when(
                Condition::one_of("format", QUALITY_FORMATS),
                FieldRule::integer().range(0, 100).default(100),
                forbidden(),
            ),
        ),
        field("image_width", FieldRule::integer()),
        field("image_height", FieldRule::integer()),
        field(
            "omit_background",
            when(
                Condition::equals("format", "png"),
                flag(false),
                forbidden_with(OMIT_BACKGROUND_FORBIDDEN),
            ),
        ),
    ]
}

fn full_page_fields() -> Vec<FieldDescriptor> {
    vec![
        field("full_page", flag(false)),
        field(
            "full_page_scroll",
            when(Condition::equals("full_page", true), flag(true), forbidden()),
        ),
        field(
            "full_page_scroll_delay",
            when(
                Condition::equals("full_page_scroll", true),
                FieldRule::integer().min(100).default(400),
                forbidden(),
            ),
        ),
        field(
            "full_page_scroll_by",
            when(Condition::equals("full_page_scroll", true), FieldRule::integer().min(1), forbidden()),
        ),
        field(
            "full_page_max_height",
            when(Condition::equals("full_page", true), FieldRule::integer().min(1), forbidden()),
        ),
        field(
            "full_page_algorithm",
            when(
                Condition::equals("full_page", true),
                FieldRule::string().one_of(["by_sections", "default"]).default("default"),
                forbidden(),
            ),
        ),
    ]
}

fn selector_fields() -> Vec<FieldDescriptor> {
    vec![
        field(
            "capture_beyond_viewport",
            when(
                Condition::present("selector"),
                flag(true),
                FieldRule::boolean().default_ref("full_page"),
            ),
        ),
        field(
            "selector",
            when(
                Condition::equals("format", "pdf"),
                forbidden_with(SELECTOR_FORBIDDEN),
                FieldRule::string(),
            ),
        ),
        field(
            "selector_algorithm",
            when(
                Condition::present("selector"),
                FieldRule::string().one_of(["clip", "default"]).default("default"),
                forbidden(),
            ),
        ),
        field(
            "selector_scroll_into_view",
            when(Condition::present("selector"), flag(true), forbidden()),
        ),
        field("error_on_selector_not_found", flag(false)),
        field("scroll_into_view", FieldRule::string()),
        field("scroll_into_view_adjust_top", FieldRule::integer().default(0)),
    ]
}

fn output_fields() -> Vec<FieldDescriptor> {
    vec![
        field(
            "format",
            FieldRule::string().trim().lowercase().one_of(FORMATS).default("jpg"),
        ),
        field("metadata_image_size", flag(false)),
        field("clip_x", FieldRule::integer()),
        field("clip_y", FieldRule::integer()),
        field("clip_width", FieldRule::integer()),
        field("clip_height", FieldRule::integer()),
        field("vision_prompt", FieldRule::string()),
        field("vision_max_tokens", FieldRule::integer()),
        field("openai_api_key", FieldRule::string()),
        field("pdf_print_background", FieldRule::boolean()),
        field("pdf_fit_one_page", FieldRule::boolean()),
        field("pdf_landscape", FieldRule::boolean()),
        field("pdf_paper_format", FieldRule::string().one_of(PAPER_FORMATS)),
    ]
}
