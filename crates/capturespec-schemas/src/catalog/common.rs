//! Options shared by every capture endpoint
//!
//! Copyright (c) 2025 Capturespec Team
//! Licensed under the Apache-2.0 license

use crate::rules::{field, forbidden, forbidden_with, when, Condition, FieldDescriptor, FieldRule, Pattern};
use crate::validation::{SchemaResult, UriChecker};
use serde_json::json;

pub(crate) const WAIT_UNTIL: [&str; 4] = ["load", "domcontentloaded", "networkidle0", "networkidle2"];

const IP_COUNTRY_CODES: [&str; 18] = [
    "us", "gb", "de", "it", "fr", "cn", "ca", "es", "jp", "kr", "in", "au", "br", "mx", "nz", "pe",
    "is", "ie",
];

const BLOCK_RESOURCES: [&str; 13] = [
    "document",
    "stylesheet",
    "image",
    "media",
    "font",
    "script",
    "texttrack",
    "xhr",
    "fetch",
    "eventsource",
    "websocket",
    "manifest",
    "other",
];

const TIME_ZONES: [&str; 33] = [
    "America/Belize",
    "America/Cayman",
    "America/Chicago",
    "America/Costa_Rica",
    "America/Denver",
    "America/Edmonton",
    "America/El_Salvador",
    "America/Guatemala",
    "America/Guayaquil",
    "America/Hermosillo",
    "America/Jamaica",
    "America/Los_Angeles",
    "America/Mexico_City",
    "America/Nassau",
    "America/New_York",
    "America/Panama",
    "America/Port-au-Prince",
    "America/Santiago",
    "America/Tegucigalpa",
    "America/Tijuana",
    "America/Toronto",
    "America/Vancouver",
    "America/Winnipeg",
    "Asia/Kuala_Lumpur",
    "Asia/Shanghai",
    "Asia/Tashkent",
    "Europe/Berlin",
    "Europe/Kiev",
    "Europe/Lisbon",
    "Europe/London",
    "Europe/Madrid",
    "Pacific/Auckland",
    "Pacific/Majuro",
];

const STORAGE_CLASSES: [&str; 9] = [
    "standard",
    "reduced_redundancy",
    "standard_ia",
    "onezone_ia",
    "intelligent_tiering",
    "glacier",
    "deep_archive",
    "outposts",
    "glacier_ir",
];

/// Emulated device names accepted by `viewport_device`
pub const VIEWPORT_DEVICES: [&str; 24] = [
    "Blackberry PlayBook",
    "BlackBerry Z30",
    "Galaxy Note 3",
    "Galaxy S5",
    "Galaxy S8",
    "Galaxy S9+",
    "Galaxy Tab S4",
    "iPad",
    "iPad Mini",
    "iPad Pro",
    "iPad Pro 11",
    "iPhone 8",
    "iPhone 8 Plus",
    "iPhone SE",
    "iPhone X",
    "iPhone XR",
    "iPhone 11",
    "iPhone 11 Pro",
    "iPhone 12",
    "iPhone 13",
    "iPhone 13 Pro Max",
    "Nexus 5",
    "Pixel 2",
    "Pixel 5",
];

const CACHE_TTL_FORBIDDEN: &str =
    "The `cache_ttl` option cannot be used when the `cache` option is false or not set.";
const CACHE_KEY_FORBIDDEN: &str =
    "The `cache_key` option cannot be used when the `cache` option is false or not set.";

/// Optional string array with an empty default
pub(crate) fn string_list() -> FieldRule {
    FieldRule::array_of(FieldRule::string()).default(json!([]))
}

pub(crate) fn flag(default: bool) -> FieldRule {
    FieldRule::boolean().default(default)
}

/// Request target, rendering, blocking, caching, request, wait, webhook,
/// storage and metadata options
pub(crate) fn common_fields() -> SchemaResult<Vec<FieldDescriptor>> {
    let mut fields = target_fields();
    fields.extend(emulation_fields());
    fields.extend(blocking_fields());
    fields.extend(cache_fields()?);
    fields.extend(request_fields());
    fields.extend(wait_fields());
    fields.extend(webhook_fields()?);
    fields.extend(storage_fields());
    fields.extend(metadata_fields());
    Ok(fields)
}

fn target_fields() -> Vec<FieldDescriptor> {
    vec![
        field("url", FieldRule::string().custom(UriChecker::web())),
        field("html", FieldRule::string()),
        field("markdown", FieldRule::string()),
        field(
            "response_type",
            FieldRule::string()
                .trim()
                .lowercase()
                .one_of(["by_format", "empty", "json"])
                .default("by_format"),
        ),
        field("request_gpu_rendering", flag(false)),
        field("fail_if_gpu_rendering_fails", flag(false)),
        field("include_shadow_dom", flag(false)),
    ]
}

fn emulation_fields() -> Vec<FieldDescriptor> {
    vec![
        field("dark_mode", FieldRule::boolean()),
        field("reduced_motion", FieldRule::boolean()),
        field("media_type", FieldRule::string().trim().lowercase().one_of(["screen", "print"])),
        field("scripts", FieldRule::string()),
        field(
            "scripts_wait_until",
            FieldRule::array_of(FieldRule::string().one_of(WAIT_UNTIL)).default(json!([])),
        ),
        field("styles", FieldRule::string()),
        field("hide_selectors", FieldRule::array()),
        field("click", FieldRule::string()),
        field("error_on_click_selector_not_found", flag(true)),
        field("viewport_device", FieldRule::string().one_of(VIEWPORT_DEVICES)),
        field("viewport_width", FieldRule::integer()),
        field("viewport_height", FieldRule::integer()),
        field("device_scale_factor", FieldRule::number().range(1, 5)),
        field("viewport_mobile", FieldRule::boolean()),
        field("viewport_has_touch", FieldRule::boolean()),
        field("viewport_landscape", FieldRule::boolean()),
        field("geolocation_latitude", FieldRule::number().range(-90, 90)),
        field("geolocation_longitude", FieldRule::number().range(-180, 180)),
        field("geolocation_accuracy", FieldRule::integer().min(1)),
        field("ip_country_code", FieldRule::string().one_of(IP_COUNTRY_CODES)),
        field("servers_region", FieldRule::string().one_of(["us-east"]).default("us-east")),
    ]
}

fn blocking_fields() -> Vec<FieldDescriptor> {
    vec![
        field("block_annoyances", flag(false)),
        field("block_cookie_banners", flag(false)),
        field("block_banners_by_heuristics", flag(false)),
        field("block_chats", flag(false)),
        field("block_ads", flag(false)),
        field("block_socials", flag(false)),
        field("block_trackers", flag(false)),
        field("block_requests", string_list()),
        field(
            "block_resources",
            FieldRule::array_of(FieldRule::string().one_of(BLOCK_RESOURCES)).default(json!([])),
        ),
    ]
}

fn cache_fields() -> SchemaResult<Vec<FieldDescriptor>> {
    Ok(vec![
        field("cache", flag(false)),
        field(
            "cache_ttl",
            when(
                Condition::equals("cache", true),
                FieldRule::integer().range(14_400, 2_592_000).default(14_400),
                forbidden_with(CACHE_TTL_FORBIDDEN),
            ),
        ),
        field(
            "cache_key",
            when(
                Condition::equals("cache", true),
                FieldRule::string().pattern(Pattern::alphanumeric()?).length(1, 250),
                forbidden_with(CACHE_KEY_FORBIDDEN),
            ),
        ),
    ])
}

fn request_fields() -> Vec<FieldDescriptor> {
    vec![
        field("user_agent", FieldRule::string()),
        field("authorization", FieldRule::string()),
        field("headers", FieldRule::array()),
        field("cookies", FieldRule::array()),
        field("proxy", FieldRule::string().custom(UriChecker::with_schemes(&["http"]))),
        field("attachment_name", FieldRule::string()),
        field("bypass_csp", flag(false)),
        field("time_zone", FieldRule::string().one_of(TIME_ZONES)),
    ]
}

fn wait_fields() -> Vec<FieldDescriptor> {
    vec![
        field(
            "delay",
            when(
                Condition::greater_than("timeout", 300.0),
                FieldRule::integer().range(0, 300),
                FieldRule::integer().range(0, 30),
            ),
        ),
        field(
            "timeout",
            when(
                Condition::equals("async", true),
                FieldRule::integer().range(0, 600).default(600),
                FieldRule::integer().range(0, 90).default(60),
            ),
        ),
        field("navigation_timeout", FieldRule::integer().range(0, 30).default(30)),
        field(
            "wait_until",
            FieldRule::array_of(FieldRule::string().one_of(WAIT_UNTIL)).default(json!([])),
        ),
        field("wait_for_selector", FieldRule::string()),
        field(
            "wait_for_selector_algorithm",
            FieldRule::string()
                .one_of(["at_least_one", "at_least_by_count"])
                .default("at_least_one"),
        ),
        field("fail_if_content_contains", string_list()),
        field("fail_if_content_missing", string_list()),
        field("fail_if_request_failed", string_list()),
        field("async", flag(false)),
    ]
}

fn webhook_fields() -> SchemaResult<Vec<FieldDescriptor>> {
    Ok(vec![
        field(
            "webhook_url",
            when(
                Condition::one_of("response_type", ["json", "by_format"]),
                FieldRule::string().trim().custom(UriChecker::web()),
                forbidden(),
            ),
        ),
        field("webhook_sign", flag(true)),
        field("webhook_errors", flag(false)),
        field(
            "external_identifier",
            FieldRule::string().pattern(Pattern::alphanumeric()?).length(1, 64),
        ),
    ])
}

fn storage_fields() -> Vec<FieldDescriptor> {
    vec![
        field("store", FieldRule::boolean()),
        field("storage_bucket", FieldRule::string()),
        field(
            "storage_path",
            when(Condition::equals("store", true), FieldRule::string().required(), forbidden()),
        ),
        field("storage_endpoint", FieldRule::string().custom(UriChecker::absolute())),
        field("storage_access_key_id", FieldRule::string()),
        field("storage_secret_access_key", FieldRule::string()),
        field("storage_acl", FieldRule::string().one_of(["public-read", ""]).default("")),
        field("storage_class", FieldRule::string().one_of(STORAGE_CLASSES).default("standard")),
        field("storage_return_location", flag(false)),
        field("ignore_host_errors", flag(false)),
    ]
}

fn metadata_fields() -> Vec<FieldDescriptor> {
    vec![
        field("metadata_fonts", flag(false)),
        field("metadata_content", flag(false)),
        field("metadata_page_title", flag(false)),
        field("metadata_open_graph", flag(false)),
        field(
            "metadata_http_response_status_code",
            when(Condition::present("url"), flag(false), forbidden()),
        ),
        field(
            "metadata_http_response_headers",
            when(Condition::present("url"), flag(false), forbidden()),
        ),
        field("metadata_icon", flag(false)),
    ]
}
