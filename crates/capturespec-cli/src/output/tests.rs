// Tests for output formatting
//
// A shared buffer stands in for stdout so the written text can be inspected.

use super::*;
use capturespec_schemas::ErrorKind;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let writer = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (writer, buffer)
}

fn sample_errors() -> ValidationErrors {
    ValidationErrors::from(vec![
        Violation::new("$.cache_ttl", "\"cache_ttl\" is not allowed", ErrorKind::UnexpectedField),
        Violation::new("$", "\"value\" must contain at least one of [html, url, markdown]", ErrorKind::MissingRequiredGroup),
    ])
}

#[test]
fn test_validation_errors_formatting_human() {
    let formatted = OutputFormat::Human.format_validation_errors(&sample_errors()).unwrap();
    assert!(formatted.contains("2 Violation(s)"));
    assert!(formatted.contains("1. $.cache_ttl [unexpected_field] \"cache_ttl\" is not allowed"));
    assert!(formatted.contains("2. $ [missing_required_group]"));
}

#[test]
fn test_validation_errors_formatting_json() {
    let formatted = OutputFormat::Json.format_validation_errors(&sample_errors()).unwrap();
    let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();
    assert_eq!(value["violations"][0]["path"], "$.cache_ttl");
    assert_eq!(value["violations"].as_array().unwrap().len(), 2);
}

#[test]
fn test_messages_suppressed_for_machine_formats() {
    let (mut out, buffer) = writer(OutputFormat::Json, false);
    out.info("checking").unwrap();
    out.success("ok").unwrap();
    out.error("bad").unwrap();
    out.violations(&sample_errors()).unwrap();
    out.data(&serde_json::json!({"valid": true})).unwrap();
    assert_eq!(buffer.contents(), "{\"valid\":true}\n");
}

#[test]
fn test_quiet_keeps_errors() {
    let (mut out, buffer) = writer(OutputFormat::Human, true);
    out.info("checking").unwrap();
    out.success("ok").unwrap();
    out.error("bad").unwrap();
    assert_eq!(buffer.contents(), "ERROR: bad\n");
}

#[test]
fn test_table_alignment() {
    let (mut out, buffer) = writer(OutputFormat::Human, false);
    out.table(
        &["VARIANT", "FIELDS"],
        vec![
            vec!["take.get".to_string(), "120".to_string()],
            vec!["bulk.post".to_string(), "6".to_string()],
        ],
    )
    .unwrap();

    let contents = buffer.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "VARIANT   │ FIELDS");
    assert_eq!(lines[2], "take.get  │ 120");
    assert_eq!(lines[3], "bulk.post │ 6");
}

#[test]
fn test_yaml_data() {
    let (mut out, buffer) = writer(OutputFormat::Yaml, false);
    out.data(&serde_json::json!({"variant": "take.get"})).unwrap();
    assert_eq!(buffer.contents(), "variant: take.get\n");
}
