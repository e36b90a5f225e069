//! Validation command handler

use super::utils::{load_variant, read_document};
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::{redaction, timing::Timer};
use crate::output::OutputWriter;
use capturespec_schemas::{validate_batch, ValidateOptions, Validated, Violation};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

/// Outcome for one request found in a document
#[derive(Debug, Serialize)]
struct RequestReport {
    file: PathBuf,
    /// Position within a document holding an array of requests
    #[serde(skip_serializing_if = "Option::is_none")]
    index: Option<usize>,
    variant: String,
    valid: bool,
    violations: Vec<Violation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    normalized: Option<Value>,
}

/// Handle the validate command
#[instrument(skip_all, fields(files = args.files.len()))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("validate_command", &format!("{} file(s)", args.files.len()));

    let variant = args
        .variant
        .clone()
        .unwrap_or_else(|| config.validation.default_variant.clone());
    let schema = load_variant(&variant)?;
    let options = effective_options(&args, config);
    debug!(variant = %variant, options = ?options, "validation options resolved");

    let mut reports = Vec::new();
    for file in &args.files {
        output.info(&format!("Validating {} against {}", file.display(), schema.name()))?;

        let document = read_document(file)?;
        let (results, indexed) = match document {
            Value::Array(requests) => (validate_batch(schema, &requests, &options), true),
            single => (vec![schema.validate(&single, &options)], false),
        };

        for (index, validated) in results.into_iter().enumerate() {
            let report = build_report(file, indexed.then_some(index), &variant, validated, &args, config);
            write_human_report(output, &report)?;
            reports.push(report);
        }
    }

    if output.format() != crate::cli::OutputFormat::Human {
        output.data(&reports)?;
    }

    let total = reports.len();
    let invalid = reports.iter().filter(|r| !r.valid).count();
    timer.finish();

    if invalid > 0 {
        warn!(invalid, total, "validation failed");
        return Err(Error::ValidationFailed { invalid, total });
    }

    info!(total, "all requests valid");
    Ok(())
}

/// Engine options from the configuration, overridden by flags
fn effective_options(args: &ValidateArgs, config: &Config) -> ValidateOptions {
    let mut options = config.validation.options();
    if args.fail_fast {
        options.aggregate_all_errors = false;
    }
    if let Some(max_errors) = args.max_errors {
        options = options.with_max_errors(max_errors);
    }
    options
}

fn build_report(
    file: &Path,
    index: Option<usize>,
    variant: &str,
    validated: Validated,
    args: &ValidateArgs,
    config: &Config,
) -> RequestReport {
    let valid = validated.is_valid();
    let normalized = (valid && args.show_normalized).then(|| {
        let mut value = Value::Object(validated.value);
        if config.output.redact {
            redaction::redact_json_value(&mut value);
        }
        value
    });

    RequestReport {
        file: file.to_path_buf(),
        index,
        variant: variant.to_string(),
        valid,
        violations: validated.errors.violations,
        normalized,
    }
}

fn write_human_report(output: &mut OutputWriter, report: &RequestReport) -> Result<()> {
    if output.format() != crate::cli::OutputFormat::Human {
        return Ok(());
    }

    let label = match report.index {
        Some(index) => format!("{}[{}]", report.file.display(), index),
        None => report.file.display().to_string(),
    };

    if report.valid {
        output.success(&format!("✓ {} is valid", label))?;
        if let Some(normalized) = &report.normalized {
            output.section("Normalized Request")?;
            output.data(normalized)?;
        }
    } else {
        output.error(&format!("✗ {} has {} violation(s)", label, report.violations.len()))?;
        output.violations(&report.violations.clone().into())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::fs;
    use tempfile::TempDir;

    fn args(files: Vec<PathBuf>, variant: Option<&str>) -> ValidateArgs {
        ValidateArgs {
            files,
            variant: variant.map(str::to_string),
            fail_fast: false,
            max_errors: None,
            show_normalized: true,
        }
    }

    fn sink() -> OutputWriter {
        OutputWriter::with_writer(OutputFormat::Json, false, true, Box::new(std::io::sink()))
    }

    #[test]
    fn test_valid_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("take.json");
        fs::write(&path, r#"{"url": "https://example.com", "access_key": "k", "signature": "s"}"#).unwrap();

        let result = handle_validate(args(vec![path], None), &Config::default(), &mut sink());
        assert!(result.is_ok(), "{result:?}");
    }

    #[test]
    fn test_invalid_requests_are_counted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.yaml");
        fs::write(
            &path,
            "- url: https://example.com\n- url: https://example.com\n  cache_ttl: 20000\n- {}\n",
        )
        .unwrap();

        let err = handle_validate(args(vec![path], Some("take.post")), &Config::default(), &mut sink()).unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { invalid: 2, total: 3 }), "{err:?}");
    }

    #[test]
    fn test_fail_fast_stops_the_batch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("batch.json");
        fs::write(&path, r#"[{"colour": "red"}, {"url": "https://example.com"}, {}]"#).unwrap();

        let mut fail_fast = args(vec![path], Some("take.post"));
        fail_fast.fail_fast = true;
        let err = handle_validate(fail_fast, &Config::default(), &mut sink()).unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { invalid: 1, total: 1 }), "{err:?}");
    }

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        config.validation.max_errors = 3;

        let mut flags = args(vec![], None);
        assert_eq!(effective_options(&flags, &config), ValidateOptions::default().with_max_errors(3));

        flags.fail_fast = true;
        flags.max_errors = Some(0);
        assert_eq!(effective_options(&flags, &config), ValidateOptions::fail_fast());
    }

    #[test]
    fn test_normalized_output_is_redacted() {
        let validated = load_variant("take.get")
            .unwrap()
            .validate(&serde_json::json!({"url": "https://example.com", "access_key": "live"}), &ValidateOptions::default());
        let flags = args(vec![], None);
        let report = build_report(Path::new("a.json"), None, "take.get", validated, &flags, &Config::default());

        let normalized = report.normalized.unwrap();
        assert_eq!(normalized["access_key"], "***");
        assert_eq!(normalized["format"], "jpg");
    }
}
