//! Describe command handler

use super::utils::load_variant;
use crate::cli::DescribeArgs;
use crate::error::Result;
use crate::output::OutputWriter;

/// Handle the describe command
///
/// Prints the variant's JSON Schema (draft 2020-12) in the selected format.
pub fn handle_describe(args: DescribeArgs, output: &mut OutputWriter) -> Result<()> {
    let schema = load_variant(&args.variant)?;
    tracing::debug!(schema = schema.name(), fields = schema.len(), "exporting schema");
    output.data(&schema.to_json_schema())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::error::Error;

    #[test]
    fn test_describe_known_and_unknown() {
        let mut output = OutputWriter::with_writer(OutputFormat::Json, false, false, Box::new(std::io::sink()));
        let args = DescribeArgs {
            variant: "bulk.post".to_string(),
        };
        assert!(handle_describe(args, &mut output).is_ok());

        let args = DescribeArgs {
            variant: "bulk.get".to_string(),
        };
        let err = handle_describe(args, &mut output).unwrap_err();
        assert!(matches!(err, Error::Catalog(_)));
    }
}
