//! Variants command handler

use crate::error::Result;
use crate::output::OutputWriter;
use capturespec_schemas::Catalog;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct VariantSummary {
    variant: String,
    schema: String,
    fields: usize,
    constraints: usize,
}

/// Handle the variants command
pub fn handle_variants(output: &mut OutputWriter) -> Result<()> {
    let summaries: Vec<VariantSummary> = Catalog::shared()?
        .variants()
        .map(|(id, schema)| VariantSummary {
            variant: id.to_string(),
            schema: schema.name().to_string(),
            fields: schema.len(),
            constraints: schema.constraints().len(),
        })
        .collect();

    if output.format() != crate::cli::OutputFormat::Human {
        return output.data(&summaries);
    }

    let rows = summaries
        .iter()
        .map(|s| {
            vec![
                s.variant.clone(),
                s.schema.clone(),
                s.fields.to_string(),
                s.constraints.to_string(),
            ]
        })
        .collect();
    output.table(&["VARIANT", "SCHEMA", "FIELDS", "CONSTRAINTS"], rows)
}
