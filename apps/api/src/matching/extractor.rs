//! Program Extractor: reduces the snapshot to the fields the model sees.

use std::collections::HashMap;

use crate::matching::models::{str_field, ProgramDigest, SourceDocument, FIELD_NAME, FIELD_SUMMARY};

/// Category name -> digests in source array order.
pub type ExtractedPrograms = HashMap<String, Vec<ProgramDigest>>;

/// Keeps name, summary and array position for every record of every category.
/// Missing or non-string fields become empty strings.
pub fn extract_programs(source: &SourceDocument) -> ExtractedPrograms {
    source
        .categories()
        .map(|(category, records)| {
            let digests = records
                .iter()
                .enumerate()
                .map(|(original_index, record)| ProgramDigest {
                    name: str_field(record, FIELD_NAME).unwrap_or_default().to_string(),
                    summary: str_field(record, FIELD_SUMMARY)
                        .unwrap_or_default()
                        .to_string(),
                    original_index,
                })
                .collect();
            (category.to_string(), digests)
        })
        .collect()
}
