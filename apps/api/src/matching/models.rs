//! Data shapes flowing through the matching pipeline.
//!
//! Raw announcement records stay as opaque JSON objects; only the digest and
//! output types are typed.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key of the per-category record array in registry responses.
pub const RECORDS_KEY: &str = "jsonArray";
pub const FIELD_NAME: &str = "pblancNm";
pub const FIELD_SUMMARY: &str = "bsnsSumryCn";
pub const FIELD_URL: &str = "rceptEngnHmpgUrl";
pub const FIELD_PERIOD: &str = "reqstBeginEndDe";

/// The announcement snapshot: category name -> registry response for that category.
///
/// Key order is the insertion order of the source document (serde_json is
/// built with `preserve_order`), which fixes the join scan order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceDocument(pub Map<String, Value>);

impl SourceDocument {
    /// Categories that carry a record array, in document order.
    pub fn categories(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.0.iter().filter_map(|(category, block)| {
            block
                .get(RECORDS_KEY)
                .and_then(Value::as_array)
                .map(|records| (category.as_str(), records.as_slice()))
        })
    }

    /// Raw record at `original_index` within `category`.
    pub fn record(&self, category: &str, original_index: usize) -> Option<&Value> {
        self.0
            .get(category)?
            .get(RECORDS_KEY)?
            .as_array()?
            .get(original_index)
    }

    pub fn program_count(&self) -> usize {
        self.categories().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.program_count() == 0
    }
}

/// Reads a string field from a raw record; non-strings read as absent.
pub fn str_field<'a>(record: &'a Value, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}

/// A support program reduced to what the model needs to see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDigest {
    pub name: String,
    pub summary: String,
    /// Position in the source category's record array.
    pub original_index: usize,
}

/// A digest paired with the category it was selected under. Lives for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub category: String,
    pub program: ProgramDigest,
}

/// One (name, score, rationale) triple parsed out of the model response.
///
/// `score` is the raw fixed-width score slot, e.g. `"09점"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredMatch {
    pub name: String,
    pub score: String,
    pub rationale: String,
}

impl ScoredMatch {
    /// Integer value of the leading two characters of the score slot.
    /// Anything that does not parse yields `None`.
    pub fn score_value(&self) -> Option<u8> {
        let prefix: String = self.score.chars().take(2).collect();
        prefix.parse::<u8>().ok()
    }
}

/// A matched program as returned to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub name: String,
    /// Absent for fallback results, which were never scored.
    pub score: Option<u8>,
    pub analysis: Option<String>,
    #[serde(rename = "rceptEngnHmpgUrl")]
    pub url: Option<String>,
    #[serde(rename = "reqstBeginEndDe")]
    pub application_period: Option<String>,
    #[serde(rename = "bsnsSumryCn")]
    pub summary: Option<String>,
}

impl MatchResult {
    /// Builds a result from a raw record, copying the display fields.
    pub fn from_record(
        name: String,
        score: Option<u8>,
        analysis: Option<String>,
        record: &Value,
    ) -> Self {
        Self {
            name,
            score,
            analysis,
            url: str_field(record, FIELD_URL).map(str::to_string),
            application_period: str_field(record, FIELD_PERIOD).map(str::to_string),
            summary: str_field(record, FIELD_SUMMARY).map(str::to_string),
        }
    }
}
