//! Record Joiner: re-attaches display fields from the full source records.

use tracing::debug;

use crate::matching::models::{
    str_field, MatchCandidate, MatchResult, ScoredMatch, SourceDocument, FIELD_NAME,
};

/// Joins each scored match to the first source record whose name equals it
/// exactly, scanning categories in document order. Misses are dropped, so the
/// output is never longer than the input.
///
/// Names are not unique in registry data; with duplicates the first record
/// found wins.
pub fn join_scored(source: &SourceDocument, matches: &[ScoredMatch]) -> Vec<MatchResult> {
    matches
        .iter()
        .filter_map(|scored| {
            let record = source.categories().find_map(|(_, records)| {
                records
                    .iter()
                    .find(|r| str_field(r, FIELD_NAME) == Some(scored.name.as_str()))
            });
            match record {
                Some(record) => Some(MatchResult::from_record(
                    scored.name.clone(),
                    scored.score_value(),
                    Some(scored.rationale.clone()),
                    record,
                )),
                None => {
                    debug!("No source record named {:?}; dropping match", scored.name);
                    None
                }
            }
        })
        .collect()
}

/// Joins unscored candidates by their `(category, original_index)` address.
pub fn join_candidates(source: &SourceDocument, candidates: &[MatchCandidate]) -> Vec<MatchResult> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let record = source.record(&candidate.category, candidate.program.original_index)?;
            Some(MatchResult::from_record(
                candidate.program.name.clone(),
                None,
                None,
                record,
            ))
        })
        .collect()
}
