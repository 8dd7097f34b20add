//! Matching pipeline: orchestrates one matching request.
//!
//! Flow: extract → select → build prompt → score → parse → filter → join.
//!
//! Each stage consumes its predecessor's output whole and returns a fresh
//! collection. The snapshot is only read.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::matching::extractor::extract_programs;
use crate::matching::joiner::{join_candidates, join_scored};
use crate::matching::models::{MatchResult, SourceDocument};
use crate::matching::parser::{filter_by_threshold, parse_scored_matches};
use crate::matching::prompts::{build_matching_prompt, PROMPT_VERSION};
use crate::matching::scorer::MatchScorer;
use crate::matching::selector::select_candidates;
use crate::models::user::UserProfile;

/// Candidates returned unscored when the model response yields no triples.
pub const FALLBACK_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    /// `fallback` is set when the model output was unusable and the first
    /// candidates were returned unscored instead.
    Matched {
        programs: Vec<MatchResult>,
        fallback: bool,
    },
    NoResults,
}

/// Runs the matching pipeline for one profile against the snapshot.
///
/// The scorer is not invoked when no candidate falls in the user's categories.
/// Scorer failures surface as `AppError::Llm`; unparseable output does not.
pub async fn match_programs(
    scorer: &dyn MatchScorer,
    source: &SourceDocument,
    profile: &UserProfile,
) -> Result<MatchOutcome, AppError> {
    // Step 1-2: Extract and select
    let extracted = extract_programs(source);
    let candidates = select_candidates(profile, &extracted);

    if candidates.is_empty() {
        warn!(
            "No support programs in categories [{}] for user {}",
            profile.category_list(),
            profile.id
        );
        return Ok(MatchOutcome::NoResults);
    }
    info!(
        "Selected {} candidates for user {} in [{}]",
        candidates.len(),
        profile.id,
        profile.category_list()
    );

    // Step 3-4: Prompt and score
    let prompt = build_matching_prompt(profile, candidates.candidates());
    info!(
        "Scoring with {} (prompt {}, {} chars)",
        scorer.backend(),
        PROMPT_VERSION,
        prompt.chars().count()
    );
    let response = scorer.score(&prompt).await?;

    // Step 5: Parse
    let parsed = parse_scored_matches(&response);
    if parsed.is_empty() {
        info!(
            "No scored entries in model response; returning first {} candidates",
            FALLBACK_COUNT
        );
        let programs = join_candidates(source, candidates.head(FALLBACK_COUNT));
        return Ok(if programs.is_empty() {
            MatchOutcome::NoResults
        } else {
            MatchOutcome::Matched {
                programs,
                fallback: true,
            }
        });
    }

    // Step 6-7: Filter and join
    let parsed_count = parsed.len();
    let kept = filter_by_threshold(parsed);
    let programs = join_scored(source, &kept);
    info!(
        "Parsed {} scored entries, {} above threshold, {} joined for user {}",
        parsed_count,
        kept.len(),
        programs.len(),
        profile.id
    );

    if programs.is_empty() {
        return Ok(MatchOutcome::NoResults);
    }
    Ok(MatchOutcome::Matched {
        programs,
        fallback: false,
    })
}
