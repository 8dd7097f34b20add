//! Result Parser and Threshold Filter.
//!
//! The model answers in free text. The parser walks it line by line and
//! fills three slots (name, score, rationale); a triple is emitted the moment
//! all three are filled, and the slots are cleared right after. A name marker
//! arriving while a record is still partial discards that partial record, so
//! no emitted triple mixes lines from two candidates.
//!
//! Nothing here returns an error: malformed text just yields fewer triples.

use tracing::debug;

use crate::matching::models::ScoredMatch;
use crate::matching::prompts::{
    NAME_DELIMITER, RATIONALE_MARKER, SCORE_MARKER, SCORE_SLOT_WIDTH, SCORE_THRESHOLD,
};

#[derive(Debug, Default)]
struct Slots {
    name: Option<String>,
    score: Option<String>,
    rationale: Option<String>,
}

impl Slots {
    fn is_pending(&self) -> bool {
        self.name.is_some() || self.score.is_some() || self.rationale.is_some()
    }

    fn take_complete(&mut self) -> Option<ScoredMatch> {
        if self.name.is_none() || self.score.is_none() || self.rationale.is_none() {
            return None;
        }
        let slots = std::mem::take(self);
        Some(ScoredMatch {
            name: slots.name?,
            score: slots.score?,
            rationale: slots.rationale?,
        })
    }
}

/// What a single response line contributes to the pending record.
#[derive(Debug, PartialEq)]
enum LineKind {
    Name(String),
    Score(String),
    Rationale(String),
    Other,
}

/// Classifies one line. A line opening with a score or rationale marker is a
/// field line even when the model bolds it (`- **점수**: 09점`); only other
/// lines carrying the delimiter are name markers.
fn classify(line: &str) -> LineKind {
    let plain = line.replace(NAME_DELIMITER, "");
    let plain = plain.trim();

    let opens_field =
        plain.starts_with(SCORE_MARKER) || plain.starts_with(RATIONALE_MARKER);
    if !opens_field && line.contains(NAME_DELIMITER) {
        let name = line.trim().trim_matches('*').trim();
        return if name.is_empty() {
            LineKind::Other
        } else {
            LineKind::Name(name.to_string())
        };
    }

    if let Some(pos) = plain.find(SCORE_MARKER) {
        let slot = read_score_slot(&plain[pos + SCORE_MARKER.len()..]);
        if slot.is_empty() {
            LineKind::Other
        } else {
            LineKind::Score(slot)
        }
    } else if plain.contains(RATIONALE_MARKER) {
        LineKind::Rationale(plain.to_string())
    } else {
        LineKind::Other
    }
}

/// Parses the model response into scored triples, in response order.
pub fn parse_scored_matches(response: &str) -> Vec<ScoredMatch> {
    let mut matches = Vec::new();
    let mut slots = Slots::default();

    for line in response.trim().lines() {
        match classify(line) {
            LineKind::Name(name) => {
                if slots.is_pending() {
                    debug!("Dropping incomplete record before {name:?}: {slots:?}");
                }
                slots = Slots {
                    name: Some(name),
                    ..Slots::default()
                };
            }
            LineKind::Score(slot) => slots.score = Some(slot),
            LineKind::Rationale(text) => slots.rationale = Some(text),
            LineKind::Other => {}
        }

        if let Some(scored) = slots.take_complete() {
            matches.push(scored);
        }
    }

    matches
}

/// Fixed-width slot after the score marker, skipping separators like `": "`.
fn read_score_slot(rest: &str) -> String {
    rest.trim_start_matches(|c: char| c.is_whitespace() || c == ':')
        .chars()
        .take(SCORE_SLOT_WIDTH)
        .collect::<String>()
        .trim_end()
        .to_string()
}

/// True iff the leading two characters of the score parse to more than the threshold.
pub fn passes_threshold(scored: &ScoredMatch) -> bool {
    scored
        .score_value()
        .is_some_and(|value| value > SCORE_THRESHOLD)
}

/// Keeps the triples that pass the threshold, logging the ones that do not.
pub fn filter_by_threshold(matches: Vec<ScoredMatch>) -> Vec<ScoredMatch> {
    matches
        .into_iter()
        .filter(|scored| {
            let keep = passes_threshold(scored);
            if !keep {
                debug!(
                    "Not recommending {:?} (score {:?}): {}",
                    scored.name, scored.score, scored.rationale
                );
            }
            keep
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(score: &str) -> ScoredMatch {
        ScoredMatch {
            name: "X".to_string(),
            score: score.to_string(),
            rationale: "- 분석 r".to_string(),
        }
    }

    #[test]
    fn test_parses_single_block() {
        let matches = parse_scored_matches("**ProgramX**\n- 점수 09점\n- 분석 good fit\n");
        assert_eq!(
            matches,
            vec![ScoredMatch {
                name: "ProgramX".to_string(),
                score: "09점".to_string(),
                rationale: "- 분석 good fit".to_string(),
            }]
        );
        assert_eq!(matches[0].score_value(), Some(9));
        assert!(passes_threshold(&matches[0]));
    }

    #[test]
    fn test_parses_multiple_blocks_in_order() {
        let response = "\
**A 지원사업**
- 점수 08점
- 분석 분야 일치

**B 지원사업**
- 점수 03점
- 분석 관련성 낮음
";
        let matches = parse_scored_matches(response);
        let names: Vec<&str> = matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A 지원사업", "B 지원사업"]);
        assert_eq!(matches[1].score, "03점");
    }

    #[test]
    fn test_score_with_colon_separator() {
        let matches = parse_scored_matches("**A**\n- 점수: 10점\n- 분석: 최적\n");
        assert_eq!(matches[0].score, "10점");
        assert_eq!(matches[0].score_value(), Some(10));
    }

    #[test]
    fn test_missing_rationale_does_not_leak_into_next_block() {
        let response = "\
**A**
- 점수 09점
**B**
- 점수 02점
- 분석 B only
";
        let matches = parse_scored_matches(response);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "B");
        assert_eq!(matches[0].score, "02점");
    }

    #[test]
    fn test_missing_score_does_not_borrow_next_score() {
        let response = "\
**A**
- 분석 A rationale
**B**
- 점수 09점
- 분석 B rationale
";
        let matches = parse_scored_matches(response);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "B");
        assert_eq!(matches[0].rationale, "- 분석 B rationale");
    }

    #[test]
    fn test_bolded_field_labels_are_not_names() {
        let response = "**AI 바우처**\n- **점수**: 09점\n- **분석**: 사업 내용과 일치\n";
        let matches = parse_scored_matches(response);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "AI 바우처");
        assert_eq!(matches[0].score, "09점");
        assert_eq!(matches[0].rationale, "- 분석: 사업 내용과 일치");
    }

    #[test]
    fn test_classify_line_kinds() {
        assert_eq!(classify("**ProgramX**"), LineKind::Name("ProgramX".into()));
        assert_eq!(classify("- 점수 10점"), LineKind::Score("10점".into()));
        assert_eq!(classify("- **점수** 08점"), LineKind::Score("08점".into()));
        assert_eq!(
            classify("  - 분석 good fit"),
            LineKind::Rationale("- 분석 good fit".into())
        );
        assert_eq!(classify("****"), LineKind::Other);
        assert_eq!(classify("참고 사항"), LineKind::Other);
    }

    #[test]
    fn test_slots_cleared_after_emission() {
        // Second block repeats only the name and rationale; it must not reuse A's score.
        let response = "**A**\n- 점수 09점\n- 분석 a\n**B**\n- 분석 b\n";
        let matches = parse_scored_matches(response);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "A");
    }

    #[test]
    fn test_empty_and_unformatted_responses_yield_nothing() {
        assert!(parse_scored_matches("").is_empty());
        assert!(parse_scored_matches("   \n\n").is_empty());
        assert!(parse_scored_matches("적합한 지원사업이 없습니다.").is_empty());
        assert!(parse_scored_matches("A : 8/10\nB : 3/10").is_empty());
    }

    #[test]
    fn test_truncated_response_drops_last_partial_block() {
        let response = "**A**\n- 점수 09점\n- 분석 ok\n**B**\n- 점";
        let matches = parse_scored_matches(response);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "A");
    }

    #[test]
    fn test_crlf_line_endings() {
        let matches = parse_scored_matches("**A**\r\n- 점수 08점\r\n- 분석 ok\r\n");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "A");
        assert_eq!(matches[0].rationale, "- 분석 ok");
    }

    #[test]
    fn test_threshold_is_strictly_greater_than_seven() {
        assert!(!passes_threshold(&scored("07")));
        assert!(passes_threshold(&scored("08")));
        assert!(!passes_threshold(&scored("00점")));
        assert!(passes_threshold(&scored("10점")));
    }

    #[test]
    fn test_threshold_fails_soft_on_non_numeric() {
        assert!(!passes_threshold(&scored("9점")));
        assert!(!passes_threshold(&scored("높음")));
        assert!(!passes_threshold(&scored("")));
    }

    #[test]
    fn test_filter_keeps_order_of_survivors() {
        let kept = filter_by_threshold(vec![
            ScoredMatch {
                name: "A".into(),
                ..scored("09")
            },
            ScoredMatch {
                name: "B".into(),
                ..scored("05")
            },
            ScoredMatch {
                name: "C".into(),
                ..scored("08")
            },
        ]);
        let names: Vec<&str> = kept.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }
}
