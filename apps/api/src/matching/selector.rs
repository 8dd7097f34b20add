//! Candidate Selector: narrows the extracted pool to the user's categories.

use std::collections::HashMap;

use crate::matching::extractor::ExtractedPrograms;
use crate::matching::models::MatchCandidate;
use crate::models::user::UserProfile;

/// Flat candidate list plus a `(category, original_index)` lookup back into it.
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    candidates: Vec<MatchCandidate>,
    positions: HashMap<(String, usize), usize>,
}

impl CandidateSet {
    pub fn candidates(&self) -> &[MatchCandidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn lookup(&self, category: &str, original_index: usize) -> Option<&MatchCandidate> {
        self.positions
            .get(&(category.to_string(), original_index))
            .map(|&i| &self.candidates[i])
    }

    /// The first `n` candidates in selection order.
    pub fn head(&self, n: usize) -> &[MatchCandidate] {
        &self.candidates[..n.min(self.candidates.len())]
    }

    fn push(&mut self, candidate: MatchCandidate) {
        let key = (candidate.category.clone(), candidate.program.original_index);
        self.positions.insert(key, self.candidates.len());
        self.candidates.push(candidate);
    }
}

/// Appends every digest of each user category present in `extracted`, in the
/// order the categories appear in the profile. No overlap yields an empty set.
pub fn select_candidates(profile: &UserProfile, extracted: &ExtractedPrograms) -> CandidateSet {
    let mut set = CandidateSet::default();
    for category in &profile.categories {
        let Some(programs) = extracted.get(category.name()) else {
            continue;
        };
        for program in programs {
            set.push(MatchCandidate {
                category: category.name().to_string(),
                program: program.clone(),
            });
        }
    }
    set
}
