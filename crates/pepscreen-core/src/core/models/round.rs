use super::candidate::Candidate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Round {
    Generation,
    Stability,
    CrossPopulation,
}

impl Round {
    pub fn number(self) -> u8 {
        match self {
            Round::Generation => 1,
            Round::Stability => 2,
            Round::CrossPopulation => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Round::Generation => "Candidate Generation",
            Round::Stability => "Stability Filtering",
            Round::CrossPopulation => "Cross-Population Validation",
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Round {} ({})", self.number(), self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectionReason {
    // --- Round 1 ---
    RegionTooShort,
    MolecularWeight,
    Hydrophobicity,
    ForbiddenMotif,
    CysteineContent,
    Duplicate,

    // --- Round 2 ---
    BelowStabilityThreshold,
    StabilityUnavailable,

    // --- Round 3 ---
    MissingBindingData,
    RatioExceeded,
}

/// Outcome of one round: the surviving set plus attrition accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundResult {
    round: Round,
    input_count: usize,
    output_count: usize,
    rejected_count: usize,
    rejections: BTreeMap<RejectionReason, usize>,
    attempts: Option<usize>,
    shortfall: usize,
    candidates: Vec<Candidate>,
}

impl RoundResult {
    pub fn new(
        round: Round,
        input_count: usize,
        candidates: Vec<Candidate>,
        rejections: BTreeMap<RejectionReason, usize>,
    ) -> Self {
        Self {
            round,
            input_count,
            output_count: candidates.len(),
            rejected_count: rejections.values().sum(),
            rejections,
            attempts: None,
            shortfall: 0,
            candidates,
        }
    }

    /// A round that received nothing to work on.
    pub fn empty(round: Round) -> Self {
        Self::new(round, 0, Vec::new(), BTreeMap::new())
    }

    pub fn with_sampling(mut self, attempts: usize, target_count: usize) -> Self {
        self.attempts = Some(attempts);
        self.shortfall = target_count.saturating_sub(self.output_count);
        self
    }

    pub fn round(&self) -> Round {
        self.round
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected_count
    }

    pub fn rejections(&self) -> &BTreeMap<RejectionReason, usize> {
        &self.rejections
    }

    pub fn rejections_for(&self, reason: RejectionReason) -> usize {
        self.rejections.get(&reason).copied().unwrap_or(0)
    }

    /// Number of sampling attempts; only set for the generation round.
    pub fn attempts(&self) -> Option<usize> {
        self.attempts
    }

    pub fn shortfall(&self) -> usize {
        self.shortfall
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        self.candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_derived_from_contents() {
        let mut rejections = BTreeMap::new();
        rejections.insert(RejectionReason::MolecularWeight, 3);
        rejections.insert(RejectionReason::Hydrophobicity, 2);
        let result = RoundResult::new(Round::Generation, 4, Vec::new(), rejections);
        assert_eq!(result.output_count(), 0);
        assert_eq!(result.rejected_count(), 5);
        assert_eq!(result.rejections_for(RejectionReason::Hydrophobicity), 2);
        assert_eq!(result.rejections_for(RejectionReason::Duplicate), 0);
    }

    #[test]
    fn with_sampling_records_shortfall() {
        let result = RoundResult::empty(Round::Generation).with_sampling(200, 10);
        assert_eq!(result.attempts(), Some(200));
        assert_eq!(result.shortfall(), 10);
    }

    #[test]
    fn empty_round_has_zero_counts() {
        let result = RoundResult::empty(Round::CrossPopulation);
        assert_eq!(result.input_count(), 0);
        assert_eq!(result.output_count(), 0);
        assert_eq!(result.rejected_count(), 0);
        assert!(result.attempts().is_none());
    }

    #[test]
    fn display_includes_number_and_name() {
        assert_eq!(Round::Stability.to_string(), "Round 2 (Stability Filtering)");
    }
}
