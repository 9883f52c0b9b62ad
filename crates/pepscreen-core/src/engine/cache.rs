use crate::core::sequence::ProteinSequence;
use std::collections::HashMap;

/// Per-round memo of scores keyed by sequence.
///
/// Built from the collected results after a parallel scoring pass, so workers never
/// share it while it is being filled.
#[derive(Debug, Clone)]
pub struct ScoreCache<V> {
    data: HashMap<ProteinSequence, V>,
}

impl<V> ScoreCache<V> {
    pub fn get(&self, sequence: &ProteinSequence) -> Option<&V> {
        self.data.get(sequence)
    }
}

impl<V> FromIterator<(ProteinSequence, V)> for ScoreCache<V> {
    fn from_iter<I: IntoIterator<Item = (ProteinSequence, V)>>(iter: I) -> Self {
        Self {
            data: iter.into_iter().collect(),
        }
    }
}

/// Distinct sequences among `sequences`, in first-seen order.
pub fn distinct_sequences<'s>(
    sequences: impl IntoIterator<Item = &'s ProteinSequence>,
) -> Vec<ProteinSequence> {
    let mut seen = std::collections::HashSet::new();
    sequences
        .into_iter()
        .filter(|s| seen.insert(*s))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> ProteinSequence {
        ProteinSequence::new(s).unwrap()
    }

    #[test]
    fn cache_collects_and_looks_up_by_sequence() {
        let cache: ScoreCache<f64> = vec![(seq("KQE"), 61.0), (seq("LLV"), 48.0)]
            .into_iter()
            .collect();
        assert_eq!(cache.get(&seq("KQE")), Some(&61.0));
        assert_eq!(cache.get(&seq("LLV")), Some(&48.0));
        assert_eq!(cache.get(&seq("GGG")), None);
    }

    #[test]
    fn distinct_sequences_keeps_first_occurrence_order() {
        let input = [seq("KQE"), seq("LLV"), seq("KQE"), seq("AAA")];
        let distinct = distinct_sequences(&input);
        assert_eq!(distinct, vec![seq("KQE"), seq("LLV"), seq("AAA")]);
    }
}
