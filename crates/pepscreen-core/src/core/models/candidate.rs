use super::region::{ReferenceRegion, RegionRole};
use crate::core::sequence::{AminoAcid, ProteinSequence};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single-residue substitution; `position` is zero-based, display is one-based (`L5I`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mutation {
    pub position: usize,
    pub from: AminoAcid,
    pub to: AminoAcid,
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.from, self.position + 1, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineage {
    pub source_region_id: String,
    pub source_role: RegionRole,
    pub source_species: String,
    /// Offset of the derived window within the source region.
    pub window_start: usize,
    /// Substitutions in the order they were applied, across all rounds.
    pub mutations: Vec<Mutation>,
}

impl Lineage {
    pub fn from_region(region: &ReferenceRegion, window_start: usize) -> Self {
        Self {
            source_region_id: region.id().to_string(),
            source_role: region.role(),
            source_species: region.species().to_string(),
            window_start,
            mutations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HydrophobicityScale {
    /// Mean Kyte-Doolittle hydropathy.
    Gravy,
    /// Fraction of strongly hydrophobic residues.
    HydrophobicFraction,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositionMetrics {
    pub length: usize,
    pub molecular_weight: f64,
    pub hydrophobicity: f64,
    pub hydrophobicity_scale: HydrophobicityScale,
    pub net_charge: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityMetrics {
    pub stability_temperature: f64,
    /// Temperature normalized onto 0..=1.
    pub stability_score: f64,
    /// Weight of the sequence as scored, after any protective mutations.
    pub molecular_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BindingMetrics {
    pub primary_binding_energy: f64,
    pub secondary_binding_energy: f64,
    pub cross_population_ratio: f64,
}

/// Append-only record of everything the rounds measured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub composition: Option<CompositionMetrics>,
    /// Composition re-measured after protective mutations changed the sequence.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub protected_composition: Option<CompositionMetrics>,
    pub stability: Option<StabilityMetrics>,
    pub binding: Option<BindingMetrics>,
    pub quality_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    id: String,
    sequence: ProteinSequence,
    lineage: Lineage,
    metrics: Metrics,
}

impl Candidate {
    pub fn new(
        id: impl Into<String>,
        sequence: ProteinSequence,
        lineage: Lineage,
        composition: CompositionMetrics,
    ) -> Self {
        Self {
            id: id.into(),
            sequence,
            lineage,
            metrics: Metrics {
                composition: Some(composition),
                ..Metrics::default()
            },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sequence(&self) -> &ProteinSequence {
        &self.sequence
    }

    pub fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Replaces the sequence with a same-length variant, appends the substitutions to
    /// the lineage and records the variant's composition next to the original one.
    pub fn with_mutations(
        mut self,
        sequence: ProteinSequence,
        mutations: &[Mutation],
        composition: CompositionMetrics,
    ) -> Self {
        debug_assert_eq!(sequence.len(), self.sequence.len());
        self.sequence = sequence;
        self.lineage.mutations.extend_from_slice(mutations);
        self.metrics.protected_composition = Some(composition);
        self
    }

    /// Composition of the current sequence.
    pub fn composition(&self) -> Option<&CompositionMetrics> {
        self.metrics
            .protected_composition
            .as_ref()
            .or(self.metrics.composition.as_ref())
    }

    pub fn with_stability(mut self, stability: StabilityMetrics) -> Self {
        debug_assert!(self.metrics.stability.is_none());
        self.metrics.stability.get_or_insert(stability);
        self
    }

    pub fn with_binding(mut self, binding: BindingMetrics) -> Self {
        debug_assert!(self.metrics.binding.is_none());
        self.metrics.binding.get_or_insert(binding);
        self
    }

    pub fn with_quality_score(mut self, score: f64) -> Self {
        self.metrics.quality_score.get_or_insert(score);
        self
    }

    pub fn stability_temperature(&self) -> Option<f64> {
        self.metrics.stability.map(|s| s.stability_temperature)
    }

    /// Most recent molecular weight estimate.
    pub fn molecular_weight(&self) -> Option<f64> {
        self.metrics
            .stability
            .map(|s| s.molecular_weight)
            .or(self.composition().map(|c| c.molecular_weight))
    }

    pub fn cross_population_ratio(&self) -> Option<f64> {
        self.metrics.binding.map(|b| b.cross_population_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region() -> ReferenceRegion {
        ReferenceRegion::new("THBS4_TSP", "KQEVVQIQFQ", RegionRole::SecretoryDomain, "human")
            .unwrap()
    }

    fn composition(sequence: &ProteinSequence) -> CompositionMetrics {
        CompositionMetrics {
            length: sequence.len(),
            molecular_weight: sequence.molecular_weight(),
            hydrophobicity: sequence.gravy(),
            hydrophobicity_scale: HydrophobicityScale::Gravy,
            net_charge: sequence.net_charge(),
        }
    }

    fn candidate() -> Candidate {
        let sequence = ProteinSequence::new("KQEVLQ").unwrap();
        let comp = composition(&sequence);
        Candidate::new("PEP_0001", sequence, Lineage::from_region(&region(), 2), comp)
    }

    #[test]
    fn mutation_displays_one_based_position() {
        let m = Mutation {
            position: 4,
            from: AminoAcid::Leucine,
            to: AminoAcid::Isoleucine,
        };
        assert_eq!(m.to_string(), "L5I");
    }

    #[test]
    fn new_candidate_carries_only_composition_metrics() {
        let c = candidate();
        assert!(c.metrics().composition.is_some());
        assert!(c.metrics().stability.is_none());
        assert!(c.metrics().binding.is_none());
        assert_eq!(c.lineage().source_region_id, "THBS4_TSP");
        assert_eq!(c.lineage().window_start, 2);
    }

    #[test]
    fn metrics_accumulate_without_losing_earlier_rounds() {
        let c = candidate()
            .with_stability(StabilityMetrics {
                stability_temperature: 61.0,
                stability_score: 0.52,
                molecular_weight: 700.0,
            })
            .with_binding(BindingMetrics {
                primary_binding_energy: -9.0,
                secondary_binding_energy: -8.0,
                cross_population_ratio: 1.125,
            });
        assert!(c.metrics().composition.is_some());
        assert_eq!(c.stability_temperature(), Some(61.0));
        assert_eq!(c.cross_population_ratio(), Some(1.125));
        assert_eq!(c.molecular_weight(), Some(700.0));
    }

    #[test]
    fn with_mutations_records_lineage() {
        let c = candidate();
        let mutated = c.sequence().with_substitution(4, AminoAcid::Isoleucine);
        let m = Mutation {
            position: 4,
            from: AminoAcid::Leucine,
            to: AminoAcid::Isoleucine,
        };
        let original = c.metrics().composition;
        let fresh = composition(&mutated);
        let c = c.with_mutations(mutated, &[m], fresh);
        assert_eq!(c.sequence().to_string(), "KQEVIQ");
        assert_eq!(c.lineage().mutations, vec![m]);
        assert_eq!(c.metrics().composition, original);
        assert_eq!(c.composition(), Some(&fresh));
        assert_eq!(c.molecular_weight(), Some(fresh.molecular_weight));
    }

    #[test]
    fn molecular_weight_falls_back_to_composition() {
        let c = candidate();
        let expected = c.metrics().composition.unwrap().molecular_weight;
        assert_eq!(c.molecular_weight(), Some(expected));
    }
}
