use super::stability::normalized_stability;
use crate::core::models::candidate::Candidate;

const TEMPERATURE_WEIGHT: f64 = 0.4;
const RATIO_WEIGHT: f64 = 0.3;
const STABILITY_WEIGHT: f64 = 0.2;
/// Every ranked candidate has passed all three rounds.
const COMPLETION_BONUS: f64 = 0.1;

/// Composite ranking score in `0..=1`, or `None` if the candidate lacks stability or
/// binding metrics.
pub fn quality_score(candidate: &Candidate) -> Option<f64> {
    let stability = candidate.metrics().stability?;
    let binding = candidate.metrics().binding?;

    let temperature_score = normalized_stability(stability.stability_temperature);
    let ratio_score = (1.0 - binding.cross_population_ratio / 3.0).clamp(0.0, 1.0);
    let stability_score = stability.stability_score.clamp(0.0, 1.0);

    Some(
        TEMPERATURE_WEIGHT * temperature_score
            + RATIO_WEIGHT * ratio_score
            + STABILITY_WEIGHT * stability_score
            + COMPLETION_BONUS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::candidate::{
        BindingMetrics, CompositionMetrics, HydrophobicityScale, Lineage, StabilityMetrics,
    };
    use crate::core::models::region::{ReferenceRegion, RegionRole};
    use crate::core::sequence::ProteinSequence;

    fn base() -> Candidate {
        let region =
            ReferenceRegion::new("r", "KQEVLQKQ", RegionRole::ReceptorBinding, "human").unwrap();
        let sequence = ProteinSequence::new("KQEVLQ").unwrap();
        let composition = CompositionMetrics {
            length: 6,
            molecular_weight: sequence.molecular_weight(),
            hydrophobicity: sequence.gravy(),
            hydrophobicity_scale: HydrophobicityScale::Gravy,
            net_charge: 1,
        };
        Candidate::new("PEP_0001", sequence, Lineage::from_region(&region, 0), composition)
    }

    #[test]
    fn missing_metrics_yield_none() {
        assert_eq!(quality_score(&base()), None);
    }

    #[test]
    fn score_combines_weighted_terms() {
        let c = base()
            .with_stability(StabilityMetrics {
                stability_temperature: 60.0,
                stability_score: 0.5,
                molecular_weight: 700.0,
            })
            .with_binding(BindingMetrics {
                primary_binding_energy: -9.0,
                secondary_binding_energy: -9.0,
                cross_population_ratio: 1.5,
            });
        let expected = 0.4 * 0.5 + 0.3 * 0.5 + 0.2 * 0.5 + 0.1;
        assert!((quality_score(&c).unwrap() - expected).abs() < 1e-12);
    }
}
