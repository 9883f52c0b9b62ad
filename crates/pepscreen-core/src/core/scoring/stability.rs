use crate::core::sequence::{AminoAcid, ProteinSequence};
use phf::{Map, phf_map};

pub const MIN_STABILITY_TEMPERATURE: f64 = 30.0;
pub const MAX_STABILITY_TEMPERATURE: f64 = 90.0;

/// Estimates a thermal stability temperature (°C) for a sequence.
///
/// Implementations must be pure: the same sequence always yields the same estimate.
/// `None` means the scorer could not produce an estimate and the candidate is rejected.
pub trait StabilityScorer: Send + Sync {
    fn stability_temperature(&self, sequence: &ProteinSequence) -> Option<f64>;
}

/// Maps a temperature onto `0..=1` across the scorer's output range.
pub fn normalized_stability(temperature: f64) -> f64 {
    ((temperature - MIN_STABILITY_TEMPERATURE)
        / (MAX_STABILITY_TEMPERATURE - MIN_STABILITY_TEMPERATURE))
        .clamp(0.0, 1.0)
}

static THERMAL_CONTRIBUTION: Map<char, f64> = phf_map! {
    'I' => 6.0,
    'V' => 5.0,
    'Y' => 5.0,
    'W' => 4.0,
    'F' => 4.0,
    'P' => 4.0,
    'L' => 3.0,
    'C' => 3.0,
    'T' => 3.0,
    'M' => 2.0,
    'A' => 2.0,
    'E' => 2.0,
    'K' => 2.0,
    'R' => 2.0,
    'Q' => 1.0,
    'H' => 1.0,
    'D' => 0.0,
    'N' => -1.0,
    'S' => -1.0,
    'G' => -3.0,
};

/// Composition heuristic: a base temperature shifted by per-residue thermal
/// contributions, potential salt bridges and chain length.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicStabilityScorer {
    pub base_temperature: f64,
    pub contribution_weight: f64,
    pub salt_bridge_weight: f64,
    pub length_weight: f64,
    pub reference_length: usize,
}

impl Default for HeuristicStabilityScorer {
    fn default() -> Self {
        Self {
            base_temperature: 50.0,
            contribution_weight: 4.0,
            salt_bridge_weight: 1.5,
            length_weight: 0.5,
            reference_length: 10,
        }
    }
}

impl HeuristicStabilityScorer {
    fn salt_bridges(sequence: &ProteinSequence) -> usize {
        let basic = sequence.count(AminoAcid::Lysine) + sequence.count(AminoAcid::Arginine);
        let acidic =
            sequence.count(AminoAcid::AsparticAcid) + sequence.count(AminoAcid::GlutamicAcid);
        basic.min(acidic)
    }
}

impl StabilityScorer for HeuristicStabilityScorer {
    fn stability_temperature(&self, sequence: &ProteinSequence) -> Option<f64> {
        let total: f64 = sequence
            .residues()
            .iter()
            .map(|r| THERMAL_CONTRIBUTION.get(&r.code()).copied())
            .sum::<Option<f64>>()?;
        let mean = total / sequence.len() as f64;
        let length_shift = sequence.len() as f64 - self.reference_length as f64;

        let temperature = self.base_temperature
            + self.contribution_weight * mean
            + self.salt_bridge_weight * Self::salt_bridges(sequence) as f64
            + self.length_weight * length_shift;

        Some(temperature.clamp(MIN_STABILITY_TEMPERATURE, MAX_STABILITY_TEMPERATURE))
    }
}
