use crate::core::sequence::{AminoAcid, ProteinSequence};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const STRONGEST_BINDING_ENERGY: f64 = -15.0;
pub const WEAKEST_BINDING_ENERGY: f64 = -1.0;

/// A receptor the candidates are scored against, with the structure the estimate refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Receptor {
    pub name: String,
    pub structure_id: String,
}

impl Receptor {
    pub fn new(name: impl Into<String>, structure_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            structure_id: structure_id.into(),
        }
    }

    pub fn default_panel() -> Vec<Receptor> {
        vec![
            Receptor::new("EGFR", "3GT8"),
            Receptor::new("MET", "1R0P"),
            Receptor::new("IGF1R", "3NZM"),
        ]
    }
}

/// Estimates a binding energy (kcal/mol, negative is stronger) of a sequence against
/// one receptor as expressed in one population.
///
/// Implementations must be pure. `None` means no estimate is available.
pub trait BindingScorer: Send + Sync {
    fn binding_energy(
        &self,
        sequence: &ProteinSequence,
        receptor: &Receptor,
        population: &str,
    ) -> Option<f64>;
}

/// Composition-based estimate with a deterministic per-population perturbation.
///
/// The base energy grows with length, aromatic content and aliphatic content. Each
/// (sequence, receptor, population) triple is then scaled by a factor in
/// `1 ± population_spread` derived from a SHA-256 digest of the triple.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicBindingScorer {
    pub base_energy: f64,
    pub per_residue: f64,
    pub per_aromatic: f64,
    pub per_aliphatic: f64,
    pub population_spread: f64,
}

impl Default for HeuristicBindingScorer {
    fn default() -> Self {
        Self {
            base_energy: -2.0,
            per_residue: -0.35,
            per_aromatic: -0.6,
            per_aliphatic: -0.3,
            population_spread: 0.2,
        }
    }
}

impl HeuristicBindingScorer {
    fn base(&self, sequence: &ProteinSequence) -> f64 {
        let aromatic = sequence
            .residues()
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    AminoAcid::Phenylalanine | AminoAcid::Tryptophan | AminoAcid::Tyrosine
                )
            })
            .count();
        let aliphatic = sequence
            .residues()
            .iter()
            .filter(|r| {
                matches!(
                    r,
                    AminoAcid::Isoleucine | AminoAcid::Leucine | AminoAcid::Valine
                )
            })
            .count();
        self.base_energy
            + self.per_residue * sequence.len() as f64
            + self.per_aromatic * aromatic as f64
            + self.per_aliphatic * aliphatic as f64
    }

    fn population_factor(
        &self,
        sequence: &ProteinSequence,
        receptor: &Receptor,
        population: &str,
    ) -> f64 {
        let mut hasher = Sha256::new();
        hasher.update(sequence.to_string().as_bytes());
        hasher.update(b"|");
        hasher.update(receptor.name.as_bytes());
        hasher.update(b"|");
        hasher.update(population.as_bytes());
        let digest = hasher.finalize();

        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        let unit = (u64::from_be_bytes(head) >> 11) as f64 / (1u64 << 53) as f64;
        1.0 + self.population_spread * (2.0 * unit - 1.0)
    }
}

impl BindingScorer for HeuristicBindingScorer {
    fn binding_energy(
        &self,
        sequence: &ProteinSequence,
        receptor: &Receptor,
        population: &str,
    ) -> Option<f64> {
        let energy = self.base(sequence) * self.population_factor(sequence, receptor, population);
        Some(energy.clamp(STRONGEST_BINDING_ENERGY, WEAKEST_BINDING_ENERGY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> ProteinSequence {
        ProteinSequence::new(s).unwrap()
    }

    #[test]
    fn energies_are_clamped_and_negative() {
        let scorer = HeuristicBindingScorer::default();
        let egfr = Receptor::new("EGFR", "3GT8");
        for s in ["G", "KQEVVQIQFQNHDQ", &"W".repeat(40)] {
            for population in ["human", "mouse"] {
                let e = scorer.binding_energy(&seq(s), &egfr, population).unwrap();
                assert!((STRONGEST_BINDING_ENERGY..=WEAKEST_BINDING_ENERGY).contains(&e));
            }
        }
    }

    #[test]
    fn estimates_are_deterministic() {
        let scorer = HeuristicBindingScorer::default();
        let met = Receptor::new("MET", "1R0P");
        let s = seq("QQLQEQLQGQEKQLEQ");
        assert_eq!(
            scorer.binding_energy(&s, &met, "mouse"),
            scorer.binding_energy(&s, &met, "mouse")
        );
    }

    #[test]
    fn populations_differ_within_spread() {
        let scorer = HeuristicBindingScorer::default();
        let s = seq("KQEVVQIQFQNHDQ");
        let base = scorer.base(&s);
        let mut any_differs = false;
        for receptor in Receptor::default_panel() {
            let h = scorer.binding_energy(&s, &receptor, "human").unwrap();
            let m = scorer.binding_energy(&s, &receptor, "mouse").unwrap();
            any_differs |= h != m;
            for e in [h, m] {
                assert!(e <= base * 0.8 + 1e-9 && e >= base * 1.2 - 1e-9);
            }
        }
        assert!(any_differs);
    }

    #[test]
    fn default_panel_lists_three_receptors() {
        let names: Vec<_> = Receptor::default_panel().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["EGFR", "MET", "IGF1R"]);
    }
}
