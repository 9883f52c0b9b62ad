use crate::core::models::candidate::{CompositionMetrics, HydrophobicityScale};
use crate::core::models::round::RejectionReason;
use crate::core::sequence::residue::{HYDROPATHY_FLOOR, STRONG_HYDROPATHY_FLOOR, WATER_MASS};
use crate::core::sequence::{AminoAcid, ProteinSequence};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Flat per-residue mass the coarse tier reports (Da).
pub const COARSE_RESIDUE_MASS: f64 = 110.0;

/// Lightest weight any sequence of `length` residues can have.
///
/// The coarse tier checks this bound against the weight ceiling, so it never rejects
/// a sequence whose exact weight fits.
pub fn coarse_weight_floor(length: usize) -> f64 {
    length as f64 * AminoAcid::Glycine.residue_mass() + WATER_MASS
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisTier {
    /// Residue-mass sum and Kyte-Doolittle GRAVY.
    #[default]
    Precise,
    /// Flat mass estimate and hydrophobic-residue fraction.
    Coarse,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unknown analysis tier '{0}'. Expected 'precise' or 'coarse'.")]
pub struct UnknownAnalysisTier(pub String);

impl fmt::Display for AnalysisTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisTier::Precise => f.write_str("precise"),
            AnalysisTier::Coarse => f.write_str("coarse"),
        }
    }
}

impl FromStr for AnalysisTier {
    type Err = UnknownAnalysisTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "precise" => Ok(AnalysisTier::Precise),
            "coarse" => Ok(AnalysisTier::Coarse),
            _ => Err(UnknownAnalysisTier(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionLimits {
    pub max_molecular_weight: f64,
    /// GRAVY ceiling used by the precise tier.
    pub max_hydrophobicity: f64,
    /// Hydrophobic-fraction ceiling requested for the coarse tier.
    pub max_hydrophobic_fraction: f64,
    pub max_cysteine_fraction: f64,
    pub forbidden_motifs: Vec<String>,
}

impl CompositionLimits {
    /// Fraction cap the coarse tier actually applies.
    ///
    /// A sequence with hydrophobic fraction `f` has GRAVY of at least
    /// `HYDROPATHY_FLOOR + f * (STRONG_HYDROPATHY_FLOOR - HYDROPATHY_FLOOR)`, so any
    /// sequence under the precise GRAVY ceiling also sits under this cap.
    pub fn effective_hydrophobic_fraction(&self) -> f64 {
        let implied = (self.max_hydrophobicity - HYDROPATHY_FLOOR)
            / (STRONG_HYDROPATHY_FLOOR - HYDROPATHY_FLOOR);
        self.max_hydrophobic_fraction.max(implied)
    }
}

/// Pass/fail for each independent composition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstraintChecks {
    pub molecular_weight_ok: bool,
    pub hydrophobicity_ok: bool,
    pub motifs_ok: bool,
    pub cysteine_ok: bool,
}

/// Decision table for Round 1 acceptance.
///
/// | weight | hydrophobicity | motifs | cysteine | verdict            |
/// |--------|----------------|--------|----------|--------------------|
/// | fail   | any            | any    | any      | `MolecularWeight`  |
/// | ok     | fail           | any    | any      | `Hydrophobicity`   |
/// | ok     | ok             | fail   | any      | `ForbiddenMotif`   |
/// | ok     | ok             | ok     | fail     | `CysteineContent`  |
/// | ok     | ok             | ok     | ok       | accept             |
pub fn constraint_verdict(checks: ConstraintChecks) -> Result<(), RejectionReason> {
    match (
        checks.molecular_weight_ok,
        checks.hydrophobicity_ok,
        checks.motifs_ok,
        checks.cysteine_ok,
    ) {
        (false, _, _, _) => Err(RejectionReason::MolecularWeight),
        (true, false, _, _) => Err(RejectionReason::Hydrophobicity),
        (true, true, false, _) => Err(RejectionReason::ForbiddenMotif),
        (true, true, true, false) => Err(RejectionReason::CysteineContent),
        (true, true, true, true) => Ok(()),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositionAssessment {
    pub metrics: CompositionMetrics,
    pub verdict: Result<(), RejectionReason>,
}

pub fn measure(sequence: &ProteinSequence, tier: AnalysisTier) -> CompositionMetrics {
    let (molecular_weight, hydrophobicity, hydrophobicity_scale) = match tier {
        AnalysisTier::Precise => (
            sequence.molecular_weight(),
            sequence.gravy(),
            HydrophobicityScale::Gravy,
        ),
        AnalysisTier::Coarse => (
            sequence.len() as f64 * COARSE_RESIDUE_MASS,
            sequence.fraction_where(AminoAcid::is_strongly_hydrophobic),
            HydrophobicityScale::HydrophobicFraction,
        ),
    };
    CompositionMetrics {
        length: sequence.len(),
        molecular_weight,
        hydrophobicity,
        hydrophobicity_scale,
        net_charge: sequence.net_charge(),
    }
}

pub fn assess(
    sequence: &ProteinSequence,
    tier: AnalysisTier,
    limits: &CompositionLimits,
) -> CompositionAssessment {
    let metrics = measure(sequence, tier);
    let (checked_weight, hydrophobicity_cap) = match tier {
        AnalysisTier::Precise => (metrics.molecular_weight, limits.max_hydrophobicity),
        AnalysisTier::Coarse => (
            coarse_weight_floor(metrics.length),
            limits.effective_hydrophobic_fraction(),
        ),
    };
    let checks = ConstraintChecks {
        molecular_weight_ok: checked_weight < limits.max_molecular_weight,
        hydrophobicity_ok: metrics.hydrophobicity < hydrophobicity_cap,
        motifs_ok: !limits
            .forbidden_motifs
            .iter()
            .any(|motif| sequence.contains_motif(motif)),
        cysteine_ok: sequence.fraction_where(|r| r == AminoAcid::Cysteine)
            <= limits.max_cysteine_fraction,
    };
    CompositionAssessment {
        metrics,
        verdict: constraint_verdict(checks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn limits() -> CompositionLimits {
        CompositionLimits {
            max_molecular_weight: 2000.0,
            max_hydrophobicity: -0.5,
            max_hydrophobic_fraction: 0.4,
            max_cysteine_fraction: 0.1,
            forbidden_motifs: vec!["CC".into(), "KKKK".into()],
        }
    }

    fn seq(s: &str) -> ProteinSequence {
        ProteinSequence::new(s).unwrap()
    }

    #[test]
    fn constraint_verdict_covers_every_cell() {
        use RejectionReason::*;
        let table: [((bool, bool, bool, bool), Result<(), RejectionReason>); 16] = [
            ((false, false, false, false), Err(MolecularWeight)),
            ((false, false, false, true), Err(MolecularWeight)),
            ((false, false, true, false), Err(MolecularWeight)),
            ((false, false, true, true), Err(MolecularWeight)),
            ((false, true, false, false), Err(MolecularWeight)),
            ((false, true, false, true), Err(MolecularWeight)),
            ((false, true, true, false), Err(MolecularWeight)),
            ((false, true, true, true), Err(MolecularWeight)),
            ((true, false, false, false), Err(Hydrophobicity)),
            ((true, false, false, true), Err(Hydrophobicity)),
            ((true, false, true, false), Err(Hydrophobicity)),
            ((true, false, true, true), Err(Hydrophobicity)),
            ((true, true, false, false), Err(ForbiddenMotif)),
            ((true, true, false, true), Err(ForbiddenMotif)),
            ((true, true, true, false), Err(CysteineContent)),
            ((true, true, true, true), Ok(())),
        ];
        for ((mw, hydro, motifs, cys), expected) in table {
            let checks = ConstraintChecks {
                molecular_weight_ok: mw,
                hydrophobicity_ok: hydro,
                motifs_ok: motifs,
                cysteine_ok: cys,
            };
            assert_eq!(constraint_verdict(checks), expected, "{checks:?}");
        }
    }

    #[test]
    fn precise_tier_accepts_polar_peptide() {
        let result = assess(&seq("KQEDNQSEKQ"), AnalysisTier::Precise, &limits());
        assert_eq!(result.verdict, Ok(()));
        assert_eq!(result.metrics.hydrophobicity_scale, HydrophobicityScale::Gravy);
        assert_eq!(result.metrics.length, 10);
    }

    #[test]
    fn precise_tier_rejects_hydrophobic_peptide() {
        let result = assess(&seq("LLIVFAVLIM"), AnalysisTier::Precise, &limits());
        assert_eq!(result.verdict, Err(RejectionReason::Hydrophobicity));
    }

    #[test]
    fn heavy_peptide_fails_on_weight_first() {
        let long = "W".repeat(20);
        let result = assess(&seq(&long), AnalysisTier::Precise, &limits());
        assert_eq!(result.verdict, Err(RejectionReason::MolecularWeight));
    }

    #[test]
    fn forbidden_motif_and_cysteine_are_reported() {
        let motif = assess(&seq("QECCQEQKDN"), AnalysisTier::Precise, &limits());
        assert_eq!(motif.verdict, Err(RejectionReason::ForbiddenMotif));
        let cys = assess(&seq("QECQECQKDN"), AnalysisTier::Precise, &limits());
        assert_eq!(cys.verdict, Err(RejectionReason::CysteineContent));
    }

    #[test]
    fn coarse_tier_uses_flat_mass() {
        let metrics = measure(&seq("KQEDNQSEKQ"), AnalysisTier::Coarse);
        assert_eq!(metrics.molecular_weight, 1100.0);
        assert_eq!(
            metrics.hydrophobicity_scale,
            HydrophobicityScale::HydrophobicFraction
        );
        assert_eq!(metrics.hydrophobicity, 0.0);
    }

    #[test]
    fn effective_fraction_never_drops_below_configured_cap() {
        let mut l = limits();
        l.max_hydrophobicity = -4.5;
        assert_eq!(l.effective_hydrophobic_fraction(), 0.4);
        l.max_hydrophobicity = -0.5;
        assert!(l.effective_hydrophobic_fraction() > 0.6);
    }

    fn random_sequence(rng: &mut StdRng, alphabet: &[AminoAcid]) -> ProteinSequence {
        let len = rng.gen_range(5..=30);
        let residues = (0..len)
            .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
            .collect();
        ProteinSequence::from_residues(residues).unwrap()
    }

    #[test]
    fn coarse_tier_accepts_whatever_precise_tier_accepts() {
        use AminoAcid::*;
        let light = [Glycine, Serine, Alanine, Asparagine, AsparticAcid, Threonine, Glutamine];
        let mut rng = StdRng::seed_from_u64(7);
        let l = limits();
        let mut both_accepted = 0;
        for alphabet in [&AminoAcid::ALL[..], &light[..]] {
            for _ in 0..2000 {
                let s = random_sequence(&mut rng, alphabet);
                if assess(&s, AnalysisTier::Precise, &l).verdict.is_ok() {
                    assert_eq!(assess(&s, AnalysisTier::Coarse, &l).verdict, Ok(()), "{s}");
                    both_accepted += 1;
                }
            }
        }
        assert!(both_accepted > 100);
    }

    #[test]
    fn long_light_peptide_passes_both_tiers() {
        let s = seq("GSGSGSGSGSGSGSGSGSG");
        assert!(s.molecular_weight() < 2000.0);
        assert_eq!(assess(&s, AnalysisTier::Precise, &limits()).verdict, Ok(()));
        let coarse = assess(&s, AnalysisTier::Coarse, &limits());
        assert_eq!(coarse.metrics.molecular_weight, 19.0 * COARSE_RESIDUE_MASS);
        assert_eq!(coarse.verdict, Ok(()));
    }

    #[test]
    fn weight_floor_never_exceeds_exact_weight() {
        assert!((coarse_weight_floor(1) - seq("G").molecular_weight()).abs() < 1e-9);
        assert!(coarse_weight_floor(10) < seq("KQEDNQSEKQ").molecular_weight());
        assert_eq!(
            assess(&seq(&"G".repeat(40)), AnalysisTier::Coarse, &limits()).verdict,
            Err(RejectionReason::MolecularWeight)
        );
    }

    #[test]
    fn analysis_tier_parses_case_insensitively() {
        assert_eq!("Coarse".parse(), Ok(AnalysisTier::Coarse));
        assert!("approximate".parse::<AnalysisTier>().is_err());
    }
}
