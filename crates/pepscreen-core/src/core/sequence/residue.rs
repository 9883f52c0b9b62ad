use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Mass of one water molecule (Da), added once per peptide chain.
pub const WATER_MASS: f64 = 18.01528;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AminoAcid {
    // --- Aliphatic, Nonpolar ---
    Alanine,
    Glycine,
    Isoleucine,
    Leucine,
    Proline,
    Valine,

    // --- Aromatic ---
    Phenylalanine,
    Tryptophan,
    Tyrosine,

    // --- Polar, Uncharged ---
    Asparagine,
    Cysteine,
    Glutamine,
    Serine,
    Threonine,
    Methionine,

    // --- Positively Charged (Basic) ---
    Arginine,
    Histidine,
    Lysine,

    // --- Negatively Charged (Acidic) ---
    AsparticAcid,
    GlutamicAcid,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("'{0}' is not one of the 20 standard amino-acid codes")]
pub struct UnknownResidueCode(pub char);

impl AminoAcid {
    pub const ALL: [AminoAcid; 20] = [
        AminoAcid::Alanine,
        AminoAcid::Arginine,
        AminoAcid::Asparagine,
        AminoAcid::AsparticAcid,
        AminoAcid::Cysteine,
        AminoAcid::GlutamicAcid,
        AminoAcid::Glutamine,
        AminoAcid::Glycine,
        AminoAcid::Histidine,
        AminoAcid::Isoleucine,
        AminoAcid::Leucine,
        AminoAcid::Lysine,
        AminoAcid::Methionine,
        AminoAcid::Phenylalanine,
        AminoAcid::Proline,
        AminoAcid::Serine,
        AminoAcid::Threonine,
        AminoAcid::Tryptophan,
        AminoAcid::Tyrosine,
        AminoAcid::Valine,
    ];

    pub fn from_code(code: char) -> Result<Self, UnknownResidueCode> {
        let residue = match code.to_ascii_uppercase() {
            'A' => AminoAcid::Alanine,
            'R' => AminoAcid::Arginine,
            'N' => AminoAcid::Asparagine,
            'D' => AminoAcid::AsparticAcid,
            'C' => AminoAcid::Cysteine,
            'E' => AminoAcid::GlutamicAcid,
            'Q' => AminoAcid::Glutamine,
            'G' => AminoAcid::Glycine,
            'H' => AminoAcid::Histidine,
            'I' => AminoAcid::Isoleucine,
            'L' => AminoAcid::Leucine,
            'K' => AminoAcid::Lysine,
            'M' => AminoAcid::Methionine,
            'F' => AminoAcid::Phenylalanine,
            'P' => AminoAcid::Proline,
            'S' => AminoAcid::Serine,
            'T' => AminoAcid::Threonine,
            'W' => AminoAcid::Tryptophan,
            'Y' => AminoAcid::Tyrosine,
            'V' => AminoAcid::Valine,
            _ => return Err(UnknownResidueCode(code)),
        };
        Ok(residue)
    }

    pub fn code(self) -> char {
        match self {
            AminoAcid::Alanine => 'A',
            AminoAcid::Arginine => 'R',
            AminoAcid::Asparagine => 'N',
            AminoAcid::AsparticAcid => 'D',
            AminoAcid::Cysteine => 'C',
            AminoAcid::GlutamicAcid => 'E',
            AminoAcid::Glutamine => 'Q',
            AminoAcid::Glycine => 'G',
            AminoAcid::Histidine => 'H',
            AminoAcid::Isoleucine => 'I',
            AminoAcid::Leucine => 'L',
            AminoAcid::Lysine => 'K',
            AminoAcid::Methionine => 'M',
            AminoAcid::Phenylalanine => 'F',
            AminoAcid::Proline => 'P',
            AminoAcid::Serine => 'S',
            AminoAcid::Threonine => 'T',
            AminoAcid::Tryptophan => 'W',
            AminoAcid::Tyrosine => 'Y',
            AminoAcid::Valine => 'V',
        }
    }

    /// Average residue mass in Daltons (free amino acid minus one water).
    pub fn residue_mass(self) -> f64 {
        match self {
            AminoAcid::Alanine => 71.0788,
            AminoAcid::Arginine => 156.1875,
            AminoAcid::Asparagine => 114.1038,
            AminoAcid::AsparticAcid => 115.0886,
            AminoAcid::Cysteine => 103.1388,
            AminoAcid::GlutamicAcid => 129.1155,
            AminoAcid::Glutamine => 128.1307,
            AminoAcid::Glycine => 57.0519,
            AminoAcid::Histidine => 137.1411,
            AminoAcid::Isoleucine => 113.1594,
            AminoAcid::Leucine => 113.1594,
            AminoAcid::Lysine => 128.1741,
            AminoAcid::Methionine => 131.1926,
            AminoAcid::Phenylalanine => 147.1766,
            AminoAcid::Proline => 97.1167,
            AminoAcid::Serine => 87.0782,
            AminoAcid::Threonine => 101.1051,
            AminoAcid::Tryptophan => 186.2132,
            AminoAcid::Tyrosine => 163.1760,
            AminoAcid::Valine => 99.1326,
        }
    }

    /// Kyte-Doolittle hydropathy index.
    pub fn hydropathy(self) -> f64 {
        match self {
            AminoAcid::Alanine => 1.8,
            AminoAcid::Arginine => -4.5,
            AminoAcid::Asparagine => -3.5,
            AminoAcid::AsparticAcid => -3.5,
            AminoAcid::Cysteine => 2.5,
            AminoAcid::GlutamicAcid => -3.5,
            AminoAcid::Glutamine => -3.5,
            AminoAcid::Glycine => -0.4,
            AminoAcid::Histidine => -3.2,
            AminoAcid::Isoleucine => 4.5,
            AminoAcid::Leucine => 3.8,
            AminoAcid::Lysine => -3.9,
            AminoAcid::Methionine => 1.9,
            AminoAcid::Phenylalanine => 2.8,
            AminoAcid::Proline => -1.6,
            AminoAcid::Serine => -0.8,
            AminoAcid::Threonine => -0.7,
            AminoAcid::Tryptophan => -0.9,
            AminoAcid::Tyrosine => -1.3,
            AminoAcid::Valine => 4.2,
        }
    }

    /// Residues counted by the coarse hydrophobicity estimate. Every member has a
    /// hydropathy of at least [`STRONG_HYDROPATHY_FLOOR`].
    pub fn is_strongly_hydrophobic(self) -> bool {
        matches!(
            self,
            AminoAcid::Alanine
                | AminoAcid::Cysteine
                | AminoAcid::Isoleucine
                | AminoAcid::Leucine
                | AminoAcid::Methionine
                | AminoAcid::Phenylalanine
                | AminoAcid::Valine
        )
    }

    /// Residues with similar side-chain properties, used to derive sequence variants.
    pub fn conservative_substitutes(self) -> [AminoAcid; 3] {
        use AminoAcid::*;
        match self {
            Alanine => [Serine, Threonine, Valine],
            Valine => [Leucine, Isoleucine, Alanine],
            Leucine => [Isoleucine, Valine, Methionine],
            Isoleucine => [Leucine, Valine, Methionine],
            Serine => [Threonine, Alanine, Asparagine],
            Threonine => [Serine, Alanine, Asparagine],
            Asparagine => [Glutamine, Serine, AsparticAcid],
            Glutamine => [Asparagine, GlutamicAcid, Lysine],
            GlutamicAcid => [Glutamine, AsparticAcid, Lysine],
            AsparticAcid => [Asparagine, GlutamicAcid, Serine],
            Lysine => [Arginine, Glutamine, GlutamicAcid],
            Arginine => [Lysine, Glutamine, GlutamicAcid],
            Histidine => [Tyrosine, Asparagine, Lysine],
            Tyrosine => [Histidine, Phenylalanine, Tryptophan],
            Phenylalanine => [Tyrosine, Leucine, Tryptophan],
            Tryptophan => [Phenylalanine, Tyrosine, Histidine],
            Cysteine => [Serine, Alanine, Threonine],
            Glycine => [Alanine, Serine, Threonine],
            Proline => [Alanine, Serine, Threonine],
            Methionine => [Leucine, Isoleucine, Valine],
        }
    }

    /// Side-chain charge at pH 7, histidine counted as protonated.
    pub fn charge(self) -> i32 {
        match self {
            AminoAcid::Lysine | AminoAcid::Arginine | AminoAcid::Histidine => 1,
            AminoAcid::AsparticAcid | AminoAcid::GlutamicAcid => -1,
            _ => 0,
        }
    }
}

/// Lowest hydropathy in the strongly hydrophobic class (alanine).
pub const STRONG_HYDROPATHY_FLOOR: f64 = 1.8;
/// Lowest hydropathy of any standard residue (arginine).
pub const HYDROPATHY_FLOOR: f64 = -4.5;

impl fmt::Display for AminoAcid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for AminoAcid {
    type Err = UnknownResidueCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::from_code(c),
            _ => Err(UnknownResidueCode(s.chars().next().unwrap_or(' '))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_code_round_trips_every_standard_residue() {
        for aa in AminoAcid::ALL {
            assert_eq!(AminoAcid::from_code(aa.code()), Ok(aa));
        }
    }

    #[test]
    fn from_code_accepts_lowercase() {
        assert_eq!(AminoAcid::from_code('k'), Ok(AminoAcid::Lysine));
    }

    #[test]
    fn from_code_rejects_non_standard_letters() {
        assert_eq!(AminoAcid::from_code('B'), Err(UnknownResidueCode('B')));
        assert_eq!(AminoAcid::from_code('X'), Err(UnknownResidueCode('X')));
        assert_eq!(AminoAcid::from_code('*'), Err(UnknownResidueCode('*')));
    }

    #[test]
    fn strongly_hydrophobic_class_respects_hydropathy_floor() {
        for aa in AminoAcid::ALL {
            if aa.is_strongly_hydrophobic() {
                assert!(aa.hydropathy() >= STRONG_HYDROPATHY_FLOOR, "{aa}");
            }
            assert!(aa.hydropathy() >= HYDROPATHY_FLOOR, "{aa}");
        }
    }

    #[test]
    fn charge_is_signed_for_acidic_and_basic_residues() {
        assert_eq!(AminoAcid::Lysine.charge(), 1);
        assert_eq!(AminoAcid::GlutamicAcid.charge(), -1);
        assert_eq!(AminoAcid::Glycine.charge(), 0);
    }

    #[test]
    fn conservative_substitutes_never_return_the_residue_itself() {
        for aa in AminoAcid::ALL {
            assert!(!aa.conservative_substitutes().contains(&aa), "{aa}");
        }
    }

    #[test]
    fn from_str_requires_exactly_one_code() {
        assert_eq!("W".parse::<AminoAcid>(), Ok(AminoAcid::Tryptophan));
        assert!("WW".parse::<AminoAcid>().is_err());
        assert!("".parse::<AminoAcid>().is_err());
    }
}
