use super::residue::{AminoAcid, WATER_MASS};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SequenceError {
    #[error("Sequence is empty")]
    Empty,
    #[error("Invalid residue code '{code}' at position {position}")]
    InvalidResidue { position: usize, code: char },
}

/// A non-empty sequence over the 20 standard amino-acid codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ProteinSequence {
    residues: Vec<AminoAcid>,
}

impl ProteinSequence {
    pub fn new(sequence: &str) -> Result<Self, SequenceError> {
        let trimmed = sequence.trim();
        if trimmed.is_empty() {
            return Err(SequenceError::Empty);
        }
        let residues = trimmed
            .chars()
            .enumerate()
            .map(|(position, code)| {
                AminoAcid::from_code(code)
                    .map_err(|_| SequenceError::InvalidResidue { position, code })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { residues })
    }

    pub fn from_residues(residues: Vec<AminoAcid>) -> Result<Self, SequenceError> {
        if residues.is_empty() {
            return Err(SequenceError::Empty);
        }
        Ok(Self { residues })
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn residues(&self) -> &[AminoAcid] {
        &self.residues
    }

    pub fn count(&self, residue: AminoAcid) -> usize {
        self.residues.iter().filter(|&&r| r == residue).count()
    }

    pub fn fraction_where(&self, predicate: impl Fn(AminoAcid) -> bool) -> f64 {
        let hits = self.residues.iter().filter(|&&r| predicate(r)).count();
        hits as f64 / self.len() as f64
    }

    pub fn contains_motif(&self, motif: &str) -> bool {
        let motif = motif.trim().to_ascii_uppercase();
        !motif.is_empty() && self.to_string().contains(&motif)
    }

    /// Contiguous sub-sequence, or `None` if the window runs past the end or is empty.
    pub fn window(&self, start: usize, length: usize) -> Option<Self> {
        if length == 0 || start + length > self.len() {
            return None;
        }
        Some(Self {
            residues: self.residues[start..start + length].to_vec(),
        })
    }

    pub fn with_substitution(&self, position: usize, residue: AminoAcid) -> Self {
        let mut residues = self.residues.clone();
        if let Some(slot) = residues.get_mut(position) {
            *slot = residue;
        }
        Self { residues }
    }

    /// Average molecular weight of the full chain in Daltons.
    pub fn molecular_weight(&self) -> f64 {
        self.residues.iter().map(|r| r.residue_mass()).sum::<f64>() + WATER_MASS
    }

    /// Grand average of hydropathy (mean Kyte-Doolittle index).
    pub fn gravy(&self) -> f64 {
        self.residues.iter().map(|r| r.hydropathy()).sum::<f64>() / self.len() as f64
    }

    pub fn net_charge(&self) -> i32 {
        self.residues.iter().map(|r| r.charge()).sum()
    }
}

impl fmt::Display for ProteinSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for residue in &self.residues {
            write!(f, "{}", residue.code())?;
        }
        Ok(())
    }
}

impl FromStr for ProteinSequence {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl From<ProteinSequence> for String {
    fn from(sequence: ProteinSequence) -> Self {
        sequence.to_string()
    }
}

impl TryFrom<String> for ProteinSequence {
    type Error = SequenceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(s: &str) -> ProteinSequence {
        ProteinSequence::new(s).unwrap()
    }

    #[test]
    fn new_rejects_empty_and_whitespace_input() {
        assert_eq!(ProteinSequence::new(""), Err(SequenceError::Empty));
        assert_eq!(ProteinSequence::new("   "), Err(SequenceError::Empty));
    }

    #[test]
    fn new_reports_position_of_first_invalid_code() {
        assert_eq!(
            ProteinSequence::new("ACDXE"),
            Err(SequenceError::InvalidResidue {
                position: 3,
                code: 'X'
            })
        );
    }

    #[test]
    fn new_normalizes_case() {
        assert_eq!(seq("acde").to_string(), "ACDE");
    }

    #[test]
    fn molecular_weight_adds_one_water() {
        let gly = seq("G");
        assert!((gly.molecular_weight() - (57.0519 + WATER_MASS)).abs() < 1e-9);
        let dipeptide = seq("GA");
        assert!((dipeptide.molecular_weight() - (57.0519 + 71.0788 + WATER_MASS)).abs() < 1e-9);
    }

    #[test]
    fn gravy_is_mean_hydropathy() {
        assert!((seq("IR").gravy() - 0.0).abs() < 1e-12);
        assert!((seq("KKK").gravy() + 3.9).abs() < 1e-12);
    }

    #[test]
    fn net_charge_counts_basic_minus_acidic() {
        assert_eq!(seq("KRHDE").net_charge(), 1);
        assert_eq!(seq("DDG").net_charge(), -2);
    }

    #[test]
    fn contains_motif_is_case_insensitive_and_ignores_empty_motif() {
        let s = seq("AKCCLE");
        assert!(s.contains_motif("cc"));
        assert!(!s.contains_motif("KKK"));
        assert!(!s.contains_motif(""));
    }

    #[test]
    fn window_respects_bounds() {
        let s = seq("ACDEFGHIK");
        assert_eq!(s.window(2, 3).unwrap().to_string(), "DEF");
        assert!(s.window(7, 3).is_none());
        assert!(s.window(0, 0).is_none());
        assert_eq!(s.window(0, 9).unwrap(), s);
    }

    #[test]
    fn with_substitution_preserves_length_and_ignores_out_of_range() {
        let s = seq("LKL");
        let mutated = s.with_substitution(0, AminoAcid::Isoleucine);
        assert_eq!(mutated.to_string(), "IKL");
        assert_eq!(s.with_substitution(10, AminoAcid::Isoleucine), s);
    }

    #[test]
    fn serde_uses_plain_string_form() {
        let s = seq("PEPTIDE");
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"PEPTIDE\"");
        let back: ProteinSequence = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
        assert!(serde_json::from_str::<ProteinSequence>("\"PEPTIDEZ\"").is_err());
    }
}
