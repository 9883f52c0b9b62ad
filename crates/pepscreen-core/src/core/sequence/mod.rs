pub mod peptide;
pub mod residue;

pub use peptide::{ProteinSequence, SequenceError};
pub use residue::AminoAcid;
