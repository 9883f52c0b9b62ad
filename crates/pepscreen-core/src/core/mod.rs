//! # Core Module
//!
//! Stateless building blocks of the screening pipeline.
//!
//! ## Architecture
//!
//! - **Sequence Alphabet** ([`sequence`]) - The 20 standard residues, their physicochemical
//!   tables, and validated peptide sequences
//! - **Data Models** ([`models`]) - Reference regions, candidates with their lineage and
//!   accumulated metrics, and per-round results
//! - **Scoring** ([`scoring`]) - Composition analysis and the pluggable stability and binding
//!   scorers, plus the final quality score
//! - **Reference Data** ([`knowledge`]) - The graph-backed reference store and its synthetic
//!   fallback
//!
//! Nothing in this module keeps state between calls; every scorer is a pure function of its
//! inputs, which is what lets the engine fan scoring out across threads.

pub mod knowledge;
pub mod models;
pub mod scoring;
pub mod sequence;
