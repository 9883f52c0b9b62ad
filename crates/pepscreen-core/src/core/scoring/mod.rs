//! Pluggable scoring collaborators.
//!
//! - [`composition`] measures a sequence and applies the Round 1 decision table.
//! - [`stability`] defines [`StabilityScorer`] and the default thermal heuristic.
//! - [`binding`] defines [`BindingScorer`], the receptor panel and the default heuristic.
//! - [`quality`] ranks candidates that survived every round.

pub mod binding;
pub mod composition;
pub mod quality;
pub mod stability;

pub use binding::{BindingScorer, HeuristicBindingScorer, Receptor};
pub use composition::{AnalysisTier, CompositionLimits};
pub use stability::{HeuristicStabilityScorer, StabilityScorer};
