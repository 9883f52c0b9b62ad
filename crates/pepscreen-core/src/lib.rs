//! # pepscreen Core Library
//!
//! A three-round screening pipeline for short therapeutic peptide candidates.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data: the residue alphabet and validated
//!   sequences, reference regions and candidates, the pluggable scorers, and the
//!   reference-data source with its synthetic fallback.
//!
//! - **[`engine`]: The Logic Core.** Layered configuration resolution, the pipeline
//!   state machine, progress reporting, and the three rounds: constrained generation,
//!   stability filtering and cross-population validation.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into a complete
//!   screening run that always returns a [`workflows::screen::PipelineResult`] unless
//!   the configuration itself is unusable.
//!
//! ## Feature Flags
//!
//! - `parallel` (default): score Rounds 2 and 3 on the rayon thread pool.

pub mod core;
pub mod engine;
pub mod workflows;
