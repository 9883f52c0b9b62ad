//! # Engine Module
//!
//! The stateful layer of the screening pipeline: everything needed to carry a batch of
//! candidates through the three rounds.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Layered settings resolution (defaults, TOML file,
//!   environment, explicit overrides) and the validated [`config::PipelineConfig`]
//! - **Rounds** ([`rounds`]) - Candidate generation, stability filtering and
//!   cross-population validation, each returning a fresh [`RoundResult`](crate::core::models::round::RoundResult)
//! - **State Tracking** ([`state`]) - The pipeline state machine and its visited-state trace
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Pipeline-level error types
//!
//! ## Concurrency
//!
//! Rounds 2 and 3 score distinct sequences in parallel when the `parallel` feature is
//! enabled. Each round is a barrier: scores are collected first and only then folded
//! into the per-round [`cache::ScoreCache`], so scoring threads never share mutable state.

pub mod cache;
pub mod config;
pub mod error;
pub mod progress;
pub mod rounds;
pub mod state;
