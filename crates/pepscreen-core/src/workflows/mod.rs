//! # Workflows Module
//!
//! Top-level entry points of the library.
//!
//! - **Screening Workflow** ([`screen`]) - Loads reference regions, runs the three rounds
//!   in order, ranks the survivors and aggregates the final statistics.

pub mod screen;
