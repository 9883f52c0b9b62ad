//! Records that flow through the pipeline: reference regions in, candidates through the
//! rounds, round results out.

pub mod candidate;
pub mod region;
pub mod round;
