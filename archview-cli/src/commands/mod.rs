//! Command implementations for the archview CLI

pub mod completions;
pub mod doctor;
pub mod reps;
pub mod results;
pub mod show;
