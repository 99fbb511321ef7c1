//! archview core - code region extraction and lab result loading.
//!
//! This crate backs the `archview` CLI used in computer-architecture labs.
//!
//! # Features
//!
//! - **Region extraction**: find a function in C++ source or assembler output
//!   by name, or take an explicit line range, and tag it with its origin
//! - **Demangling**: pipe assembly through `c++filt` (or another filter)
//!   before searching it
//! - **Representations**: pair the source and assembly views of a function
//! - **Results**: combine, sort, average and summarise CSV run results

pub mod demangle;
pub mod dialect;
pub mod error;
pub mod extract;
pub mod region;
pub mod reps;
pub mod results;

pub use dialect::{AssemblyDialect, Dialect, GeneralPurpose, Language};
pub use error::{ArchviewError, Result};
pub use extract::{extract, extract_from_text, CodeBlock, ExtractRequest};
pub use region::{Region, Show};
pub use reps::{build_many, build_reps, Representations, RepsOptions};
pub use results::{load_results, ResultTable, ResultsQuery};
