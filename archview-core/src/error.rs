//! Error types for archview-core.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for archview-core operations.
pub type Result<T> = std::result::Result<T, ArchviewError>;

/// Errors that can occur while extracting code regions or loading results.
#[derive(Error, Debug)]
pub enum ArchviewError {
    /// File missing or unreadable.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Region selector with an unusable number of parts.
    #[error("{shape} is not a good range for displaying code")]
    BadShow {
        /// Debug rendering of the arguments that were supplied.
        shape: String,
    },

    /// Symbol lookup requested for a language without a dialect.
    #[error("Don't know how to find functions in {language}")]
    UnsupportedLanguage {
        /// The language tag that was requested.
        language: String,
    },

    /// Caller-supplied boundary pattern failed to compile.
    #[error("Invalid boundary pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// The demangling filter could not be started.
    #[error("Failed to run {command}: {source}")]
    Spawn {
        /// Command that was spawned.
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The demangling filter exited unsuccessfully.
    #[error("{command} exited with {status}: {stderr}")]
    Demangle {
        /// Command that was spawned.
        command: String,
        /// Rendered exit status.
        status: String,
        /// Captured standard error.
        stderr: String,
    },

    /// A result file could not be parsed as CSV.
    #[error("Failed to parse {}: {source}", path.display())]
    Csv {
        /// Offending file.
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A glob pattern was malformed.
    #[error("Invalid file pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// No result files matched the given patterns.
    #[error("No files match {}", patterns.join(", "))]
    NoFiles {
        /// Patterns that were expanded.
        patterns: Vec<String>,
    },

    /// A requested column is not present in the table.
    #[error("Unknown column: {column}")]
    UnknownColumn {
        /// Column name that was requested.
        column: String,
    },
}
