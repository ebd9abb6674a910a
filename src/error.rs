//! Unified error type for the call-tree engine.

use thiserror::Error;

/// All errors that can propagate out of the core.
///
/// Per the error taxonomy: `ParseWarning` and `ResolutionMiss` are
/// deliberately absent — they never abort a build or a tree walk, they are
/// recorded as data (`FunctionDatabase::parse_errors`, verbose log lines)
/// rather than surfaced as `Result::Err`.
#[derive(Error, Debug)]
pub enum CallTreeError {
    /// I/O error (file read/write, directory access).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Cache payload encode/decode failure. Callers treat this as a cache
    /// miss (fall back to a fresh parse) rather than propagating it.
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Module-mapping YAML is malformed, wrong-typed, or semantically
    /// invalid (empty label, empty pattern, unsupported version, ...).
    #[error("Invalid module mapping configuration: {message}")]
    InvalidConfig { message: String },

    /// Source directory does not exist or is not a directory.
    #[error("Source directory does not exist: {0}")]
    DirNotFound(String),

    /// The call-tree builder's start name did not resolve to any
    /// definition. Carried as a string in `AnalysisResult.errors`, not
    /// normally propagated as a hard error — this variant exists so
    /// library callers that prefer `Result`-style flow control have one.
    #[error("Start function not found: {name}")]
    StartNotFound { name: String },
}
