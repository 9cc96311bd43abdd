//! Error types for spl-conf-gen

use thiserror::Error;

/// Result type alias for spl-conf-gen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing feature models or sampling configurations
#[derive(Debug, Error)]
pub enum Error {
    /// Feature-model document is malformed or unreadable. Fatal: no partial
    /// feature model is usable.
    #[error("Feature model parse error in {path}: {reason}")]
    ModelParse {
        /// Path of the offending document
        path: String,
        /// What went wrong
        reason: String,
    },

    /// A sampling strategy was invoked without a bound feature model
    #[error("Sampling strategy invoked without a bound feature model")]
    UnboundStrategy,

    /// Bounded-retry rejection sampling could not reach the requested count.
    /// Recoverable: reduce `n` or widen the numeric ranges.
    #[error(
        "Sampling exhausted after {attempts} attempts: requested {requested} candidates, collected {collected}"
    )]
    SamplingExhausted {
        /// Number of candidates requested
        requested: usize,
        /// Number of distinct candidates collected before giving up
        collected: usize,
        /// Number of draws performed
        attempts: usize,
    },

    /// Raw configuration table is malformed
    #[error("Configuration table error in {path}: {reason}")]
    TableParse {
        /// Path of the offending table
        path: String,
        /// What went wrong
        reason: String,
    },
}
