//! Rule loading errors.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, parsing or validating rules.
///
/// All of these surface before an engine run starts.
#[derive(Debug, Error)]
pub enum RuleError {
    /// Rules file could not be read.
    #[error("Failed to read rules file {path:?}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Rules file could not be written.
    #[error("Failed to write rules file {path:?}: {source}")]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Document is not valid JSON or a record has the wrong shape.
    #[error("Failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),

    /// Top level of the document is not a list.
    #[error("Rules document must be a list of rules")]
    NotAList,

    /// A record is structurally valid JSON but not a valid rule.
    #[error("Rule #{index} ('{name}'): {reason}")]
    Invalid {
        /// Position in the document.
        index: usize,
        /// Rule name.
        name: String,
        /// What is wrong.
        reason: String,
    },
}
