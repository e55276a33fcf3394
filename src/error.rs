//! Library error taxonomy.
//!
//! Per-file problems (unreadable source, parse failure, broken query) are
//! not errors at this level: the extractor warns and skips the file. The
//! variants here are the conditions a caller can meaningfully react to.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    /// The caller supplied zero files after discovery and filtering.
    #[error("no parseable files found")]
    EmptyInput,

    /// A language name was requested that is not in the registry.
    #[error("unsupported language {0:?}")]
    UnknownLanguage(String),
}
