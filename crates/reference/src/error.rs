//! Reference Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A reference error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for reference operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The string is not in `BOOK.CHAPTER.VERSE` form.
    #[display("malformed reference: {_0}")]
    MalformedReference(#[error(not(source))] String),
    /// A component was present but could not be parsed.
    #[display("failed to parse field '{field}', found value: {value}")]
    ParseError {
        /// The component that failed to parse.
        field: &'static str,
        /// The offending input.
        value: String,
    },
    /// The language code is empty or contains characters that can never
    /// name a translation asset.
    #[display("invalid language code: {_0}")]
    InvalidLanguage(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Parsing is deterministic; the same input fails the same way.
        false
    }
}
