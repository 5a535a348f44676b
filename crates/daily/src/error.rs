//! Daily Error Types
//!
//! Selection itself never fails; these are for the operations around it
//! that change persisted state.

use derive_more::{Display, Error};

/// A daily-verse error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for daily-verse operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The key-value store could not be read or written
    #[display("device store unavailable")]
    Store,
    /// Only languages with bundled metadata can be saved as a preference
    #[display("unsupported language: {_0}")]
    UnsupportedLanguage(#[error(not(source))] String),
    /// Seeds are non-negative and fit in a signed 64-bit integer
    #[display("invalid device seed: {_0}")]
    InvalidSeed(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store)
    }
}
