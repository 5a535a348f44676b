//! Catalog Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A catalog error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// No source provides an asset with this name
    #[display("asset not found: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    /// Asset names are file stems; anything path-like is rejected
    #[display("invalid asset name: {_0:?}")]
    InvalidAssetName(#[error(not(source))] String),
    /// Reading an asset file failed
    #[display("failed to read asset file: {}", _0.display())]
    Io(#[error(not(source))] PathBuf),
    /// Compressed asset could not be decompressed
    #[display("failed to decompress asset: {_0}")]
    Decompression(#[error(not(source))] String),
    /// Asset is not a document of the expected shape
    #[display("invalid asset data: {_0}")]
    InvalidData(#[error(not(source))] String),
    /// Verse data for the language could not be loaded (now or earlier in
    /// this process). Callers show the "unavailable" message.
    #[display("verses unavailable for language: {_0}")]
    Unavailable(#[error(not(source))] String),
    /// Verse data is loaded but has no text for this reference. Callers
    /// show the "verse not found" message.
    #[display("verse not found: {_0}")]
    VerseNotFound(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        // Failed loads are cached for the life of the process.
        matches!(self, Self::Io(_))
    }
}
