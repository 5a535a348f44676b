//! Verse data for every display language.
//!
//! Assets are plain JSON documents looked up by name through an
//! [`AssetSource`]: the files embedded at build time ([`Builtins`]), an
//! on-disk data directory ([`DirectorySource`]), or both ([`Layered`]).
//!
//! - **Translations** (`bible_<code>`) are parsed into [`TranslationData`]
//!   and cached by the [`VerseCatalog`] for the life of the process.
//! - **The curated list** (`curated_verses`) is an ordered list of
//!   language-independent references, see [`CuratedList`].

mod catalog;
mod codec;
mod curated;
pub mod error;
mod models;
mod source;

pub use crate::catalog::VerseCatalog;
pub use crate::codec::Compression;
pub use crate::curated::CuratedList;
pub use crate::models::{BookInfo, TranslationData};
pub use crate::source::{AssetSource, Builtins, DirectorySource, Layered};
