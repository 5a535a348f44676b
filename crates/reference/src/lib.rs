pub mod error;
mod models;
pub mod psalms;

pub use crate::models::{CanonicalReference, Language, LanguageInfo};
pub use crate::psalms::{Numbering, to_septuagint};
