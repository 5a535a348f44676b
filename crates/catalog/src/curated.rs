use exn::ResultExt;
use serde::Deserialize;

use crate::AssetSource;
use crate::error::{ErrorKind, Result};

/// The curated list document: `{"version", "description", "references"}`
/// or a bare array. Only the references matter.
#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Wrapped { references: Vec<String> },
    Bare(Vec<String>),
}

/// Ordered, language-independent list of candidate references.
///
/// Entries are kept as raw strings in Masoretic numbering. They are not
/// validated here: a malformed entry is still a slot in the list (so the
/// index of every other entry is stable) and is dealt with at lookup time.
///
/// # Examples
///
/// ```
/// use verse_catalog::CuratedList;
///
/// let list = CuratedList::from_references(["PSA.23.1", "JHN.3.16"]);
/// assert_eq!(list.reference_at(1), Some("JHN.3.16"));
/// assert_eq!(list.reference_at(2), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CuratedList {
    references: Vec<String>,
}
impl CuratedList {
    /// Asset name of the curated list.
    pub const ASSET: &'static str = "curated_verses";

    /// Load the curated list from `source`. Never fails: a missing or
    /// unreadable asset yields an empty list, which callers turn into the
    /// "unavailable" message.
    #[tracing::instrument(skip(source), fields(source = source.name()))]
    pub fn load(source: &dyn AssetSource) -> Self {
        let parsed = source.require(Self::ASSET).and_then(|bytes| Self::from_json(&bytes));
        match parsed {
            Ok(list) => {
                tracing::debug!(references = list.len(), "Loaded curated list");
                list
            },
            Err(err) => {
                tracing::warn!(error = ?err, "Curated list unavailable, continuing with an empty list");
                Self::default()
            },
        }
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let document: Document =
            serde_json::from_slice(bytes).or_raise(|| ErrorKind::InvalidData(Self::ASSET.to_string()))?;
        let references = match document {
            Document::Wrapped { references, .. } => references,
            Document::Bare(references) => references,
        };
        Ok(Self { references })
    }

    pub fn from_references(references: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self { references: references.into_iter().map(Into::into).collect() }
    }

    pub fn reference_at(&self, index: usize) -> Option<&str> {
        self.references.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.references.len()
    }

    pub fn is_empty(&self) -> bool {
        self.references.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.references.iter().map(String::as_str)
    }
}
