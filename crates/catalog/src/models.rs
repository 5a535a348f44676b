use exn::ResultExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ErrorKind, Result};

/// Display name and abbreviation of one book in one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInfo {
    pub name: String,
    #[serde(rename = "abbr", alias = "abbreviation")]
    pub abbreviation: String,
}
impl BookInfo {
    /// Placeholder used when a translation has no entry for a book: both
    /// fields are the book id itself.
    pub fn fallback(book_id: &str) -> Self {
        Self { name: book_id.to_string(), abbreviation: book_id.to_string() }
    }
}

/// One translation's verse data, as shipped in a `bible_<code>` asset.
///
/// ```json
/// {
///   "version": "KJV",
///   "description": "King James Version",
///   "total_verses": 31102,
///   "books": { "GEN": { "name": "Genesis", "abbr": "Gen" } },
///   "verses": { "GEN.1.1": "In the beginning God created the heaven and the earth." }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationData {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: String,
    /// Declared verse count. Informational only; see [`Self::from_json`].
    #[serde(default)]
    pub total_verses: usize,
    #[serde(default)]
    pub books: HashMap<String, BookInfo>,
    pub verses: HashMap<String, String>,
}
impl TranslationData {
    /// Parse a translation document.
    ///
    /// A declared `total_verses` that disagrees with the number of verses
    /// actually present is logged, not rejected.
    pub fn from_json(name: &str, bytes: &[u8]) -> Result<Self> {
        let data: Self = serde_json::from_slice(bytes).or_raise(|| ErrorKind::InvalidData(name.to_string()))?;
        if data.total_verses != data.verses.len() {
            tracing::warn!(
                asset = name,
                declared = data.total_verses,
                actual = data.verses.len(),
                "Translation verse count does not match its declared total"
            );
        }
        Ok(data)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.verses.get(key).map(String::as_str)
    }

    pub fn book(&self, book_id: &str) -> Option<&BookInfo> {
        self.books.get(book_id)
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_document() {
        let json = r#"{
            "version": "RST",
            "description": "Russian Synodal",
            "total_verses": 1,
            "books": {"PSA": {"name": "Псалтирь", "abbr": "Пс"}},
            "verses": {"PSA.9.26": "text"}
        }"#;
        let data = TranslationData::from_json("bible_ru", json.as_bytes()).unwrap();
        assert_eq!(data.version, "RST");
        assert_eq!(data.text("PSA.9.26"), Some("text"));
        assert_eq!(data.text("PSA.10.5"), None);
        assert_eq!(data.book("PSA").unwrap().abbreviation, "Пс");
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_abbreviation_alias_and_defaults() {
        let json = br#"{"books": {"GEN": {"name": "Genesis", "abbreviation": "Gen"}}, "verses": {}}"#;
        let data = TranslationData::from_json("bible_xx", json).unwrap();
        assert_eq!(data.book("GEN").unwrap(), &BookInfo { name: "Genesis".into(), abbreviation: "Gen".into() });
        assert!(data.is_empty());
        assert_eq!(data.total_verses, 0);
    }

    #[test]
    fn test_count_mismatch_still_loads() {
        let json = br#"{"total_verses": 31102, "verses": {"GEN.1.1": "In the beginning"}}"#;
        let data = TranslationData::from_json("bible_xx", json).unwrap();
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_missing_verses_is_invalid() {
        let err = TranslationData::from_json("bible_xx", br#"{"version": "x"}"#).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidData("bible_xx".to_string()));
        assert!(TranslationData::from_json("bible_xx", b"[]").is_err());
    }

    #[test]
    fn test_fallback_book_info() {
        assert_eq!(BookInfo::fallback("XYZ"), BookInfo { name: "XYZ".into(), abbreviation: "XYZ".into() });
    }
}
