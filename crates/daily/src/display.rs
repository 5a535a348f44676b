use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};
use verse_reference::Language;

/// Whether a [`DisplayVerse`] carries real verse text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerseStatus {
    Resolved,
    /// The selected reference has no text in the language's translation.
    NotFound,
    /// No candidate list, or no verse data for the language.
    Unavailable,
}

/// A selected verse, ready to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayVerse {
    /// `"<book name> <chapter>:<verse>"`, or a placeholder when unresolved.
    pub reference: String,
    pub text: String,
    pub book_name: String,
    pub book_abbr: String,
    pub book_id: String,
    pub chapter: u32,
    pub verse: u32,
    pub status: VerseStatus,
}
impl DisplayVerse {
    pub(crate) fn unavailable(language: &Language) -> Self {
        let messages = language.messages();
        Self::placeholder(messages.error_label, messages.unavailable, VerseStatus::Unavailable)
    }

    pub(crate) fn not_found(key: &str, language: &Language) -> Self {
        Self::placeholder(key, language.messages().not_found, VerseStatus::NotFound)
    }

    fn placeholder(reference: &str, text: &str, status: VerseStatus) -> Self {
        Self {
            reference: reference.to_string(),
            text: text.to_string(),
            book_name: String::new(),
            book_abbr: String::new(),
            book_id: String::new(),
            chapter: 0,
            verse: 0,
            status,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == VerseStatus::Resolved
    }
}
impl Display for DisplayVerse {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}\n{}", self.text, self.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinels_are_localized() {
        let korean: Language = "ko".parse().unwrap();
        let verse = DisplayVerse::unavailable(&korean);
        assert_eq!(verse.reference, "오류");
        assert_eq!(verse.text, "성경 구절을 불러올 수 없습니다.");
        assert_eq!(verse.status, VerseStatus::Unavailable);

        let verse = DisplayVerse::not_found("PSA.9.26", &"xx".parse().unwrap());
        assert_eq!(verse.reference, "PSA.9.26");
        assert_eq!(verse.text, "Verse not found.");
        assert!(verse.book_name.is_empty() && verse.book_id.is_empty());
        assert!(!verse.is_resolved());
    }

    #[test]
    fn serializes_status_in_snake_case() {
        let verse = DisplayVerse::not_found("GEN.1.1", &Language::default());
        let json = serde_json::to_value(&verse).unwrap();
        assert_eq!(json["status"], "not_found");
        assert_eq!(json["chapter"], 0);
    }
}
