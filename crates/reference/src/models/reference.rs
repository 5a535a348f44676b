use exn::ResultExt;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// Language-independent verse identifier, serialized as `BOOK.CHAPTER.VERSE`.
///
/// Book ids are the short uppercase codes used by the translation assets
/// (`GEN`, `1SA`, `PSA`, `JHN`). Chapters and verses are always one or more;
/// zero (or a leading `+`/`-`) is rejected by the parser, so every value of
/// this type formats back to the exact string it was parsed from.
///
/// # Examples
///
/// ```
/// use verse_reference::CanonicalReference;
///
/// let reference: CanonicalReference = "JHN.3.16".parse().unwrap();
/// assert_eq!(reference.book_id(), "JHN");
/// assert_eq!((reference.chapter(), reference.verse()), (3, 16));
/// assert_eq!(reference.to_string(), "JHN.3.16");
/// assert!("JHN.3".parse::<CanonicalReference>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalReference {
    book_id: String,
    chapter: u32,
    verse: u32,
}
impl CanonicalReference {
    /// Build a reference from its parts, validating the same invariants as
    /// the parser.
    pub fn new(book_id: impl Into<String>, chapter: u32, verse: u32) -> Result<Self, Error> {
        let book_id = book_id.into();
        if !is_book_id(&book_id) {
            exn::bail!(ErrorKind::ParseError { field: "book", value: book_id });
        }
        if chapter == 0 {
            exn::bail!(ErrorKind::ParseError { field: "chapter", value: chapter.to_string() });
        }
        if verse == 0 {
            exn::bail!(ErrorKind::ParseError { field: "verse", value: verse.to_string() });
        }
        Ok(Self { book_id, chapter, verse })
    }

    pub fn book_id(&self) -> &str {
        &self.book_id
    }

    pub fn chapter(&self) -> u32 {
        self.chapter
    }

    pub fn verse(&self) -> u32 {
        self.verse
    }

    /// Returns `true` if this reference points into the given book.
    pub fn is_book(&self, book_id: &str) -> bool {
        self.book_id == book_id
    }

    /// Same book, different chapter/verse. Skips validation because both
    /// numbers are only ever produced by the Psalm mapper from values that
    /// are already positive.
    pub(crate) fn relocate(&self, chapter: u32, verse: u32) -> Self {
        debug_assert!(chapter > 0 && verse > 0);
        Self { book_id: self.book_id.clone(), chapter, verse }
    }
}

fn is_book_id(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

/// Strict positive integer: digits only, no sign, no leading zero.
fn positive(field: &'static str, s: &str) -> Result<u32, Error> {
    let valid = !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) && !s.starts_with('0');
    if !valid {
        exn::bail!(ErrorKind::ParseError { field, value: s.to_string() });
    }
    s.parse::<u32>().or_raise(|| ErrorKind::ParseError { field, value: s.to_string() })
}

impl FromStr for CanonicalReference {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('.');
        let (Some(book), Some(chapter), Some(verse), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            exn::bail!(ErrorKind::MalformedReference(s.to_string()));
        };
        if !is_book_id(book) {
            exn::bail!(ErrorKind::ParseError { field: "book", value: book.to_string() });
        }
        Ok(Self {
            book_id: book.to_string(),
            chapter: positive("chapter", chapter)?,
            verse: positive("verse", verse)?,
        })
    }
}
impl TryFrom<&str> for CanonicalReference {
    type Error = Error;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}
impl TryFrom<String> for CanonicalReference {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}

impl Display for CanonicalReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}.{}.{}", self.book_id, self.chapter, self.verse)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for CanonicalReference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for CanonicalReference {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: Error| serde::de::Error::custom(&*e))
    }
}
