//! Psalm renumbering between the Masoretic (Hebrew) numbering used by the
//! curated list and the Septuagint/Vulgate numbering used by some
//! translations (e.g. the Russian Synodal).
//!
//! The two conventions agree on Psalms 1–8 and 148–150. In between, the
//! Septuagint merges Psalms 9+10 and 114+115, splits 116 and 147, and is
//! otherwise one behind:
//!
//! | Masoretic        | Septuagint                |
//! |------------------|---------------------------|
//! | 1–9              | unchanged                 |
//! | 10:v             | 9:(v + 21)                |
//! | 11–113:v         | (n − 1):v                 |
//! | 114:v            | 113:v                     |
//! | 115:v            | 113:(v + 8)               |
//! | 116:1–9          | 114:v                     |
//! | 116:10–          | 115:(v − 9)               |
//! | 117–146:v        | (n − 1):v                 |
//! | 147:1–11         | 146:v                     |
//! | 147:12–          | 147:(v − 11)              |
//! | 148–150          | unchanged                 |

use std::borrow::Cow;

use crate::models::CanonicalReference;

const PSALMS: &str = "PSA";

/// Psalm numbering convention followed by a translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Numbering {
    /// Hebrew numbering; the numbering of the curated list.
    #[default]
    Masoretic,
    /// Greek/Latin numbering.
    Septuagint,
}
impl Numbering {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Masoretic => "masoretic",
            Self::Septuagint => "septuagint",
        }
    }
}

/// Rewrites a Masoretic-numbered reference into Septuagint numbering.
///
/// Total over every valid reference: books other than Psalms, Psalm numbers
/// outside 1–150, and verses whose offset would overflow `u32` pass through
/// unchanged.
///
/// # Examples
///
/// ```
/// use verse_reference::{CanonicalReference, to_septuagint};
///
/// let masoretic: CanonicalReference = "PSA.116.15".parse().unwrap();
/// assert_eq!(to_septuagint(&masoretic).to_string(), "PSA.115.6");
/// ```
pub fn to_septuagint(reference: &CanonicalReference) -> CanonicalReference {
    if !reference.is_book(PSALMS) {
        return reference.clone();
    }
    let (psalm, verse) = (reference.chapter(), reference.verse());
    let mapped = match psalm {
        10 => verse.checked_add(21).map(|verse| (9, verse)),
        11..=113 | 117..=146 => Some((psalm - 1, verse)),
        114 => Some((113, verse)),
        115 => verse.checked_add(8).map(|verse| (113, verse)),
        116 if verse <= 9 => Some((114, verse)),
        116 => Some((115, verse - 9)),
        147 if verse <= 11 => Some((146, verse)),
        147 => Some((147, verse - 11)),
        _ => None,
    };
    match mapped {
        Some((psalm, verse)) => reference.relocate(psalm, verse),
        // Verse numbers this large exist in no translation.
        None => reference.clone(),
    }
}

/// Maps a reference between numberings. Only Masoretic → Septuagint is a
/// real transformation; the curated list is always Masoretic.
pub fn map(reference: &CanonicalReference, target: Numbering) -> CanonicalReference {
    match target {
        Numbering::Masoretic => reference.clone(),
        Numbering::Septuagint => to_septuagint(reference),
    }
}

/// String form of [`map`] for raw curated entries.
///
/// Anything that does not parse as `BOOK.CHAPTER.VERSE` is returned as-is so
/// that one bad entry cannot stop selection.
pub fn map_key(key: &str, target: Numbering) -> Cow<'_, str> {
    if target == Numbering::Masoretic {
        return Cow::Borrowed(key);
    }
    match key.parse::<CanonicalReference>() {
        Ok(reference) => {
            let mapped = map(&reference, target);
            if mapped == reference { Cow::Borrowed(key) } else { Cow::Owned(mapped.to_string()) }
        },
        Err(err) => {
            tracing::debug!(reference = key, error = %*err, "Passing malformed reference through unmapped");
            Cow::Borrowed(key)
        },
    }
}
