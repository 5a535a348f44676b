use std::sync::Arc;
use time::{Date, OffsetDateTime};
use tracing::instrument;
use verse_catalog::error::ErrorKind as CatalogErrorKind;
use verse_catalog::{CuratedList, VerseCatalog};
use verse_reference::{CanonicalReference, Language, psalms};
use verse_storage::KeyValueStore;

use crate::display::{DisplayVerse, VerseStatus};
use crate::hash;
use crate::seed::DeviceSeed;

/// Picks the verse of the day for one device.
///
/// Selection is a pure function of the seed, the date and the curated list;
/// the language only decides how the chosen entry is rendered. Two
/// languages therefore always show the same passage on the same day (modulo
/// Psalm renumbering, which is applied before lookup).
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use time::macros::date;
/// use verse_catalog::VerseCatalog;
/// use verse_daily::{DailyVerseSelector, DeviceSeed};
/// use verse_reference::Language;
///
/// let selector = DailyVerseSelector::new(Arc::new(VerseCatalog::builtin()), DeviceSeed::from_value(42).unwrap());
/// let verse = selector.verse_for(date!(2025 - 01 - 15), &Language::default());
/// assert_eq!(verse.reference, "1 John 4:19");
/// assert_eq!(verse.text, "We love him, because he first loved us.");
/// ```
pub struct DailyVerseSelector {
    catalog: Arc<VerseCatalog>,
    curated: Arc<CuratedList>,
    seed: DeviceSeed,
}
impl DailyVerseSelector {
    /// Selects from the catalog's own curated list.
    pub fn new(catalog: Arc<VerseCatalog>, seed: DeviceSeed) -> Self {
        let curated = catalog.curated();
        Self::with_curated(catalog, curated, seed)
    }

    pub fn with_curated(catalog: Arc<VerseCatalog>, curated: Arc<CuratedList>, seed: DeviceSeed) -> Self {
        Self { catalog, curated, seed }
    }

    /// Selector for this device, reading (or creating) its seed in `store`.
    pub async fn connect(catalog: Arc<VerseCatalog>, store: &dyn KeyValueStore) -> Self {
        let seed = DeviceSeed::get_or_create(store).await;
        Self::new(catalog, seed)
    }

    pub fn seed(&self) -> DeviceSeed {
        self.seed
    }

    pub fn catalog(&self) -> &VerseCatalog {
        &self.catalog
    }

    pub fn curated(&self) -> &CuratedList {
        &self.curated
    }

    /// Position in the curated list selected for `date`, or `None` when the
    /// list is empty.
    pub fn index_for(&self, date: Date) -> Option<usize> {
        hash::select(self.seed.value(), date, self.curated.len())
    }

    /// The raw curated entry selected for `date`, in Masoretic numbering.
    pub fn reference_for(&self, date: Date) -> Option<&str> {
        self.index_for(date).and_then(|index| self.curated.reference_at(index))
    }

    /// The verse for `date`, rendered in `language`.
    ///
    /// Never fails. Missing data turns into a [`DisplayVerse`] carrying the
    /// language's "unavailable" or "not found" message.
    #[instrument(skip(self, language), fields(date = %date, language = %language))]
    pub fn verse_for(&self, date: Date, language: &Language) -> DisplayVerse {
        let Some(entry) = self.reference_for(date) else {
            tracing::warn!("Curated list is empty");
            return DisplayVerse::unavailable(language);
        };
        let key = psalms::map_key(entry, language.numbering());
        let text = match self.catalog.lookup_key(&key, language) {
            Ok(text) => text,
            Err(err) => {
                return match &*err {
                    CatalogErrorKind::VerseNotFound(_) => {
                        tracing::warn!(reference = %key, "Selected verse is missing from the translation");
                        DisplayVerse::not_found(&key, language)
                    },
                    _ => DisplayVerse::unavailable(language),
                };
            },
        };
        let Ok(reference) = key.parse::<CanonicalReference>() else {
            tracing::warn!(reference = %key, "Curated entry is not a canonical reference");
            return DisplayVerse { text, status: VerseStatus::Resolved, ..DisplayVerse::not_found(&key, language) };
        };
        let book = self.catalog.book_info(reference.book_id(), language);
        DisplayVerse {
            reference: format!("{} {}:{}", book.name, reference.chapter(), reference.verse()),
            text,
            book_name: book.name,
            book_abbr: book.abbreviation,
            book_id: reference.book_id().to_string(),
            chapter: reference.chapter(),
            verse: reference.verse(),
            status: VerseStatus::Resolved,
        }
    }

    /// The verse for the current local date.
    pub fn today(&self, language: &Language) -> DisplayVerse {
        self.verse_for(local_today(), language)
    }
}

/// Today's date in the local time zone, or in UTC when the local offset
/// cannot be determined.
pub fn local_today() -> Date {
    match OffsetDateTime::now_local() {
        Ok(now) => now.date(),
        Err(err) => {
            tracing::debug!(error = %err, "Local offset unavailable, using UTC");
            OffsetDateTime::now_utc().date()
        },
    }
}
