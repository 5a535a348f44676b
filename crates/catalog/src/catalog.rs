use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use tracing::instrument;
use verse_reference::{CanonicalReference, Language};

use crate::error::{Error, ErrorKind, Result};
use crate::{AssetSource, BookInfo, Builtins, CuratedList, TranslationData};

type Slot = Arc<OnceLock<Option<Arc<TranslationData>>>>;

/// Read-through cache of translations, keyed by language.
///
/// Each language is loaded at most once per catalog, even when many threads
/// ask for it at the same time: the first caller parses the asset while the
/// others wait on the same [`OnceLock`]. A failed load is remembered too, so
/// an unavailable language stays unavailable (and cheap) for the life of the
/// catalog.
///
/// # Examples
///
/// ```
/// use verse_catalog::{VerseCatalog, error::ErrorKind};
/// use verse_reference::Language;
///
/// let catalog = VerseCatalog::builtin();
/// let english = Language::default();
/// let text = catalog.lookup_key("JHN.3.16", &english).unwrap();
/// assert!(text.starts_with("For God so loved the world"));
///
/// let missing = catalog.lookup_key("JHN.3.17", &english).unwrap_err();
/// assert!(matches!(&*missing, ErrorKind::VerseNotFound(_)));
///
/// let klingon: Language = "tlh".parse().unwrap();
/// let unavailable = catalog.lookup_key("JHN.3.16", &klingon).unwrap_err();
/// assert!(matches!(&*unavailable, ErrorKind::Unavailable(_)));
/// ```
pub struct VerseCatalog {
    source: Arc<dyn AssetSource>,
    translations: Mutex<HashMap<Language, Slot>>,
    curated: OnceLock<Arc<CuratedList>>,
}
impl VerseCatalog {
    pub fn new(source: Arc<dyn AssetSource>) -> Self {
        Self { source, translations: Mutex::new(HashMap::new()), curated: OnceLock::new() }
    }

    /// A catalog over the embedded assets only.
    pub fn builtin() -> Self {
        Self::new(Arc::new(Builtins))
    }

    /// The curated list, loaded from the same source on first use.
    pub fn curated(&self) -> Arc<CuratedList> {
        self.curated.get_or_init(|| Arc::new(CuratedList::load(self.source.as_ref()))).clone()
    }

    fn slot(&self, language: &Language) -> Slot {
        // The map lock is only held long enough to find or create the slot;
        // the (slow) load happens outside it.
        let mut translations = self.translations.lock().unwrap_or_else(PoisonError::into_inner);
        translations.entry(language.clone()).or_default().clone()
    }

    /// Returns `true` if a load of this language has been attempted.
    pub fn is_cached(&self, language: &Language) -> bool {
        let translations = self.translations.lock().unwrap_or_else(PoisonError::into_inner);
        translations.get(language).is_some_and(|slot| slot.get().is_some())
    }

    /// Load (or fetch from cache) the translation for `language`.
    pub fn load(&self, language: &Language) -> Result<Arc<TranslationData>> {
        let slot = self.slot(language);
        let loaded = slot.get_or_init(|| match self.read(language) {
            Ok(data) => Some(Arc::new(data)),
            Err(err) => {
                tracing::warn!(language = %language, error = ?err, "Translation unavailable");
                None
            },
        });
        loaded.clone().ok_or_else(|| Error::from(ErrorKind::Unavailable(language.code().to_string())))
    }

    #[instrument(skip(self, language), fields(language = %language, source = self.source.name()))]
    fn read(&self, language: &Language) -> Result<TranslationData> {
        let asset = language.asset_name();
        let bytes = self.source.require(&asset)?;
        let data = TranslationData::from_json(&asset, &bytes)?;
        tracing::info!(verses = data.len(), books = data.books.len(), version = %data.version, "Loaded translation");
        Ok(data)
    }

    /// Text of a verse. The reference must already be in the numbering the
    /// language's translation uses.
    pub fn lookup(&self, reference: &CanonicalReference, language: &Language) -> Result<String> {
        self.lookup_key(&reference.to_string(), language)
    }

    /// Text of a verse by its raw `BOOK.CHAPTER.VERSE` key.
    pub fn lookup_key(&self, key: &str, language: &Language) -> Result<String> {
        let data = self.load(language)?;
        match data.text(key) {
            Some(text) => Ok(text.to_string()),
            None => exn::bail!(ErrorKind::VerseNotFound(key.to_string())),
        }
    }

    /// Book name and abbreviation, falling back to the book id itself when
    /// the language or the book is unknown.
    pub fn book_info(&self, book_id: &str, language: &Language) -> BookInfo {
        self.load(language)
            .ok()
            .and_then(|data| data.book(book_id).cloned())
            .unwrap_or_else(|| BookInfo::fallback(book_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    /// Serves a fixed set of assets and counts how often each is read.
    struct Fixture {
        assets: HashMap<&'static str, &'static str>,
        reads: AtomicUsize,
    }
    impl Fixture {
        fn new(assets: impl IntoIterator<Item = (&'static str, &'static str)>) -> Self {
            Self { assets: assets.into_iter().collect(), reads: AtomicUsize::new(0) }
        }
    }
    impl AssetSource for Fixture {
        fn name(&self) -> &str {
            "fixture"
        }

        fn load(&self, asset: &str) -> Result<Option<Cow<'static, [u8]>>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            // Widen the race window for concurrent first access.
            thread::sleep(Duration::from_millis(20));
            Ok(self.assets.get(asset).copied().map(|s| Cow::Borrowed(s.as_bytes())))
        }
    }

    const RUSSIAN: &str = r#"{
        "version": "RST", "total_verses": 2,
        "books": {"PSA": {"name": "Псалтирь", "abbr": "Пс"}},
        "verses": {"PSA.9.26": "Псалом девятый", "PSA.22.1": "Господь — Пастырь мой"}
    }"#;

    fn ru() -> Language {
        "ru".parse().unwrap()
    }

    #[test]
    fn lookup_distinguishes_missing_verse_from_missing_language() {
        let catalog = VerseCatalog::new(Arc::new(Fixture::new([("bible_ru", RUSSIAN)])));
        assert_eq!(catalog.lookup_key("PSA.22.1", &ru()).unwrap(), "Господь — Пастырь мой");
        let reference: CanonicalReference = "PSA.9.26".parse().unwrap();
        assert_eq!(catalog.lookup(&reference, &ru()).unwrap(), "Псалом девятый");

        let err = catalog.lookup_key("PSA.10.5", &ru()).unwrap_err();
        assert_eq!(*err, ErrorKind::VerseNotFound("PSA.10.5".to_string()));
        let err = catalog.lookup_key("PSA.22.1", &Language::default()).unwrap_err();
        assert_eq!(*err, ErrorKind::Unavailable("en".to_string()));
    }

    #[test]
    fn failed_load_is_cached() {
        let fixture = Arc::new(Fixture::new([("bible_xx", "{ not json")]));
        let catalog = VerseCatalog::new(fixture.clone());
        let xx: Language = "xx".parse().unwrap();
        assert!(!catalog.is_cached(&xx));
        for _ in 0..3 {
            let err = catalog.load(&xx).unwrap_err();
            assert_eq!(*err, ErrorKind::Unavailable("xx".to_string()));
        }
        assert!(catalog.is_cached(&xx));
        assert_eq!(fixture.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_first_access_loads_once() {
        let fixture = Arc::new(Fixture::new([("bible_ru", RUSSIAN)]));
        let catalog = Arc::new(VerseCatalog::new(fixture.clone()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let catalog = catalog.clone();
                thread::spawn(move || catalog.lookup_key("PSA.22.1", &ru()).unwrap())
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "Господь — Пастырь мой");
        }
        assert_eq!(fixture.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn languages_are_cached_independently() {
        let fixture = Arc::new(Fixture::new([("bible_ru", RUSSIAN)]));
        let catalog = VerseCatalog::new(fixture.clone());
        catalog.load(&ru()).unwrap();
        assert!(catalog.load(&Language::default()).is_err());
        catalog.load(&ru()).unwrap();
        assert_eq!(fixture.reads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn book_info_falls_back_to_id() {
        let catalog = VerseCatalog::new(Arc::new(Fixture::new([("bible_ru", RUSSIAN)])));
        assert_eq!(catalog.book_info("PSA", &ru()).name, "Псалтирь");
        assert_eq!(catalog.book_info("JHN", &ru()), BookInfo::fallback("JHN"));
        assert_eq!(catalog.book_info("PSA", &Language::default()), BookInfo::fallback("PSA"));
    }

    #[test]
    fn builtin_english_keys_round_trip() {
        let catalog = VerseCatalog::builtin();
        let data = catalog.load(&Language::default()).unwrap();
        assert_eq!(data.len(), data.total_verses);
        assert_eq!(data.books.len(), 66);
        for key in data.verses.keys() {
            let reference: CanonicalReference = key.parse().unwrap();
            assert_eq!(&reference.to_string(), key);
            assert!(data.book(reference.book_id()).is_some(), "no book entry for {key}");
        }
    }

    #[test]
    fn every_curated_reference_resolves_in_english() {
        let catalog = VerseCatalog::builtin();
        let english = Language::default();
        let curated = catalog.curated();
        assert!(!curated.is_empty());
        for key in curated.iter() {
            assert!(catalog.lookup_key(key, &english).is_ok(), "{key} has no English text");
        }
        assert!(Arc::ptr_eq(&curated, &catalog.curated()));
    }
}
