//! The persisted display-language choice.
//!
//! The preference lives in the same store as the device seed so that every
//! process on the device shows the same language.

use exn::ResultExt;
use tracing::instrument;
use verse_reference::Language;
use verse_storage::{KeyValueStore, Value};

use crate::error::{ErrorKind, Result};

/// Store key holding the language code.
pub const KEY: &str = "language";

/// The stored preference, if there is a usable one.
///
/// A stored code that is not a supported language is ignored (and logged),
/// as if nothing were stored.
#[instrument(skip(store), fields(store = store.name()))]
pub async fn load(store: &dyn KeyValueStore) -> Result<Option<Language>> {
    let Some(value) = store.get(KEY).await.or_raise(|| ErrorKind::Store)? else {
        return Ok(None);
    };
    let language = value.as_text().and_then(|code| code.parse::<Language>().ok()).filter(Language::is_known);
    if language.is_none() {
        tracing::warn!(stored = %value, "Ignoring unsupported stored language");
    }
    Ok(language)
}

/// Persist `language` as the preference. Only supported languages can be
/// saved.
#[instrument(skip(store), fields(store = store.name()))]
pub async fn save(store: &dyn KeyValueStore, language: &Language) -> Result<()> {
    if !language.is_known() {
        exn::bail!(ErrorKind::UnsupportedLanguage(language.code().to_string()));
    }
    store.set(KEY, Value::from(language.code())).await.or_raise(|| ErrorKind::Store)
}

/// Forget the preference. Returns `false` if none was stored.
pub async fn clear(store: &dyn KeyValueStore) -> Result<bool> {
    store.remove(KEY).await.or_raise(|| ErrorKind::Store)
}

/// The language to display: an explicit choice, else the stored preference,
/// else the configured default, else [`Language::default()`].
///
/// A store that cannot be read counts as having no preference.
pub async fn resolve(
    explicit: Option<Language>,
    store: &dyn KeyValueStore,
    configured: Option<Language>,
) -> Language {
    if let Some(language) = explicit {
        return language;
    }
    let stored = match load(store).await {
        Ok(stored) => stored,
        Err(err) => {
            tracing::warn!(error = ?err, "Could not read language preference");
            None
        },
    };
    stored.or(configured).unwrap_or_default()
}
