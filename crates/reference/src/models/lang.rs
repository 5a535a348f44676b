//! Display languages and the translation each one is bundled with.
//!
//! A [`Language`] is just a normalized code; anything that parses is a valid
//! language. Only codes present in the static table below carry metadata
//! (native name, translation, Psalm numbering, sentinel messages). Unknown
//! codes still flow through the catalog and simply resolve to "no data".

use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{Error, ErrorKind};
use crate::psalms::Numbering;

/// Static metadata for a supported language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    /// Normalized code, e.g. `"zh_CN"`.
    pub code: &'static str,
    /// The language's name for itself.
    pub native_name: &'static str,
    /// Name of the bundled translation.
    pub translation: &'static str,
    /// Psalm numbering convention followed by the translation.
    pub numbering: Numbering,
    /// Shown in place of a reference when nothing can be selected.
    pub error_label: &'static str,
    /// Shown when the language's data (or the candidate list) is missing.
    pub unavailable: &'static str,
    /// Shown when the selected verse has no text in the translation.
    pub not_found: &'static str,
}

/// Display language of a verse.
///
/// # Examples
///
/// ```
/// use verse_reference::{Language, Numbering};
///
/// let russian: Language = "ru".parse().unwrap();
/// assert_eq!(russian.numbering(), Numbering::Septuagint);
/// assert_eq!(russian.asset_name(), "bible_ru");
///
/// let chinese: Language = "zh-cn".parse().unwrap();
/// assert_eq!(chinese.code(), "zh_CN");
///
/// let unknown: Language = "tlh".parse().unwrap();
/// assert!(!unknown.is_known());
/// assert_eq!(unknown.numbering(), Numbering::Masoretic);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Language {
    code: String,
}
impl Language {
    /// Code of the built-in default language. English, because it is the
    /// only translation embedded in the binary; other languages need a data
    /// directory. Hosts that expect another default (Korean, say) set the
    /// configured `language` rather than relying on this.
    pub const DEFAULT_CODE: &'static str = "en";

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn info(&self) -> Option<&'static LanguageInfo> {
        LANGUAGES.get(self.code.as_str()).copied()
    }

    pub fn is_known(&self) -> bool {
        self.info().is_some()
    }

    /// Psalm numbering for this language's translation. Unknown languages
    /// use the default (Masoretic) numbering of the curated list.
    pub fn numbering(&self) -> Numbering {
        self.info().map(|i| i.numbering).unwrap_or_default()
    }

    /// Name of the translation asset, without extension.
    pub fn asset_name(&self) -> String {
        format!("bible_{}", self.code)
    }

    pub fn native_name(&self) -> &str {
        self.info().map(|i| i.native_name).unwrap_or(self.code.as_str())
    }

    /// Sentinel strings, falling back to English for unknown languages.
    pub fn messages(&self) -> &'static LanguageInfo {
        self.info().unwrap_or(&ENGLISH)
    }

    /// All supported languages, in display order.
    pub fn all() -> impl Iterator<Item = Language> {
        TABLE.iter().map(|info| Language { code: info.code.to_string() })
    }

    fn normalize(s: &str) -> Result<String, Error> {
        let trimmed = s.trim();
        let valid = !trimmed.is_empty()
            && trimmed.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-');
        if !valid {
            exn::bail!(ErrorKind::InvalidLanguage(s.to_string()));
        }
        let mut parts = trimmed.splitn(2, ['_', '-']);
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        if language.is_empty() {
            exn::bail!(ErrorKind::InvalidLanguage(s.to_string()));
        }
        Ok(match parts.next() {
            Some(region) if !region.is_empty() => format!("{language}_{}", region.to_ascii_uppercase()),
            Some(_) => exn::bail!(ErrorKind::InvalidLanguage(s.to_string())),
            None => language,
        })
    }
}
/// [`Language::DEFAULT_CODE`], English.
impl Default for Language {
    fn default() -> Self {
        Self { code: Self::DEFAULT_CODE.to_string() }
    }
}
impl FromStr for Language {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { code: Self::normalize(s)? })
    }
}
impl TryFrom<String> for Language {
    type Error = Error;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().parse()
    }
}
impl Display for Language {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.code)
    }
}

const ENGLISH: LanguageInfo = LanguageInfo {
    code: "en",
    native_name: "English",
    translation: "King James Version",
    numbering: Numbering::Masoretic,
    error_label: "Error",
    unavailable: "Unable to load Bible verses.",
    not_found: "Verse not found.",
};

static TABLE: [LanguageInfo; 9] = [
    LanguageInfo {
        code: "ko",
        native_name: "한국어",
        translation: "개역한글",
        numbering: Numbering::Masoretic,
        error_label: "오류",
        unavailable: "성경 구절을 불러올 수 없습니다.",
        not_found: "구절을 찾을 수 없습니다.",
    },
    ENGLISH,
    LanguageInfo {
        code: "es",
        native_name: "Español",
        translation: "Reina-Valera 1909",
        numbering: Numbering::Masoretic,
        error_label: "Error",
        unavailable: "No se pueden cargar los versículos bíblicos.",
        not_found: "Versículo no encontrado.",
    },
    LanguageInfo {
        code: "pt",
        native_name: "Português",
        translation: "Bíblia Portuguesa Mundial",
        numbering: Numbering::Masoretic,
        error_label: "Erro",
        unavailable: "Não foi possível carregar os versículos bíblicos.",
        not_found: "Versículo não encontrado.",
    },
    LanguageInfo {
        code: "fr",
        native_name: "Français",
        translation: "Louis Segond 1910",
        numbering: Numbering::Masoretic,
        error_label: "Erreur",
        unavailable: "Impossible de charger les versets bibliques.",
        not_found: "Verset introuvable.",
    },
    LanguageInfo {
        code: "de",
        native_name: "Deutsch",
        translation: "Luther 1912",
        numbering: Numbering::Masoretic,
        error_label: "Fehler",
        unavailable: "Bibelverse konnten nicht geladen werden.",
        not_found: "Vers nicht gefunden.",
    },
    LanguageInfo {
        code: "ru",
        native_name: "Русский",
        translation: "Russian Synodal",
        numbering: Numbering::Septuagint,
        error_label: "Ошибка",
        unavailable: "Не удалось загрузить стихи Библии.",
        not_found: "Стих не найден.",
    },
    LanguageInfo {
        code: "zh_CN",
        native_name: "简体中文",
        translation: "和合本",
        numbering: Numbering::Masoretic,
        error_label: "错误",
        unavailable: "无法加载圣经经文。",
        not_found: "未找到经文。",
    },
    LanguageInfo {
        code: "zh_TW",
        native_name: "繁體中文",
        translation: "和合本",
        numbering: Numbering::Masoretic,
        error_label: "錯誤",
        unavailable: "無法載入聖經經文。",
        not_found: "找不到經文。",
    },
];

static LANGUAGES: LazyLock<HashMap<&'static str, &'static LanguageInfo>> =
    LazyLock::new(|| TABLE.iter().map(|info| (info.code, info)).collect());

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("en", "en")]
    #[case("EN", "en")]
    #[case(" ko ", "ko")]
    #[case("zh_CN", "zh_CN")]
    #[case("zh-cn", "zh_CN")]
    #[case("ZH_tw", "zh_TW")]
    #[case("pt-br", "pt_BR")]
    fn test_normalize(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(input.parse::<Language>().unwrap().code(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("en_")]
    #[case("../etc")]
    #[case("en/US")]
    #[case("e n")]
    #[case("_en")]
    fn test_invalid(#[case] input: &str) {
        let err = input.parse::<Language>().unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidLanguage(_)));
    }

    #[test]
    fn only_russian_uses_septuagint_numbering() {
        let septuagint: Vec<_> =
            Language::all().filter(|l| l.numbering() == Numbering::Septuagint).map(|l| l.code().to_string()).collect();
        assert_eq!(septuagint, vec!["ru"]);
    }

    #[test]
    fn all_languages_are_known_and_round_trip() {
        assert_eq!(Language::all().count(), 9);
        for language in Language::all() {
            assert!(language.is_known());
            assert_eq!(language.code().parse::<Language>().unwrap(), language);
            assert_eq!(language.asset_name(), format!("bible_{}", language.code()));
        }
    }

    #[test]
    fn unknown_language_falls_back_to_english_messages() {
        let unknown: Language = "xx".parse().unwrap();
        assert_eq!(unknown.messages().not_found, "Verse not found.");
        assert_eq!(unknown.native_name(), "xx");
        let korean: Language = "ko".parse().unwrap();
        assert_eq!(korean.messages().unavailable, "성경 구절을 불러올 수 없습니다.");
    }

    #[test]
    fn default_is_english() {
        assert_eq!(Language::default().code(), "en");
        assert!(Language::default().is_known());
    }
}
