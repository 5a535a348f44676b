//! Configuration for the `verse` tools.
//!
//! Values are layered, later layers winning:
//!
//! 1. built-in defaults,
//! 2. `config.toml`, `config.yaml`/`config.yml` and `config.json` in the
//!    platform configuration directory (or a single file given explicitly),
//! 3. `VERSE_*` environment variables, with `__` separating nested keys
//!    (`VERSE_STORE__BACKEND=sqlite`).

pub mod error;

use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;
use verse_reference::Language;

use crate::error::{Error, ErrorKind, Result};

/// Prefix of environment variables read as configuration.
pub const ENV_PREFIX: &str = "VERSE_";

/// Variables under [`ENV_PREFIX`] that are not configuration keys.
const ENV_IGNORED: &[&str] = &["log", "config"];

const FILE_STEM: &str = "config";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Display language used when none is given and none is stored.
    pub language: Option<String>,
    pub data: DataConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory of asset overrides, searched before the embedded assets.
    pub directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Directory (local) or database file (sqlite). Defaults to a location
    /// in the platform data directory.
    pub path: Option<PathBuf>,
}

/// Where the device seed and language preference are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// One JSON file per key in a directory.
    #[default]
    Local,
    /// A single SQLite database.
    Sqlite,
}
impl StoreBackend {
    fn default_location(&self) -> &'static str {
        match self {
            Self::Local => "store",
            Self::Sqlite => "verse.sqlite3",
        }
    }
}

impl Config {
    /// Load configuration from the default locations, or from `explicit`
    /// instead of the configuration directory when given.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let search = project_dirs().map(|dirs| dirs.config_dir().to_path_buf());
        Self::from_figment(Self::figment(explicit, search.as_deref())?)
    }

    /// The layered provider stack. `search` is the directory scanned for
    /// `config.*` files when no `explicit` file is given.
    pub fn figment(explicit: Option<&Path>, search: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        match (explicit, search) {
            (Some(file), _) => {
                if !file.is_file() {
                    exn::bail!(ErrorKind::FileNotFound(file.to_path_buf()));
                }
                figment = merge_file(figment, file)?;
            },
            (None, Some(directory)) => {
                for extension in ["toml", "yaml", "yml", "json"] {
                    let file = directory.join(FILE_STEM).with_extension(extension);
                    if file.is_file() {
                        figment = merge_file(figment, &file)?;
                    }
                }
            },
            (None, None) => tracing::debug!("No configuration directory on this platform"),
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__").ignore(ENV_IGNORED)))
    }

    #[instrument(skip(figment))]
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        config.language()?;
        tracing::debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// The configured default language, validated.
    pub fn language(&self) -> Result<Option<Language>> {
        match &self.language {
            None => Ok(None),
            Some(code) => {
                let language = code.parse::<Language>().or_raise(|| ErrorKind::InvalidLanguage(code.clone()))?;
                if !language.is_known() {
                    tracing::warn!(language = %language, "Configured language has no bundled translation");
                }
                Ok(Some(language))
            },
        }
    }

    /// Absolute location of the store for the configured backend.
    pub fn store_path(&self) -> Result<PathBuf> {
        let path = match &self.store.path {
            Some(path) => path.clone(),
            None => {
                let dirs = project_dirs().ok_or_else(|| Error::from(ErrorKind::NoDataDirectory))?;
                dirs.data_dir().join(self.store.backend.default_location())
            },
        };
        std::path::absolute(&path).or_raise(|| ErrorKind::InvalidPath(path.clone()))
    }
}

fn merge_file(figment: Figment, file: &Path) -> Result<Figment> {
    tracing::debug!(file = %file.display(), "Reading configuration file");
    Ok(match file.extension().and_then(|e| e.to_str()) {
        Some("toml") => figment.merge(Toml::file_exact(file)),
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(file)),
        Some("json") => figment.merge(Json::file_exact(file)),
        _ => exn::bail!(ErrorKind::UnsupportedFormat(file.to_path_buf())),
    })
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "verse")
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;
    use rstest::rstest;

    fn load_in(jail: &Jail, explicit: Option<&str>) -> Result<Config> {
        Config::from_figment(Config::figment(explicit.map(Path::new), Some(jail.directory()))?)
    }

    #[test]
    fn test_defaults() {
        Jail::expect_with(|jail| {
            let config = load_in(jail, None).unwrap();
            assert_eq!(config, Config::default());
            assert_eq!(config.store.backend, StoreBackend::Local);
            assert_eq!(config.language().unwrap(), None);
            Ok(())
        });
    }

    #[test]
    fn test_file_then_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                language = "ko"
                [store]
                backend = "sqlite"
                path = "/var/lib/verse/db.sqlite3"
                "#,
            )?;
            let config = load_in(jail, None).unwrap();
            assert_eq!(config.language().unwrap(), Some("ko".parse().unwrap()));
            assert_eq!(config.store.backend, StoreBackend::Sqlite);

            jail.set_env("VERSE_LANGUAGE", "zh-tw");
            jail.set_env("VERSE_STORE__BACKEND", "local");
            jail.set_env("VERSE_DATA__DIRECTORY", "/srv/verse");
            jail.set_env("VERSE_LOG", "debug");
            let config = load_in(jail, None).unwrap();
            assert_eq!(config.language().unwrap().unwrap().code(), "zh_TW");
            assert_eq!(config.store.backend, StoreBackend::Local);
            assert_eq!(config.store.path, Some(PathBuf::from("/var/lib/verse/db.sqlite3")));
            assert_eq!(config.data.directory, Some(PathBuf::from("/srv/verse")));
            Ok(())
        });
    }

    #[test]
    fn test_formats_layer_in_order() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "language = \"de\"")?;
            jail.create_file("config.yaml", "store:\n  backend: sqlite\n")?;
            jail.create_file("config.json", r#"{"language": "fr"}"#)?;
            let config = load_in(jail, None).unwrap();
            assert_eq!(config.language.as_deref(), Some("fr"));
            assert_eq!(config.store.backend, StoreBackend::Sqlite);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_replaces_search() {
        Jail::expect_with(|jail| {
            jail.create_file("config.toml", "language = \"de\"")?;
            jail.create_file("other.yml", "language: ru\n")?;
            let config = load_in(jail, Some("other.yml")).unwrap();
            assert_eq!(config.language.as_deref(), Some("ru"));
            Ok(())
        });
    }

    #[rstest]
    #[case("missing.toml", "")]
    #[case("config.ini", "language = de")]
    fn test_explicit_file_errors(#[case] name: &str, #[case] contents: &str) {
        Jail::expect_with(|jail| {
            if !contents.is_empty() {
                jail.create_file(name, contents)?;
            }
            let err = load_in(jail, Some(name)).unwrap_err();
            assert!(matches!(&*err, ErrorKind::FileNotFound(_) | ErrorKind::UnsupportedFormat(_)));
            Ok(())
        });
    }

    #[rstest]
    #[case("config.toml", "[store]\nbackend = \"postgres\"", ErrorKind::Invalid)]
    #[case("config.toml", "language = \"../x\"", ErrorKind::InvalidLanguage("../x".to_string()))]
    fn test_invalid_values(#[case] name: &str, #[case] contents: &str, #[case] expected: ErrorKind) {
        Jail::expect_with(|jail| {
            jail.create_file(name, contents)?;
            let err = load_in(jail, None).unwrap_err();
            assert_eq!(*err, expected);
            Ok(())
        });
    }

    #[test]
    fn test_store_path() {
        let directory = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.store.path = Some(directory.path().join("seed"));
        assert_eq!(config.store_path().unwrap(), directory.path().join("seed"));

        config.store.path = Some(PathBuf::from("relative"));
        let resolved = config.store_path().unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("relative"));
    }

    #[test]
    fn test_unknown_language_is_allowed() {
        let config = Config { language: Some("tlh".to_string()), ..Config::default() };
        assert!(!config.language().unwrap().unwrap().is_known());
    }
}
