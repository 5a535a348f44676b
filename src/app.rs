use exn::ResultExt;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use time::Date;
use verse_cache::{Database, SqliteStore};
use verse_catalog::{Layered, VerseCatalog};
use verse_config::{Config, StoreBackend};
use verse_daily::{DailyVerseSelector, DeviceSeed, preference};
use verse_reference::{Language, psalms};
use verse_storage::{KeyValueStore, StoreHandle};
use verse_storage::backend::{LocalStore, MemoryStore};

use crate::cli::{Cli, Commands, Output, SeedAction};
use crate::error::{ErrorKind, Result};

/// How a command finished, short of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    /// Something was printed, but it is a placeholder or will not persist.
    Degraded,
}
impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Degraded => ExitCode::from(2),
        }
    }
}

/// Everything a command needs, opened once.
pub struct App {
    config: Config,
    store: StoreHandle,
    /// The configured store could not be opened; `store` is in memory.
    temporary: bool,
    database: Option<Database>,
    catalog: Arc<VerseCatalog>,
}
impl App {
    pub async fn open(cli: &Cli) -> Result<Self> {
        let mut config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
        if let Some(path) = &cli.store {
            config.store.path = Some(path.clone());
        }
        if let Some(directory) = &cli.data {
            config.data.directory = Some(directory.clone());
        }
        config.language().or_raise(|| ErrorKind::Config)?;
        Ok(Self::with_config(config).await)
    }

    /// Opens the configured store, falling back to a temporary in-memory
    /// store when it cannot be used.
    pub async fn with_config(config: Config) -> Self {
        let (store, database, temporary) = match open_store(&config).await {
            Ok((store, database)) => (store, database, false),
            Err(err) => {
                tracing::warn!(error = ?err, "Device store unavailable; continuing with a temporary store");
                let store: StoreHandle = Arc::new(MemoryStore::default().with_name("temporary"));
                (store, None, true)
            },
        };
        let catalog = Arc::new(VerseCatalog::new(Arc::new(Layered::with_builtins(config.data.directory.clone()))));
        Self { config, store, temporary, database, catalog }
    }

    pub async fn close(self) {
        if let Some(database) = self.database {
            database.close().await;
        }
    }

    async fn language(&self, explicit: Option<Language>) -> Result<Language> {
        let configured = self.config.language().or_raise(|| ErrorKind::Config)?;
        Ok(preference::resolve(explicit, self.store.as_ref(), configured).await)
    }

    pub async fn run(&self, command: Commands, today: Date, out: &mut impl Write) -> Result<Outcome> {
        match command {
            Commands::Today { output } => self.verse(today, output, out).await,
            Commands::On { date, output } => self.verse(date, output, out).await,
            Commands::Seed { action } => self.seed(action, out).await,
            Commands::Language { code, clear } => self.preference(code, clear, out).await,
            Commands::Languages { json } => languages(json, out),
            Commands::Map { reference, lang } => {
                let language = self.language(lang).await?;
                let mapped = psalms::map(&reference, language.numbering());
                writeln!(out, "{mapped}\t{} ({})", language.code(), language.numbering().as_str())
                    .or_raise(|| ErrorKind::Output)?;
                Ok(Outcome::Success)
            },
        }
    }

    async fn verse(&self, date: Date, output: Output, out: &mut impl Write) -> Result<Outcome> {
        let language = self.language(output.lang).await?;
        let selector = DailyVerseSelector::connect(self.catalog.clone(), self.store.as_ref()).await;
        let verse = selector.verse_for(date, &language);
        tracing::info!(date = %date, language = %language, status = ?verse.status, "Selected verse");
        if output.json {
            writeln!(out, "{}", to_json(&verse)?).or_raise(|| ErrorKind::Output)?;
            return Ok(Outcome::Success);
        }
        writeln!(out, "{verse}").or_raise(|| ErrorKind::Output)?;
        Ok(if verse.is_resolved() { Outcome::Success } else { Outcome::Degraded })
    }

    async fn seed(&self, action: Option<SeedAction>, out: &mut impl Write) -> Result<Outcome> {
        let seed = match action {
            None => DeviceSeed::get_or_create(self.store.as_ref()).await,
            Some(SeedAction::Reset) => DeviceSeed::reset(self.store.as_ref()).await.or_raise(|| ErrorKind::Seed)?,
        };
        writeln!(out, "{seed}").or_raise(|| ErrorKind::Output)?;
        if seed.is_ephemeral() || self.temporary {
            tracing::warn!("The device store is unusable; this seed is temporary");
            return Ok(Outcome::Degraded);
        }
        Ok(Outcome::Success)
    }

    async fn preference(&self, code: Option<Language>, clear: bool, out: &mut impl Write) -> Result<Outcome> {
        let store = self.store.as_ref();
        if (clear || code.is_some()) && self.temporary {
            exn::bail!(ErrorKind::Preference);
        }
        if clear {
            preference::clear(store).await.or_raise(|| ErrorKind::Preference)?;
        } else if let Some(language) = code {
            preference::save(store, &language).await.or_raise(|| ErrorKind::Preference)?;
        }
        let language = self.language(None).await?;
        writeln!(out, "{}\t{}", language.code(), language.native_name()).or_raise(|| ErrorKind::Output)?;
        Ok(Outcome::Success)
    }
}

async fn open_store(config: &Config) -> Result<(StoreHandle, Option<Database>)> {
    let path = config.store_path().or_raise(|| ErrorKind::Store)?;
    let opened: (StoreHandle, Option<Database>) = match config.store.backend {
        StoreBackend::Local => {
            let store = LocalStore::new("local", &path).or_raise(|| ErrorKind::Store)?;
            (Arc::new(store), None)
        },
        StoreBackend::Sqlite => {
            let database = Database::connect(&path).await.or_raise(|| ErrorKind::Store)?;
            let store = SqliteStore::from(&database);
            (Arc::new(store), Some(database))
        },
    };
    tracing::debug!(store = opened.0.name(), path = %path.display(), "Opened device store");
    Ok(opened)
}

fn languages(json: bool, out: &mut impl Write) -> Result<Outcome> {
    let rows: Vec<_> = Language::all().filter_map(|language| language.info()).collect();
    if json {
        let rows: Vec<_> = rows
            .iter()
            .map(|info| {
                serde_json::json!({
                    "code": info.code,
                    "native_name": info.native_name,
                    "translation": info.translation,
                    "numbering": info.numbering,
                })
            })
            .collect();
        writeln!(out, "{}", to_json(&rows)?).or_raise(|| ErrorKind::Output)?;
    } else {
        for info in rows {
            writeln!(out, "{}\t{}\t{}\t{}", info.code, info.native_name, info.translation, info.numbering.as_str())
                .or_raise(|| ErrorKind::Output)?;
        }
    }
    Ok(Outcome::Success)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).or_raise(|| ErrorKind::Output)
}
