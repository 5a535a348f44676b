use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use time::Date;
use time::macros::format_description;
use verse_reference::{CanonicalReference, Language};

#[derive(Parser)]
#[command(name = "verse")]
#[command(author, version, about = "Show this device's verse of the day")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file, instead of the platform configuration directory
    #[arg(long, global = true, env = "VERSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Store location: a directory (local) or a database file (sqlite)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Directory of asset overrides (`bible_<code>.json[.gz|.bz2]`, `curated_verses.json`)
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    /// More logging (-v info, -vv debug, -vvv trace); `VERSE_LOG` takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct Output {
    /// Display language, e.g. `en`, `ko`, `zh-tw`
    #[arg(long, value_parser = parse_language)]
    pub lang: Option<Language>,

    /// Print the verse as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Today's verse
    Today {
        #[command(flatten)]
        output: Output,
    },

    /// The verse for another date
    On {
        /// Date as YYYY-MM-DD
        #[arg(value_parser = parse_date)]
        date: Date,

        #[command(flatten)]
        output: Output,
    },

    /// Show the device seed
    Seed {
        #[command(subcommand)]
        action: Option<SeedAction>,
    },

    /// Show or set the preferred display language
    Language {
        /// Language code to save as the preference
        #[arg(value_parser = parse_language)]
        code: Option<Language>,

        /// Forget the saved preference
        #[arg(long, conflicts_with = "code")]
        clear: bool,
    },

    /// List supported languages
    Languages {
        #[arg(long)]
        json: bool,
    },

    /// Show how a reference is numbered in a language's translation
    Map {
        /// Reference as BOOK.CHAPTER.VERSE, e.g. PSA.23.1
        #[arg(value_parser = parse_reference)]
        reference: CanonicalReference,

        #[arg(long, value_parser = parse_language)]
        lang: Option<Language>,
    },
}

#[derive(Subcommand)]
pub enum SeedAction {
    /// Replace the seed with a new random one
    Reset,
}

fn parse_date(s: &str) -> Result<Date, String> {
    Date::parse(s, format_description!("[year]-[month]-[day]")).map_err(|e| e.to_string())
}

fn parse_language(s: &str) -> Result<Language, String> {
    s.parse().map_err(|e: verse_reference::error::Error| e.to_string())
}

fn parse_reference(s: &str) -> Result<CanonicalReference, String> {
    s.parse().map_err(|e: verse_reference::error::Error| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;
    use time::macros::date;

    #[test]
    fn test_command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case("2025-01-15", Some(date!(2025 - 01 - 15)))]
    #[case("2024-02-29", Some(date!(2024 - 02 - 29)))]
    #[case("2025-02-29", None)]
    #[case("15/01/2025", None)]
    fn test_parse_date(#[case] input: &str, #[case] expected: Option<Date>) {
        assert_eq!(parse_date(input).ok(), expected);
    }

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from(["verse", "-vv", "on", "2025-01-15", "--lang", "zh-cn", "--json"]).unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::On { date, output } = cli.command else { panic!("expected `on`") };
        assert_eq!(date, date!(2025 - 01 - 15));
        assert_eq!(output.lang.unwrap().code(), "zh_CN");
        assert!(output.json);

        assert!(Cli::try_parse_from(["verse", "map", "PSA.23"]).is_err());
        assert!(Cli::try_parse_from(["verse", "language", "ko", "--clear"]).is_err());
        assert!(Cli::try_parse_from(["verse", "seed", "reset", "--store", "/tmp/verse"]).is_ok());
    }
}
