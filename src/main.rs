use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod app;
mod cli;
mod error;

use crate::app::App;
use crate::cli::Cli;

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("VERSE_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    // The local offset can only be read while the process is single-threaded.
    let today = verse_daily::local_today();
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("Error: could not start the runtime: {err}");
            return ExitCode::FAILURE;
        },
    };
    runtime.block_on(async move {
        let app = match App::open(&cli).await {
            Ok(app) => app,
            Err(err) => {
                eprintln!("Error: {err:?}");
                return ExitCode::FAILURE;
            },
        };
        let status = match app.run(cli.command, today, &mut std::io::stdout().lock()).await {
            Ok(outcome) => ExitCode::from(outcome),
            Err(err) => {
                eprintln!("Error: {err:?}");
                ExitCode::FAILURE
            },
        };
        app.close().await;
        status
    })
}
