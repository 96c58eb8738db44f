#![allow(missing_docs)]

use anyhow::Result;
use clap::Parser;
use shadowsync::{
    cli::Cli,
    merge::MergeOptions,
    pipeline::{self, RunReport},
    ConfigStore, HttpFetcher, ShadowsyncError, StdinPrompt,
};
use std::io;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    initialize_tracing(cli.debug, cli.trace);

    // The diagnostic goes out before the exit pause.
    let status = match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        },
    };

    if !cli.no_pause {
        wait_for_enter();
    }

    status
}

/// Initialize tracing with the specified debug/trace flags
fn initialize_tracing(debug: bool, trace: bool) {
    let log_level = if trace {
        Level::TRACE
    } else if debug {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::builder().with_default_directive(log_level.into()).from_env_lossy())
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let store = ConfigStore::new(&cli.config);
    let fetcher = HttpFetcher::new(Duration::from_secs(cli.timeout));
    let options = MergeOptions { dry_run: cli.dry_run, backup: cli.backup };

    debug!("Using settings file {}", store.path().display());

    let RunReport { servers, .. } = pipeline::run(&store, &mut StdinPrompt, &fetcher, options)
        .map_err(|e| {
            let hint = diagnostic(&e, &cli.config.display().to_string());
            anyhow::Error::new(e).context(hint)
        })?;

    println!("Done ({} server(s) harvested)", servers.len());
    Ok(())
}

/// One line naming the resource that failed and what the next run will do about it.
fn diagnostic(error: &ShadowsyncError, settings: &str) -> String {
    match error {
        ShadowsyncError::ConfigFileInaccessible { .. }
        | ShadowsyncError::ConfigFileMalformed { .. } => format!("Cannot use settings file {settings}"),
        ShadowsyncError::PromptFailed(_) => "Cannot read the missing settings from input".to_string(),
        ShadowsyncError::FetchFailed { url, .. } => format!(
            "Failed to fetch {url}; URL was removed from {settings}, run again to enter a new one"
        ),
        ShadowsyncError::TargetUnreadable { path, .. } => format!(
            "Cannot open client configuration {}; SSPath was removed from {settings}, \
             run again to enter a new one",
            path.display()
        ),
        ShadowsyncError::TargetMalformed { path, .. } => {
            format!("Cannot merge into client configuration {}", path.display())
        },
        ShadowsyncError::TargetWriteFailed { path, .. } => {
            format!("Failed to write client configuration {}", path.display())
        },
        ShadowsyncError::Json(_) => "Failed to serialize configuration".to_string(),
    }
}

fn wait_for_enter() {
    println!("---------- Press Enter to exit ----------");
    let mut input = String::new();
    if let Err(e) = io::stdin().read_line(&mut input) {
        debug!("Skipping exit pause: {e}");
    }
}
