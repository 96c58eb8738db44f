#![allow(missing_docs)]

use crate::extract::{extract, Fetch};
use crate::merge::{apply, MergeOptions, MergeOutcome};
use crate::server::ServerRecord;
use crate::tool_config::{ConfigStore, Prompt, ToolConfig, TARGET_DIR_KEY, URL_KEY};
use crate::{Result, ShadowsyncError};
use tracing::{debug, error, warn};

/// Everything a successful run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub config: ToolConfig,
    pub servers: Vec<ServerRecord>,
    pub outcome: MergeOutcome,
}

/// Resolve settings, harvest servers and merge them into the client configuration.
///
/// A fetch failure forgets the persisted URL and an unreadable client configuration
/// forgets the persisted directory, so the next run asks for them again. Every other
/// failure leaves the settings file as it is.
///
/// # Errors
///
/// Returns the first error hit by any stage.
pub fn run(
    store: &ConfigStore,
    prompt: &mut dyn Prompt,
    fetcher: &dyn Fetch,
    options: MergeOptions,
) -> Result<RunReport> {
    let config = store.resolve(prompt)?;
    print_config(&config);

    let servers = extract(fetcher, &config.source_url).map_err(|e| abort(store, e))?;
    print_servers(&servers);

    let outcome = apply(config.merge_mode, config.target_dir.as_deref(), &servers, options)
        .map_err(|e| abort(store, e))?;
    print_outcome(&outcome)?;

    Ok(RunReport { config, servers, outcome })
}

/// The settings key a failure invalidates, if any.
///
/// Only a page that cannot be fetched or a client configuration that cannot be read
/// point at a wrong setting; every other failure leaves the settings alone.
pub const fn rollback_key(error: &ShadowsyncError) -> Option<&'static str> {
    match error {
        ShadowsyncError::FetchFailed { .. } => Some(URL_KEY),
        ShadowsyncError::TargetUnreadable { .. } => Some(TARGET_DIR_KEY),
        ShadowsyncError::ConfigFileInaccessible { .. }
        | ShadowsyncError::ConfigFileMalformed { .. }
        | ShadowsyncError::PromptFailed(_)
        | ShadowsyncError::TargetMalformed { .. }
        | ShadowsyncError::TargetWriteFailed { .. }
        | ShadowsyncError::Json(_) => None,
    }
}

fn abort(store: &ConfigStore, error: ShadowsyncError) -> ShadowsyncError {
    if let Some(key) = rollback_key(&error) {
        roll_back(store, key);
    }
    error
}

fn roll_back(store: &ConfigStore, key: &str) {
    match store.forget(key) {
        Ok(true) => warn!(
            "Removed {key} from {} so the next run asks for it again",
            store.path().display()
        ),
        Ok(false) => debug!("{key} was already absent from {}", store.path().display()),
        Err(e) => error!("Failed to remove {key} from {}: {e}", store.path().display()),
    }
}

fn print_config(config: &ToolConfig) {
    println!("----------[CONFIG]----------");
    println!("[URL] {}", config.source_url);
    println!("[Mode] {}", config.merge_mode);
    if let Some(dir) = &config.target_dir {
        println!("[ShadowsocksPath] {}", dir.display());
    }
}

fn print_servers(servers: &[ServerRecord]) {
    if servers.is_empty() {
        println!("No complete servers found on the page");
        return;
    }

    for (index, server) in servers.iter().enumerate() {
        println!("----------[ {index} ]----------");
        println!("[IP] {}", server.host());
        println!("[Port] {}", server.port());
        println!("[Password] {}", server.password());
        println!("[Method] {}", server.method());
    }
}

fn print_outcome(outcome: &MergeOutcome) -> Result<()> {
    match outcome {
        MergeOutcome::Skipped => println!("Mode is none, client configuration left untouched"),
        MergeOutcome::Written { path, entries, backup } => {
            if let Some(backup) = backup {
                println!("Backup created: {}", backup.display());
            }
            println!("Wrote {} ({entries} server(s) configured)", path.display());
        },
        MergeOutcome::DryRun { path, document } => {
            println!("[DRY RUN] Would write {}:", path.display());
            println!("{}", serde_json::to_string_pretty(document)?);
        },
    }
    Ok(())
}
