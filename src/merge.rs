#![allow(clippy::self_named_module_files)]

use crate::server::ServerRecord;
use crate::{Result, ShadowsyncError};
use chrono::Local;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub mod strategy;

pub use strategy::MergeMode;

/// File name of the client configuration inside the configured directory.
pub const TARGET_FILE_NAME: &str = "gui-config.json";

/// The only key of the client configuration this tool rewrites.
pub const CONFIGS_KEY: &str = "configs";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOptions {
    /// Compute the merged document without writing it
    pub dry_run: bool,
    /// Copy the client configuration aside before overwriting it
    pub backup: bool,
}

/// What [`apply`] did to the client configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome {
    /// Mode `none`: nothing was read or written
    Skipped,
    /// The merged document was written back
    Written { path: PathBuf, entries: usize, backup: Option<PathBuf> },
    /// The merged document that would have been written
    DryRun { path: PathBuf, document: Value },
}

/// Location of the client configuration inside `dir`.
pub fn target_file(dir: &Path) -> PathBuf {
    dir.join(TARGET_FILE_NAME)
}

/// Merge `records` into the client configuration under `target_dir` according to `mode`.
///
/// # Errors
///
/// Returns an error if:
/// - The client configuration cannot be read or is not a JSON object
///   ([`ShadowsyncError::TargetUnreadable`]; the caller should forget the directory)
/// - Mode `add` meets a `configs` value that is neither absent, `null` nor an array
///   ([`ShadowsyncError::TargetMalformed`])
/// - The backup or the rewrite fails ([`ShadowsyncError::TargetWriteFailed`])
pub fn apply(
    mode: MergeMode,
    target_dir: Option<&Path>,
    records: &[ServerRecord],
    options: MergeOptions,
) -> Result<MergeOutcome> {
    if !mode.touches_target() {
        debug!("Merge mode is none, leaving the client configuration alone");
        return Ok(MergeOutcome::Skipped);
    }

    let Some(dir) = target_dir else {
        return Err(ShadowsyncError::TargetUnreadable {
            path: PathBuf::from(TARGET_FILE_NAME),
            reason: "no client directory configured".to_string(),
        });
    };
    let path = target_file(dir);

    let mut document = load_target(&path)?;
    let entries = merge_entries(&mut document, mode, records).ok_or_else(|| {
        ShadowsyncError::TargetMalformed {
            path: path.clone(),
            reason: format!("`{CONFIGS_KEY}` is not an array, refusing to append to it"),
        }
    })?;
    debug!("{CONFIGS_KEY} now holds {entries} entries after {mode}");

    if options.dry_run {
        return Ok(MergeOutcome::DryRun { path, document: Value::Object(document) });
    }

    let backup = if options.backup { Some(backup_file(&path)?) } else { None };

    info!("Writing {}", path.display());
    let json = serde_json::to_string_pretty(&document)?;
    fs::write(&path, json)
        .map_err(|source| ShadowsyncError::TargetWriteFailed { path: path.clone(), source })?;

    Ok(MergeOutcome::Written { path, entries, backup })
}

/// Read the client configuration as a generic document.
///
/// The `configs` value is not inspected here; [`merge_entries`] decides what it can work with.
///
/// # Errors
///
/// Returns [`ShadowsyncError::TargetUnreadable`] if the file cannot be read or is not a JSON
/// object.
pub fn load_target(path: &Path) -> Result<Map<String, Value>> {
    let unreadable = |reason: String| ShadowsyncError::TargetUnreadable {
        path: path.to_path_buf(),
        reason,
    };

    let content = fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(unreadable("expected a JSON object".to_string())),
        Err(e) => Err(unreadable(e.to_string())),
    }
}

/// Apply the merge policy to `configs` in place and return the resulting entry count.
///
/// `cover` overwrites whatever `configs` held. `add` treats an absent or `null` value as an
/// empty list and returns `None` for any other non-array value. Every other key of the
/// document is left as it was.
pub fn merge_entries(
    document: &mut Map<String, Value>,
    mode: MergeMode,
    records: &[ServerRecord],
) -> Option<usize> {
    let new_entries = records.iter().map(ServerRecord::to_client_entry);

    match mode {
        MergeMode::Cover => {
            document.insert(CONFIGS_KEY.to_string(), Value::Array(new_entries.collect()));
        },
        MergeMode::Add => match document.get_mut(CONFIGS_KEY) {
            Some(Value::Array(existing)) => existing.extend(new_entries),
            None | Some(Value::Null) => {
                document.insert(CONFIGS_KEY.to_string(), Value::Array(new_entries.collect()));
            },
            Some(_) => return None,
        },
        MergeMode::None => {},
    }

    Some(document.get(CONFIGS_KEY).and_then(Value::as_array).map_or(0, Vec::len))
}

/// Copy `path` next to itself with a timestamp suffix.
///
/// # Errors
///
/// Returns [`ShadowsyncError::TargetWriteFailed`] if the copy fails.
pub fn backup_file(path: &Path) -> Result<PathBuf> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let backup_path = path.with_file_name(format!(
        "{}.backup.{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or(TARGET_FILE_NAME),
        timestamp
    ));

    debug!("Backing up {} to {}", path.display(), backup_path.display());
    fs::copy(path, &backup_path).map_err(|source| ShadowsyncError::TargetWriteFailed {
        path: backup_path.clone(),
        source,
    })?;

    Ok(backup_path)
}
