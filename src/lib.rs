#![allow(missing_docs)]

pub mod cli;
pub mod extract;
pub mod merge;
pub mod pipeline;
pub mod server;
pub mod tool_config;

pub use extract::{extract, parse_servers, Fetch, HttpFetcher};
pub use merge::{apply, MergeMode, MergeOptions, MergeOutcome};
pub use server::ServerRecord;
pub use tool_config::{ConfigStore, Prompt, StdinPrompt, ToolConfig};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ShadowsyncError {
    #[error("cannot access config file {}: {source}", path.display())]
    ConfigFileInaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config file {} is not a JSON object: {reason}", path.display())]
    ConfigFileMalformed { path: PathBuf, reason: String },

    #[error("failed to read interactive input: {0}")]
    PromptFailed(String),

    #[error("failed to fetch {url}: {reason}")]
    FetchFailed { url: String, reason: String },

    #[error("cannot read target config {}: {reason}", path.display())]
    TargetUnreadable { path: PathBuf, reason: String },

    #[error("cannot merge into target config {}: {reason}", path.display())]
    TargetMalformed { path: PathBuf, reason: String },

    #[error("cannot write target config {}: {source}", path.display())]
    TargetWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = ShadowsyncError> = std::result::Result<T, E>;
