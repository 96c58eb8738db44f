use crate::merge::MergeMode;
use crate::{Result, ShadowsyncError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Default location of the tool configuration, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

pub const URL_KEY: &str = "URL";
pub const MODE_KEY: &str = "Mode";
pub const TARGET_DIR_KEY: &str = "SSPath";

/// Settings resolved for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub source_url: String,
    pub merge_mode: MergeMode,
    /// Directory holding `gui-config.json`; absent when the mode is `none`.
    pub target_dir: Option<PathBuf>,
}

/// Source of answers for settings missing from the config file.
pub trait Prompt {
    /// Ask one question and return the trimmed answer.
    ///
    /// # Errors
    ///
    /// Returns an error if no answer can be read.
    fn ask(&mut self, question: &str) -> Result<String>;
}

/// Reads answers line by line from standard input.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, question: &str) -> Result<String> {
        println!("---------- {question} ----------");
        print!("> ");
        io::stdout().flush().map_err(|e| ShadowsyncError::PromptFailed(e.to_string()))?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .map_err(|e| ShadowsyncError::PromptFailed(e.to_string()))?;
        if read == 0 {
            return Err(ShadowsyncError::PromptFailed(format!(
                "standard input closed while waiting for: {question}"
            )));
        }

        Ok(input.trim().to_string())
    }
}

/// The tool's own JSON settings file.
///
/// Only the keys this tool owns are ever set or removed; everything else in the
/// document is carried through each rewrite untouched.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve every setting the run needs, prompting for the missing ones.
    ///
    /// Answers are written back to the file immediately so the next run does not ask again.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be created, read or written
    /// - The config file does not hold a JSON object
    /// - A prompt cannot be answered
    pub fn resolve(&self, prompt: &mut dyn Prompt) -> Result<ToolConfig> {
        let mut document = self.load_document()?;
        let mut changed = false;

        let source_url = if let Some(url) = string_field(&document, URL_KEY) {
            url
        } else {
            let url = ask_non_empty(prompt, "Enter the URL of the page publishing the servers")?;
            document.insert(URL_KEY.to_string(), Value::String(url.clone()));
            changed = true;
            url
        };

        let merge_mode = match document.get(MODE_KEY).map(MergeMode::deserialize) {
            Some(Ok(mode)) => mode,
            invalid => {
                if let Some(Err(reason)) = invalid {
                    warn!("Ignoring persisted {MODE_KEY}: {reason}");
                }
                let mode = ask_mode(prompt)?;
                document.insert(MODE_KEY.to_string(), Value::String(mode.as_str().to_string()));
                changed = true;
                mode
            },
        };

        let target_dir = if merge_mode.touches_target() {
            let dir = if let Some(dir) = string_field(&document, TARGET_DIR_KEY) {
                dir
            } else {
                let dir = ask_non_empty(prompt, "Enter the Shadowsocks client directory")?;
                document.insert(TARGET_DIR_KEY.to_string(), Value::String(dir.clone()));
                changed = true;
                dir
            };
            Some(PathBuf::from(dir))
        } else {
            None
        };

        if changed {
            print!("Writing {}... ", self.path.display());
            self.save_document(&document)?;
            println!("done");
        }

        Ok(ToolConfig { source_url, merge_mode, target_dir })
    }

    /// Remove one top-level key from the persisted file.
    ///
    /// Returns whether the key was present. Removing an absent key (or forgetting from a
    /// file that does not exist) leaves the file alone.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or rewritten.
    pub fn forget(&self, key: &str) -> Result<bool> {
        if !self.path.exists() {
            debug!("{} does not exist, nothing to forget", self.path.display());
            return Ok(false);
        }

        let mut document = self.load_document()?;
        if document.shift_remove(key).is_none() {
            debug!("{key} not present in {}", self.path.display());
            return Ok(false);
        }

        info!("Removing {key} from {}", self.path.display());
        self.save_document(&document)?;
        Ok(true)
    }

    fn load_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            debug!("Creating empty config file at {}", self.path.display());
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(&self.path)
                .map_err(|source| self.inaccessible(source))?;
        }

        let content = fs::read_to_string(&self.path).map_err(|source| self.inaccessible(source))?;
        if content.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(ShadowsyncError::ConfigFileMalformed {
                path: self.path.clone(),
                reason: format!("expected an object, found {}", json_type_name(&other)),
            }),
            Err(e) => Err(ShadowsyncError::ConfigFileMalformed {
                path: self.path.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn save_document(&self, document: &Map<String, Value>) -> Result<()> {
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&self.path, json).map_err(|source| self.inaccessible(source))
    }

    fn inaccessible(&self, source: io::Error) -> ShadowsyncError {
        ShadowsyncError::ConfigFileInaccessible { path: self.path.clone(), source }
    }
}

fn string_field(document: &Map<String, Value>, key: &str) -> Option<String> {
    match document.get(key) {
        Some(Value::String(value)) => Some(value.clone()),
        Some(other) => {
            warn!("Ignoring {key}: expected a string, found {}", json_type_name(other));
            None
        },
        None => None,
    }
}

fn ask_non_empty(prompt: &mut dyn Prompt, question: &str) -> Result<String> {
    loop {
        let answer = prompt.ask(question)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        warn!("An answer is required");
    }
}

fn ask_mode(prompt: &mut dyn Prompt) -> Result<MergeMode> {
    loop {
        let answer = prompt.ask(
            "Enter the merge mode [cover/add/none] (replace client servers / append to them / leave the client alone)",
        )?;
        match answer.parse() {
            Ok(mode) => return Ok(mode),
            Err(reason) => warn!("{reason}"),
        }
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
