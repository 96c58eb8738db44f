use crate::extract::DEFAULT_FETCH_TIMEOUT;
use crate::tool_config::DEFAULT_CONFIG_FILE;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "shadowsync",
    about = "Harvest shared Shadowsocks servers from a public page into gui-config.json",
    long_about = "Shadowsync fetches a page that publishes free Shadowsocks servers, extracts every
complete server it lists, and merges them into a Shadowsocks GUI client configuration.

Settings are kept in config.json (in the working directory by default):
  • URL: page to harvest
  • Mode: cover (replace client servers), add (append to them) or none (only print)
  • SSPath: directory holding the client's gui-config.json

Any missing setting is asked for interactively and saved for the next run. If the page
cannot be fetched, URL is removed from config.json; if gui-config.json cannot be read,
SSPath is removed. Either way the next run asks again.",
    version,
    author
)]
pub struct Cli {
    /// Path to the settings file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Seconds to wait for the page before giving up
    #[arg(long, default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// Print the merged client configuration instead of writing it
    #[arg(short, long)]
    pub dry_run: bool,

    /// Create a timestamped backup of gui-config.json before writing it
    #[arg(short, long)]
    pub backup: bool,

    /// Exit without waiting for Enter
    #[arg(long)]
    pub no_pause: bool,

    /// Enable debug output (shows INFO and DEBUG messages)
    #[arg(long)]
    pub debug: bool,

    /// Enable trace output (shows all log messages including TRACE)
    #[arg(short = 't', long)]
    pub trace: bool,
}
