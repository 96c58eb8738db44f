//! Harvesting server records from the published page.
//!
//! The page layout is a fixed contract with one site: every candidate server lives in a
//! `div.hover-text` panel nested under a `div.portfolio-item`. Inside a panel the host,
//! port and password sit in elements whose `id` starts with `ip`, `port` and `pw`, and the
//! cipher is announced by an `h4` heading reading `Method:<cipher>`. Anything outside that
//! shape is ignored rather than reported.

use crate::server::ServerRecord;
use crate::{Result, ShadowsyncError};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, trace};

/// Default bound on the whole request, connect included.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

const METHOD_PREFIX: &str = "Method:";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

// The selectors are literals known to parse.
static PANEL: LazyLock<Selector> = LazyLock::new(|| css("div.portfolio-item div.hover-text"));
static HOST: LazyLock<Selector> = LazyLock::new(|| css("[id^='ip']"));
static PORT: LazyLock<Selector> = LazyLock::new(|| css("[id^='port']"));
static PASSWORD: LazyLock<Selector> = LazyLock::new(|| css("[id^='pw']"));
static HEADING: LazyLock<Selector> = LazyLock::new(|| css("h4"));

fn css(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector must parse")
}

/// Retrieves the raw source document.
pub trait Fetch {
    /// Fetch the document at `url` as text.
    ///
    /// # Errors
    ///
    /// Returns [`ShadowsyncError::FetchFailed`] when the document cannot be retrieved.
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP(S) fetcher with a bounded timeout and no retries.
#[derive(Debug, Clone, Copy)]
pub struct HttpFetcher {
    timeout: Duration,
}

impl HttpFetcher {
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(DEFAULT_FETCH_TIMEOUT)
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let failed = |e: reqwest::Error| ShadowsyncError::FetchFailed {
            url: url.to_string(),
            reason: e.to_string(),
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(failed)?;

        debug!("GET {url} (timeout {:?})", self.timeout);
        let response = client.get(url).send().map_err(failed)?;
        debug!("{url} answered {}", response.status());

        let body = response.error_for_status().map_err(failed)?.text().map_err(failed)?;
        debug!("Read {} bytes from {url}", body.len());
        Ok(body)
    }
}

/// Fetch `url` and extract every complete server record from it.
///
/// # Errors
///
/// Returns [`ShadowsyncError::FetchFailed`] if the page cannot be retrieved.
pub fn extract(fetcher: &dyn Fetch, url: &str) -> Result<Vec<ServerRecord>> {
    let html = fetcher.fetch(url)?;
    Ok(parse_servers(&html))
}

/// Extract complete server records from a page, in document order.
///
/// Panels missing any of the four fields are dropped silently; decorative or
/// half-filled panels are normal on the source page.
pub fn parse_servers(html: &str) -> Vec<ServerRecord> {
    let document = Html::parse_document(html);

    let servers: Vec<ServerRecord> = document
        .select(&PANEL)
        .enumerate()
        .filter_map(|(index, panel)| {
            let record = parse_panel(panel);
            if record.is_none() {
                trace!("Dropping incomplete panel #{index}");
            }
            record
        })
        .collect();

    debug!("Extracted {} complete server(s)", servers.len());
    servers
}

fn parse_panel(panel: ElementRef<'_>) -> Option<ServerRecord> {
    let host = field_text(panel, &HOST);
    let port = field_text(panel, &PORT);
    let password = field_text(panel, &PASSWORD);

    let method = panel
        .select(&HEADING)
        .filter_map(|heading| {
            let text = element_text(heading);
            text.strip_prefix(METHOD_PREFIX).map(|rest| trim_newlines(rest).to_string())
        })
        .last()
        .unwrap_or_default();

    ServerRecord::new(host, port, password, method)
}

fn field_text(panel: ElementRef<'_>, selector: &Selector) -> String {
    let text: String = panel.select(selector).map(element_text).collect();
    trim_newlines(&text).to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

/// Strips line breaks from both ends only; spaces and tabs are kept, so a field made
/// of blanks still counts as present.
fn trim_newlines(text: &str) -> &str {
    text.trim_matches(|c| c == '\n' || c == '\r')
}
