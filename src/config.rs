use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;

/// Fallback page limit when none (or an unusable one) is given
pub const DEFAULT_MAX_PAGES: usize = 10;

/// Configuration for a paginated crawl
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// URL of the first page
    pub start_url: String,

    /// Follow "more"/"next" links after the first page
    #[serde(default)]
    pub handle_pagination: bool,

    /// Upper bound on the number of pages fetched
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Pause between consecutive page fetches, in milliseconds
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Controls to click before reading a page
    #[serde(default)]
    pub interaction_hints: InteractionHints,

    /// Base timeout for a single page fetch, in milliseconds
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,
}

/// "Load more"-like controls the fetcher tries to activate on each page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionHints {
    /// CSS selectors of load-more controls
    #[serde(default = "default_load_more_selectors")]
    pub selectors: Vec<String>,

    /// Case-insensitive text fragments identifying load-more buttons and links
    #[serde(default = "default_load_more_tokens")]
    pub text_tokens: Vec<String>,

    /// Time given to the page to load content after a click, in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

impl Default for InteractionHints {
    fn default() -> Self {
        Self {
            selectors: default_load_more_selectors(),
            text_tokens: default_load_more_tokens(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl InteractionHints {
    /// Hints that click nothing
    pub fn none() -> Self {
        Self {
            selectors: Vec::new(),
            text_tokens: Vec::new(),
            settle_ms: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty() && self.text_tokens.is_empty()
    }
}

/// Default value for max_pages
fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

/// Default value for page_delay_ms
fn default_page_delay_ms() -> u64 {
    1000
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_fetch_timeout_ms() -> u64 {
    45_000
}

fn default_load_more_selectors() -> Vec<String> {
    vec![
        ".load-more".to_string(),
        "#more".to_string(),
        ".more-button".to_string(),
    ]
}

fn default_load_more_tokens() -> Vec<String> {
    vec!["More".to_string(), "Load More".to_string()]
}

fn default_settle_ms() -> u64 {
    1500
}

/// Parse a user-supplied page limit; anything that is not a positive integer
/// falls back to [`DEFAULT_MAX_PAGES`]
pub fn parse_max_pages(input: &str) -> usize {
    let input = input.trim();
    if input.is_empty() {
        return DEFAULT_MAX_PAGES;
    }

    match input.parse::<usize>() {
        Ok(value) if value > 0 => value,
        _ => {
            ::log::warn!(
                "Invalid page limit '{}', using default of {} pages",
                input,
                DEFAULT_MAX_PAGES
            );
            DEFAULT_MAX_PAGES
        }
    }
}

impl CrawlConfig {
    /// Create a new configuration with default values
    pub fn new(start_url: &str) -> Self {
        Self {
            start_url: start_url.to_string(),
            handle_pagination: false,
            max_pages: default_max_pages(),
            page_delay_ms: default_page_delay_ms(),
            webdriver_url: default_webdriver_url(),
            interaction_hints: InteractionHints::default(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let mut config: Self = serde_json::from_str(json)?;
        if config.max_pages == 0 {
            config.max_pages = DEFAULT_MAX_PAGES;
        }
        Ok(config)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn apply_env(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }
}

/// Settings for the language-model pagination oracle
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// API key; required only when the oracle is actually called
    pub api_key: Option<String>,

    pub model: String,

    /// Base URL of the generative language API
    pub endpoint: String,

    pub timeout: Duration,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl OracleConfig {
    /// Read `GEMINI_API_KEY` (and optionally `GEMINI_MODEL`) from the process
    /// environment, loading a `.env` file first if present
    pub fn from_env() -> Self {
        if let Err(e) = dotenvy::dotenv() {
            ::log::debug!("No .env file loaded: {}", e);
        }

        let mut config = Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            ..Self::default()
        };
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.is_empty() {
                config.model = model;
            }
        }
        config
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the API base URL
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// The API key, or [`Error::OracleUnavailable`] when none is configured
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            Error::OracleUnavailable("GEMINI_API_KEY not found in environment variables".to_string())
        })
    }
}
