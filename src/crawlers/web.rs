use crate::config::{CrawlConfig, InteractionHints};
use crate::crawlers::Fetcher;
use crate::parsers::html;
use crate::results::FetchResult;
use crate::utils::calculate_timeout;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;
use url::Url;

/// Common local WebDriver endpoints tried when the configured one is unreachable
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Fetches pages through a WebDriver-controlled browser
///
/// The browser session is opened on the first fetch and reused afterwards.
/// A lost session is reconnected once per fetch.
pub struct WebFetcher {
    webdriver_url: String,
    base_timeout_ms: u64,
    client: Mutex<Option<Client>>,
}

impl WebFetcher {
    pub fn new(webdriver_url: impl Into<String>) -> Self {
        Self {
            webdriver_url: webdriver_url.into(),
            base_timeout_ms: 45_000,
            client: Mutex::new(None),
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        let mut fetcher = Self::new(&config.webdriver_url);
        fetcher.base_timeout_ms = config.fetch_timeout_ms;
        fetcher
    }

    /// Close the browser session, if one was opened
    pub async fn close(&self) {
        if let Some(client) = self.client.lock().await.take() {
            if let Err(e) = client.close().await {
                ::log::warn!("Failed to close WebDriver client: {}", e);
            }
        }
    }

    /// Returns the current session, connecting first if needed
    async fn session(&self) -> Option<Client> {
        let mut guard = self.client.lock().await;
        if guard.is_none() {
            ::log::debug!("Connecting to WebDriver");
            *guard = connect_to_webdriver(&self.webdriver_url).await;
        }
        guard.clone()
    }

    /// Replaces the current session with a fresh one
    async fn reconnect(&self) -> Option<Client> {
        ::log::warn!("Attempting to reconnect WebDriver session");
        let mut guard = self.client.lock().await;
        match ClientBuilder::native().connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::info!("Successfully reconnected to WebDriver");
                *guard = Some(client.clone());
                Some(client)
            }
            Err(e) => {
                ::log::error!("Failed to reconnect to WebDriver: {}", e);
                *guard = None;
                None
            }
        }
    }
}

#[async_trait]
impl Fetcher for WebFetcher {
    async fn fetch(&self, url: &str, hints: &InteractionHints) -> FetchResult {
        let Some(mut client) = self.session().await else {
            return FetchResult::failure(
                url,
                None,
                format!(
                    "Could not connect to a WebDriver server at {}; set WEBDRIVER_URL",
                    self.webdriver_url
                ),
            );
        };

        let limit = calculate_timeout(self.base_timeout_ms, url.len());
        let mut attempt = 0;
        loop {
            let outcome = timeout(limit, scrape(&client, url, hints)).await;
            let error = match outcome {
                Ok(Ok(result)) => return result,
                Ok(Err(e)) => e,
                Err(_) => {
                    ::log::error!("Timeout scraping: {}", url);
                    return FetchResult::failure(
                        url,
                        None,
                        format!("Timed out after {:.1}s", limit.as_secs_f64()),
                    );
                }
            };

            if attempt > 0 || !is_lost_session(&error) {
                ::log::error!("Failed to scrape {}: {}", url, error);
                return FetchResult::failure(url, None, error.to_string());
            }

            ::log::warn!("Lost session while scraping {}", url);
            attempt += 1;
            client = match self.reconnect().await {
                Some(client) => client,
                None => return FetchResult::failure(url, None, error.to_string()),
            };
        }
    }
}

/// Navigates to `url`, activates load-more controls and extracts the page
async fn scrape(
    client: &Client,
    url: &str,
    hints: &InteractionHints,
) -> Result<FetchResult, fantoccini::error::CmdError> {
    let start = std::time::Instant::now();
    ::log::debug!("SCRAPE: {}", url);

    client.goto(url).await?;

    let clicked = click_load_more(client, hints).await;
    if clicked > 0 && hints.settle_ms > 0 {
        tokio::time::sleep(Duration::from_millis(hints.settle_ms)).await;
    }

    let source = client.source().await?;
    let page_url = match client.current_url().await {
        Ok(current) => current,
        Err(_) => match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                return Ok(FetchResult::failure(url, None, format!("Invalid URL: {e}")));
            }
        },
    };

    let parsed = html::parse(&source, &page_url);
    ::log::info!(
        "Found {} internal and {} external links in {} ({} controls clicked, {:.2}s)",
        parsed.internal_links.len(),
        parsed.external_links.len(),
        url,
        clicked,
        start.elapsed().as_secs_f64()
    );

    Ok(FetchResult {
        url: url.to_string(),
        success: true,
        // WebDriver does not expose the HTTP status of a navigation
        status_code: None,
        error_message: None,
        content: parsed.content,
        internal_links: parsed.internal_links,
        external_links: parsed.external_links,
        images: parsed.images,
        videos: parsed.videos,
        audios: parsed.audios,
    })
}

/// Clicks the first visible element matched by each hint; returns the number clicked
async fn click_load_more(client: &Client, hints: &InteractionHints) -> usize {
    if hints.is_empty() {
        return 0;
    }

    let mut clicked = 0;

    let mut locators: Vec<(String, bool)> = hints
        .selectors
        .iter()
        .map(|selector| (selector.clone(), false))
        .collect();
    locators.extend(
        hints
            .text_tokens
            .iter()
            .map(|token| (text_token_xpath(token), true)),
    );

    for (query, is_xpath) in &locators {
        let locator = if *is_xpath {
            Locator::XPath(query)
        } else {
            Locator::Css(query)
        };

        let elements = match client.find_all(locator).await {
            Ok(elements) => elements,
            Err(e) => {
                ::log::debug!("Load-more lookup '{}' failed: {}", query, e);
                continue;
            }
        };

        for element in elements {
            if !element.is_displayed().await.unwrap_or(false) {
                continue;
            }
            match element.click().await {
                Ok(_) => {
                    ::log::debug!("Clicked load-more control matching '{}'", query);
                    clicked += 1;
                }
                Err(e) => ::log::debug!("Could not click '{}': {}", query, e),
            }
            break;
        }
    }

    clicked
}

/// XPath matching in-page controls whose text contains `token`, ignoring case
///
/// Anchors with a real href are left alone; those are next-page links the
/// engine follows itself.
fn text_token_xpath(token: &str) -> String {
    let token = token.to_lowercase().replace('\'', "");
    format!(
        "//*[self::button or @role='button' or self::a[not(@href) or @href='#' \
         or starts-with(@href, 'javascript:')]][contains(translate(normalize-space(.), \
         'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), '{token}')]"
    )
}

fn is_lost_session(error: &fantoccini::error::CmdError) -> bool {
    let message = error.to_string();
    message.contains("Unable to find session") || message.contains("invalid session id")
}

/// Connects to the configured WebDriver instance, then to common local fallbacks
async fn connect_to_webdriver(webdriver_url: &str) -> Option<Client> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Some(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    for url in FALLBACK_WEBDRIVER_URLS.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Some(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    None
}
