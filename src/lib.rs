pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod oracle;
pub mod output;
pub mod parsers;
pub mod results;
pub mod stats;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{CrawlConfig, InteractionHints, OracleConfig};
pub use crawlers::{ContinuationEngine, Fetcher, WebFetcher};
pub use error::{Error, Result};
pub use oracle::{GeminiOracle, PaginationDetector, PaginationOracle, recover_pagination_urls};
pub use results::{CrawlResult, FetchResult, LinkRef, PageRecord};
pub use stats::{AggregateStats, StatsSnapshot};

use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Builder for a single crawl of one start URL
pub struct Crawl {
    config: CrawlConfig,
    cancel: Option<CancellationToken>,
}

impl Crawl {
    /// Create a new crawl of `url` with default settings (no pagination)
    pub fn new(url: &str) -> Self {
        Self {
            config: CrawlConfig::new(url),
            cancel: None,
        }
    }

    /// Follow pagination links after the first page
    pub fn with_pagination(mut self, handle_pagination: bool) -> Self {
        self.config.handle_pagination = handle_pagination;
        self
    }

    /// Set the maximum number of pages to fetch; 0 falls back to the default
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = if max_pages == 0 {
            config::DEFAULT_MAX_PAGES
        } else {
            max_pages
        };
        self
    }

    /// Set the pause between page fetches
    pub fn with_page_delay_ms(mut self, page_delay_ms: u64) -> Self {
        self.config.page_delay_ms = page_delay_ms;
        self
    }

    /// Set the load-more controls the fetcher tries to activate
    pub fn with_interaction_hints(mut self, hints: InteractionHints) -> Self {
        self.config.interaction_hints = hints;
        self
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: CrawlConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        let config = CrawlConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    /// Stop the crawl when `cancel` fires
    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Run the crawl with any [`Fetcher`]
    pub async fn run_with<F: Fetcher>(self, fetcher: F) -> CrawlResult {
        let mut engine = ContinuationEngine::from_config(fetcher, &self.config);
        if let Some(cancel) = self.cancel {
            engine = engine.with_cancellation_token(cancel);
        }

        engine
            .run_crawl(
                &self.config.start_url,
                self.config.handle_pagination,
                self.config.max_pages,
            )
            .await
    }

    /// Run the crawl through a WebDriver browser
    ///
    /// The WebDriver URL can be overridden with the `WEBDRIVER_URL` environment variable.
    pub async fn run(self) -> CrawlResult {
        let config = self.config.clone().apply_env();
        let fetcher = WebFetcher::from_config(&config);

        let crawl = self.with_config(config);
        let result = crawl.run_with(&fetcher).await;

        fetcher.close().await;
        result
    }
}

/// Crawl `url` through a WebDriver browser
pub async fn run_crawl(url: &str, handle_pagination: bool, max_pages: usize) -> CrawlResult {
    Crawl::new(url)
        .with_pagination(handle_pagination)
        .with_max_pages(max_pages)
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Every page links to a next page, forever
    #[derive(Default)]
    struct EndlessFetcher {
        calls: AtomicUsize,
        clicking_calls: AtomicUsize,
    }

    #[async_trait]
    impl Fetcher for EndlessFetcher {
        async fn fetch(&self, url: &str, hints: &InteractionHints) -> FetchResult {
            if !hints.is_empty() {
                self.clicking_calls.fetch_add(1, Ordering::SeqCst);
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            let mut result = FetchResult::success(url, format!("page {n}"));
            result.internal_links = vec![LinkRef::link(format!("/list?page={}", n + 1), "more")];
            result
        }
    }

    #[tokio::test]
    async fn test_builder_applies_settings() {
        let fetcher = EndlessFetcher::default();
        let result = Crawl::new("https://example.com/list")
            .with_pagination(true)
            .with_max_pages(3)
            .with_page_delay_ms(0)
            .run_with(&fetcher)
            .await;

        assert!(result.success);
        assert_eq!(result.total_pages, 3);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.pages[2].url, "https://example.com/list?page=3");
    }

    #[tokio::test]
    async fn test_builder_defaults_to_single_page() {
        let fetcher = EndlessFetcher::default();
        let result = Crawl::new("https://example.com/list").run_with(&fetcher).await;

        assert_eq!(result.total_pages, 1);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_interaction_hints_reach_fetcher() {
        let fetcher = EndlessFetcher::default();
        Crawl::new("https://example.com/list")
            .with_pagination(true)
            .with_max_pages(2)
            .with_page_delay_ms(0)
            .run_with(&fetcher)
            .await;
        assert_eq!(fetcher.clicking_calls.load(Ordering::SeqCst), 2);

        let fetcher = EndlessFetcher::default();
        Crawl::new("https://example.com/list")
            .with_pagination(true)
            .with_max_pages(2)
            .with_page_delay_ms(0)
            .with_interaction_hints(InteractionHints::none())
            .run_with(&fetcher)
            .await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
        assert_eq!(fetcher.clicking_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_zero_max_pages_uses_default() {
        let crawl = Crawl::new("https://example.com").with_max_pages(0);
        assert_eq!(crawl.config().max_pages, config::DEFAULT_MAX_PAGES);
    }
}
