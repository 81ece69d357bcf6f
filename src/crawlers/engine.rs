use crate::config::{CrawlConfig, InteractionHints};
use crate::crawlers::Fetcher;
use crate::filter::normalize_url;
use crate::parsers::text::contains_token;
use crate::results::{CrawlResult, FetchResult, PageRecord};
use crate::stats::{AggregateStats, StatsSnapshot};
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Text fragment that marks a link or control as leading to more content
const MORE_TOKEN: &str = "more";

/// What to do after a page has been stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextAction {
    /// No further page
    Stop,
    /// Fetch the same URL again; the fetcher clicks the load-more control
    Revisit,
    /// Fetch a different page
    Advance(Url),
}

/// Picks the next action from a page's internal links
///
/// The first internal link whose text contains "more" decides: an
/// interactive control means revisit, a plain link means advance to its
/// href resolved against `current_url`. A link whose href cannot be resolved
/// is skipped.
pub fn select_next_action(result: &FetchResult, current_url: &Url) -> NextAction {
    for link in &result.internal_links {
        if !contains_token(&link.text, MORE_TOKEN) {
            continue;
        }

        if link.is_interactive_control {
            ::log::debug!("Found load-more control '{}' on {}", link.text, current_url);
            return NextAction::Revisit;
        }

        match current_url.join(&link.href) {
            Ok(next) => {
                ::log::debug!("Found next-page link '{}' -> {}", link.text, next);
                return NextAction::Advance(next);
            }
            Err(e) => {
                ::log::warn!("Skipping unresolvable link '{}': {}", link.href, e);
            }
        }
    }

    NextAction::Stop
}

/// Drives a paginated crawl one page at a time
///
/// Pages are fetched strictly in sequence since each next URL depends on the
/// previous page. Any failed fetch fails the whole crawl and no partial pages
/// are returned.
pub struct ContinuationEngine<F> {
    fetcher: F,
    hints: InteractionHints,
    page_delay: Duration,
    cancel: CancellationToken,
}

impl<F: Fetcher> ContinuationEngine<F> {
    /// Create an engine with default hints and a one second inter-page delay
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            hints: InteractionHints::default(),
            page_delay: Duration::from_secs(1),
            cancel: CancellationToken::new(),
        }
    }

    /// Create an engine using the hints and delay of a crawl configuration
    pub fn from_config(fetcher: F, config: &CrawlConfig) -> Self {
        Self::new(fetcher)
            .with_hints(config.interaction_hints.clone())
            .with_page_delay(config.page_delay())
    }

    pub fn with_hints(mut self, hints: InteractionHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    /// Use an externally controlled cancellation token
    pub fn with_cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Crawl `url`, following pagination when `handle_pagination` is set
    ///
    /// At most `max_pages` pages are fetched (a limit of 0 behaves like 1).
    /// `total_pages` in the result is the number of pages fetched.
    pub async fn run_crawl(
        &self,
        url: &str,
        handle_pagination: bool,
        max_pages: usize,
    ) -> CrawlResult {
        ::log::info!(
            "Starting crawl of {} (pagination: {}, max pages: {})",
            url,
            handle_pagination,
            max_pages
        );

        let mut current_url = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(e) => {
                ::log::error!("Invalid start URL {}: {}", url, e);
                return CrawlResult::failed(format!("Invalid URL '{url}': {e}"), None);
            }
        };

        let mut pages: Vec<PageRecord> = Vec::new();
        let mut aggregate = AggregateStats::default();
        let mut visited: HashSet<String> = HashSet::new();
        let mut current_page = 1;
        let mut status_code;

        visited.insert(normalize_url(&current_url).to_string());

        loop {
            ::log::info!("Fetching page {}: {}", current_page, current_url);

            let result = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Self::cancelled(current_page),
                result = self.fetcher.fetch(current_url.as_str(), &self.hints) => result,
            };

            if !result.success {
                let message = result
                    .error_message
                    .unwrap_or_else(|| "fetch failed".to_string());
                ::log::error!(
                    "Failed to fetch page {} ({}): {} (status {:?})",
                    current_page,
                    current_url,
                    message,
                    result.status_code
                );
                return CrawlResult::failed(message, result.status_code);
            }

            status_code = result.status_code;

            let snapshot = StatsSnapshot::from_fetch(&result);
            aggregate = aggregate.fold(snapshot);

            let action = if handle_pagination && current_page < max_pages {
                select_next_action(&result, &current_url)
            } else {
                NextAction::Stop
            };

            pages.push(PageRecord {
                page_number: current_page,
                url: current_url.to_string(),
                content: result.content,
                statistics: snapshot,
            });

            let next_url = match action {
                NextAction::Stop => break,
                NextAction::Revisit => current_url.clone(),
                NextAction::Advance(next) => {
                    if !visited.insert(normalize_url(&next).to_string()) {
                        ::log::info!("Next page {} was already fetched, stopping", next);
                        break;
                    }
                    next
                }
            };

            if !self.page_delay.is_zero() {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return Self::cancelled(current_page + 1),
                    _ = tokio::time::sleep(self.page_delay) => {}
                }
            }

            current_url = next_url;
            current_page += 1;
        }

        ::log::info!(
            "Crawl complete - {} pages, {} internal links, {} external links",
            pages.len(),
            aggregate.internal_links,
            aggregate.external_links
        );

        CrawlResult::completed(pages, aggregate, status_code)
    }

    fn cancelled(page: usize) -> CrawlResult {
        ::log::warn!("Crawl cancelled before page {}", page);
        CrawlResult::failed("crawl cancelled", None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::LinkRef;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Serves canned results per URL, or per call for repeated URLs
    #[derive(Default)]
    struct ScriptedFetcher {
        pages: HashMap<String, Vec<FetchResult>>,
        calls: Mutex<Vec<String>>,
        fetched_at: Mutex<Vec<tokio::time::Instant>>,
    }

    impl ScriptedFetcher {
        fn page(mut self, url: &str, result: FetchResult) -> Self {
            self.pages.entry(url.to_string()).or_default().push(result);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for ScriptedFetcher {
        async fn fetch(&self, url: &str, _hints: &InteractionHints) -> FetchResult {
            self.fetched_at.lock().unwrap().push(tokio::time::Instant::now());
            let mut calls = self.calls.lock().unwrap();
            let seen = calls.iter().filter(|u| *u == url).count();
            calls.push(url.to_string());

            match self.pages.get(url) {
                Some(results) => results[seen.min(results.len() - 1)].clone(),
                None => FetchResult::failure(url, Some(404), "not found"),
            }
        }
    }

    fn page(url: &str, content: &str, links: Vec<LinkRef>) -> FetchResult {
        let mut result = FetchResult::success(url, content);
        result.status_code = Some(200);
        result.internal_links = links;
        result.images = vec!["/logo.png".to_string()];
        result
    }

    fn engine(fetcher: ScriptedFetcher) -> ContinuationEngine<ScriptedFetcher> {
        ContinuationEngine::new(fetcher).with_page_delay(Duration::ZERO)
    }

    fn next_link(href: &str) -> LinkRef {
        LinkRef::link(href, "More posts")
    }

    fn three_page_site() -> ScriptedFetcher {
        ScriptedFetcher::default()
            .page(
                "https://example.com/list",
                page("https://example.com/list", "one", vec![next_link("?page=2")]),
            )
            .page(
                "https://example.com/list?page=2",
                page(
                    "https://example.com/list?page=2",
                    "two",
                    vec![LinkRef::link("/about", "About"), next_link("?page=3")],
                ),
            )
            .page(
                "https://example.com/list?page=3",
                page("https://example.com/list?page=3", "three", vec![]),
            )
    }

    #[tokio::test]
    async fn test_single_page_without_pagination() {
        let engine = engine(three_page_site());
        let result = engine.run_crawl("https://example.com/list", false, 10).await;

        assert!(result.success);
        assert_eq!(engine.fetcher().calls().len(), 1);
        assert_eq!(result.pages.len(), 1);
        assert_eq!(result.total_pages, 1);
        assert_eq!(result.aggregate_stats, result.pages[0].statistics);
        assert_eq!(result.status_code, Some(200));
    }

    #[tokio::test]
    async fn test_follows_next_links_until_none() {
        let engine = engine(three_page_site());
        let result = engine.run_crawl("https://example.com/list", true, 10).await;

        assert!(result.success);
        assert_eq!(
            engine.fetcher().calls(),
            vec![
                "https://example.com/list",
                "https://example.com/list?page=2",
                "https://example.com/list?page=3",
            ]
        );
        let numbers: Vec<_> = result.pages.iter().map(|p| p.page_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(result.total_pages, result.pages.len());
        assert_eq!(result.pages[1].content, "two");

        let summed: StatsSnapshot = result.pages.iter().map(|p| &p.statistics).sum();
        assert_eq!(result.aggregate_stats, summed);
        assert_eq!(result.aggregate_stats.images, 3);
        assert_eq!(result.aggregate_stats.internal_links, 3);
    }

    #[tokio::test]
    async fn test_max_pages_one_fetches_once() {
        let engine = engine(three_page_site());
        let result = engine.run_crawl("https://example.com/list", true, 1).await;

        assert!(result.success);
        assert_eq!(engine.fetcher().calls().len(), 1);
        assert_eq!(result.total_pages, 1);
    }

    #[tokio::test]
    async fn test_max_pages_limits_crawl() {
        let engine = engine(three_page_site());
        let result = engine.run_crawl("https://example.com/list", true, 2).await;

        assert!(result.success);
        assert_eq!(engine.fetcher().calls().len(), 2);
        assert_eq!(result.total_pages, 2);
    }

    #[tokio::test]
    async fn test_failure_returns_no_partial_pages() {
        let fetcher = ScriptedFetcher::default()
            .page(
                "https://example.com/list",
                page("https://example.com/list", "one", vec![next_link("?page=2")]),
            )
            .page(
                "https://example.com/list?page=2",
                FetchResult::failure(
                    "https://example.com/list?page=2",
                    Some(503),
                    "Service Unavailable",
                ),
            )
            .page(
                "https://example.com/list?page=3",
                page("https://example.com/list?page=3", "three", vec![]),
            );
        let engine = engine(fetcher);
        let result = engine.run_crawl("https://example.com/list", true, 3).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Service Unavailable"));
        assert_eq!(result.status_code, Some(503));
        assert!(result.pages.is_empty());
        assert_eq!(result.total_pages, 0);
        assert_eq!(engine.fetcher().calls().len(), 2);
    }

    #[tokio::test]
    async fn test_load_more_revisits_until_max_pages() {
        let url = "https://example.com/feed";
        let fetcher = ScriptedFetcher::default().page(
            url,
            page(url, "feed", vec![LinkRef::control(url, "Load more")]),
        );
        let engine = engine(fetcher);
        let result = engine.run_crawl(url, true, 4).await;

        assert!(result.success);
        assert_eq!(engine.fetcher().calls(), vec![url; 4]);
        assert_eq!(result.total_pages, 4);
        assert_eq!(result.pages.len(), 4);
        assert!(result.pages.iter().all(|p| p.url == url));
    }

    #[tokio::test]
    async fn test_next_link_back_to_visited_page_stops() {
        let fetcher = ScriptedFetcher::default()
            .page(
                "https://example.com/a",
                page("https://example.com/a", "a", vec![next_link("/b")]),
            )
            .page(
                "https://example.com/b",
                page("https://example.com/b", "b", vec![next_link("/a#top")]),
            );
        let engine = engine(fetcher);
        let result = engine.run_crawl("https://example.com/a", true, 10).await;

        assert!(result.success);
        assert_eq!(engine.fetcher().calls().len(), 2);
        assert_eq!(result.total_pages, 2);
    }

    #[tokio::test]
    async fn test_invalid_start_url() {
        let engine = engine(ScriptedFetcher::default());
        let result = engine.run_crawl("not a url", false, 10).await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("Invalid URL"));
        assert!(engine.fetcher().calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_crawl_fails_without_pages() {
        let engine = engine(three_page_site());
        engine.cancellation_token().cancel();

        let result = engine.run_crawl("https://example.com/list", true, 10).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("crawl cancelled"));
        assert!(result.pages.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_page_delay_elapses_between_fetches() {
        let delay = Duration::from_millis(1500);
        let engine = ContinuationEngine::new(three_page_site()).with_page_delay(delay);

        let result = engine.run_crawl("https://example.com/list", true, 2).await;
        assert!(result.success);

        let fetched_at = engine.fetcher().fetched_at.lock().unwrap().clone();
        assert_eq!(fetched_at.len(), 2);
        assert!(fetched_at[1] - fetched_at[0] >= delay);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_page_delay() {
        let engine = ContinuationEngine::new(three_page_site())
            .with_page_delay(Duration::from_secs(60));
        let token = engine.cancellation_token();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        });

        let result = engine.run_crawl("https://example.com/list", true, 10).await;
        assert!(!result.success);
        assert_eq!(engine.fetcher().calls().len(), 1);
    }

    #[test]
    fn test_select_first_more_link_wins() {
        let current = Url::parse("https://example.com/blog/").unwrap();
        let mut result = FetchResult::success(current.as_str(), "");
        result.internal_links = vec![
            LinkRef::link("/about", "About us"),
            LinkRef::link("page/2", "MORE stories"),
            LinkRef::control(current.as_str(), "Load more"),
        ];

        assert_eq!(
            select_next_action(&result, &current),
            NextAction::Advance(Url::parse("https://example.com/blog/page/2").unwrap())
        );

        result.internal_links.swap(1, 2);
        assert_eq!(select_next_action(&result, &current), NextAction::Revisit);
    }

    #[test]
    fn test_select_ignores_external_links() {
        let current = Url::parse("https://example.com/").unwrap();
        let mut result = FetchResult::success(current.as_str(), "");
        result.external_links = vec![LinkRef::link("https://other.org/more", "Read more")];

        assert_eq!(select_next_action(&result, &current), NextAction::Stop);
    }

    #[test]
    fn test_select_skips_unresolvable_href() {
        let current = Url::parse("https://example.com/").unwrap();
        let mut result = FetchResult::success(current.as_str(), "");
        result.internal_links = vec![
            LinkRef::link("http://[::1", "More"),
            LinkRef::link("/next", "More"),
        ];

        assert_eq!(
            select_next_action(&result, &current),
            NextAction::Advance(Url::parse("https://example.com/next").unwrap())
        );
    }
}
