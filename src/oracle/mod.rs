//! Out-of-band pagination discovery.
//!
//! A [`PaginationOracle`] proposes candidate pagination links from the
//! content of an already saved first page. [`PaginationDetector`] turns those
//! raw suggestions into absolute, pagination-shaped, deduplicated URLs.
//! The live crawl never calls into this module.

pub mod gemini;
pub mod recovery;


pub use gemini::GeminiOracle;
pub use recovery::{read_first_page, recover_pagination_urls};

use crate::error::Result;
use crate::filter::{PaginationFilter, PaginationFilterConfig, normalize_candidate};
use async_trait::async_trait;
use std::collections::HashSet;
use url::Url;

/// External classifier proposing pagination links for a page
#[async_trait]
pub trait PaginationOracle: Send + Sync {
    /// Raw candidate links (absolute or relative) found in `content`
    async fn suggest_pagination_urls(&self, content: &str, base_url: &str) -> Result<Vec<String>>;
}

/// Runs an oracle and filters its suggestions down to pagination URLs
pub struct PaginationDetector {
    oracle: Box<dyn PaginationOracle>,
    filter: PaginationFilter,
}

impl PaginationDetector {
    pub fn new(oracle: Box<dyn PaginationOracle>) -> Self {
        Self {
            oracle,
            filter: PaginationFilter::default(),
        }
    }

    pub fn with_filter(mut self, filter: PaginationFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Replace the pagination patterns; fails if any pattern is not a valid regex
    pub fn with_filter_config(self, config: PaginationFilterConfig) -> Result<Self> {
        let filter = PaginationFilter::new(config)?;
        Ok(self.with_filter(filter))
    }

    /// Candidate pagination URLs for a page; never fails
    ///
    /// Oracle errors are logged and yield an empty list.
    pub async fn detect(&self, content: &str, base_url: &str) -> Vec<String> {
        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(e) => {
                ::log::error!("Invalid base URL '{}': {}", base_url, e);
                return Vec::new();
            }
        };

        match self.oracle.suggest_pagination_urls(content, base_url).await {
            Ok(suggestions) => self.filter_suggestions(&suggestions, &base),
            Err(e) => {
                ::log::error!("Error in pagination detection: {}", e);
                Vec::new()
            }
        }
    }

    /// Normalize, pattern-filter and deduplicate raw suggestions
    ///
    /// Order of first appearance is kept. Malformed and non-pagination
    /// suggestions are skipped with a warning.
    pub fn filter_suggestions(&self, suggestions: &[String], base: &Url) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();

        for suggestion in suggestions {
            let suggestion = suggestion.trim();
            if suggestion.is_empty() {
                continue;
            }

            let url = match normalize_candidate(suggestion, base) {
                Ok(url) => url,
                Err(e) => {
                    ::log::warn!("Invalid URL found: {}", e);
                    continue;
                }
            };

            if !self.filter.is_pagination_url(&url) {
                ::log::warn!("Discarding non-pagination URL: {}", url);
                continue;
            }

            let url = url.to_string();
            if seen.insert(url.clone()) {
                urls.push(url);
            }
        }

        if !urls.is_empty() {
            ::log::info!("Found {} pagination URLs: {:?}", urls.len(), urls);
        }

        urls
    }
}
