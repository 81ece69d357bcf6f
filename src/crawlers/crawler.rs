use crate::config::InteractionHints;
use crate::results::FetchResult;
use async_trait::async_trait;

/// Source of fetched pages for the continuation engine
///
/// Implementations must try the interaction hints (clicking "load more"
/// controls) before returning, and report every failure through
/// [`FetchResult::failure`] rather than an error.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch a page and extract its content, links and media
    async fn fetch(&self, url: &str, hints: &InteractionHints) -> FetchResult;
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    async fn fetch(&self, url: &str, hints: &InteractionHints) -> FetchResult {
        (**self).fetch(url, hints).await
    }
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for &F {
    async fn fetch(&self, url: &str, hints: &InteractionHints) -> FetchResult {
        (**self).fetch(url, hints).await
    }
}
