use crate::error::Error;
use crate::stats::{AggregateStats, StatsSnapshot};
use serde::{Deserialize, Serialize};

/// A navigation element discovered on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    /// Target of the link, as written in the page (may be relative)
    pub href: String,

    /// Visible text of the element
    #[serde(default)]
    pub text: String,

    /// Clickable control that loads more content in place, rather than a link to another page
    #[serde(default)]
    pub is_interactive_control: bool,
}

impl LinkRef {
    /// Create a plain hyperlink
    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
            is_interactive_control: false,
        }
    }

    /// Create an interactive control such as a "Load more" button
    pub fn control(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            text: text.into(),
            is_interactive_control: true,
        }
    }
}

/// Outcome of a single fetch attempt
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FetchResult {
    /// URL that was requested
    pub url: String,

    pub success: bool,

    #[serde(default)]
    pub status_code: Option<u16>,

    #[serde(default)]
    pub error_message: Option<String>,

    /// Extracted page content (markdown-like text)
    #[serde(default)]
    pub content: String,

    #[serde(default)]
    pub internal_links: Vec<LinkRef>,

    #[serde(default)]
    pub external_links: Vec<LinkRef>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub videos: Vec<String>,

    #[serde(default)]
    pub audios: Vec<String>,
}

impl FetchResult {
    /// Create a successful result with the given content and no links or media
    pub fn success(url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            success: true,
            content: content.into(),
            ..Self::default()
        }
    }

    /// Create a failed result
    pub fn failure(
        url: impl Into<String>,
        status_code: Option<u16>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            success: false,
            status_code,
            error_message: Some(error_message.into()),
            ..Self::default()
        }
    }
}

/// One successfully fetched page of a crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// 1-based position of the page in the crawl
    pub page_number: usize,
    pub url: String,
    pub content: String,
    pub statistics: StatsSnapshot,
}

/// Terminal output of one crawl
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CrawlResult {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub pages: Vec<PageRecord>,

    /// Number of pages fetched; always equal to `pages.len()`
    pub total_pages: usize,

    pub aggregate_stats: AggregateStats,

    /// Status code of the last fetch, when the fetcher reports one
    pub status_code: Option<u16>,
}

impl CrawlResult {
    /// Build a successful result from the collected pages
    pub fn completed(
        pages: Vec<PageRecord>,
        aggregate_stats: AggregateStats,
        status_code: Option<u16>,
    ) -> Self {
        Self {
            success: true,
            error: None,
            total_pages: pages.len(),
            pages,
            aggregate_stats,
            status_code,
        }
    }

    /// Build a failed result; failures never carry partial pages
    pub fn failed(error: impl Into<String>, status_code: Option<u16>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            status_code,
            ..Self::default()
        }
    }

    /// Convert a failed crawl into an [`Error::Fetch`]
    pub fn into_result(self) -> Result<Self, Error> {
        if self.success {
            Ok(self)
        } else {
            Err(Error::Fetch {
                status_code: self.status_code,
                message: self.error.unwrap_or_else(|| "unknown error".to_string()),
            })
        }
    }
}
