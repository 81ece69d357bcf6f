use crate::results::FetchResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// Link and media counts for one page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub internal_links: usize,
    pub external_links: usize,
    pub images: usize,
    pub videos: usize,
    pub audios: usize,
}

/// Running total across all pages of a crawl
pub type AggregateStats = StatsSnapshot;

impl StatsSnapshot {
    /// Count the link and media collections of a fetch result
    pub fn from_fetch(result: &FetchResult) -> Self {
        Self {
            internal_links: result.internal_links.len(),
            external_links: result.external_links.len(),
            images: result.images.len(),
            videos: result.videos.len(),
            audios: result.audios.len(),
        }
    }

    /// Field-wise sum of two snapshots
    #[must_use]
    pub fn fold(self, other: Self) -> Self {
        Self {
            internal_links: self.internal_links + other.internal_links,
            external_links: self.external_links + other.external_links,
            images: self.images + other.images,
            videos: self.videos + other.videos,
            audios: self.audios + other.audios,
        }
    }
}

impl Sum for StatsSnapshot {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Self::fold)
    }
}

impl<'a> Sum<&'a StatsSnapshot> for StatsSnapshot {
    fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Human-readable statistics block printed after a crawl
pub struct StatsReport<'a> {
    pub stats: &'a AggregateStats,
    pub total_pages: usize,
}

impl fmt::Display for StatsReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Statistics Report ===")?;
        writeln!(f, "Total Pages Scraped: {}", self.total_pages)?;
        writeln!(f, "Internal Links Found: {}", self.stats.internal_links)?;
        writeln!(f, "External Links Found: {}", self.stats.external_links)?;
        writeln!(f, "Images Found: {}", self.stats.images)?;
        writeln!(f, "Videos Found: {}", self.stats.videos)?;
        writeln!(f, "Audio Elements Found: {}", self.stats.audios)?;
        write!(f, "=====================")
    }
}
