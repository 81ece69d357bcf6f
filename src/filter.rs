use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration for recognising pagination URLs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationFilterConfig {
    /// Regex patterns matched against a URL's path and query; a URL is kept if any matches
    #[serde(default = "default_pagination_patterns")]
    pub patterns: Vec<String>,
}

/// URL shapes commonly used for paginated listings
pub fn default_pagination_patterns() -> Vec<String> {
    [
        // Numbered pages
        r"page-\d+\.html",
        r"page_num=\d+",
        r"/page/\d+/?",
        r"page=\d+",
        r"/p/\d+",
        r"[?&]p=\d+",
        // Offsets
        r"offset=\d+",
        r"start=\d+",
        r"[?&]from=\d+",
        r"/load-more/\d+",
        // Opaque cursors
        r"cursor=[\w-]+",
    ]
    .iter()
    .map(|p| p.to_string())
    .collect()
}

impl Default for PaginationFilterConfig {
    fn default() -> Self {
        Self {
            patterns: default_pagination_patterns(),
        }
    }
}

/// Keeps only URLs that look like a page of a paginated listing
#[derive(Debug)]
pub struct PaginationFilter {
    regexes: Vec<Regex>,
}

impl Default for PaginationFilter {
    fn default() -> Self {
        Self::new(PaginationFilterConfig::default())
            .expect("Default pagination patterns should be valid")
    }
}

impl PaginationFilter {
    /// Compile the configured patterns (case-insensitive)
    pub fn new(config: PaginationFilterConfig) -> std::result::Result<Self, regex::Error> {
        let mut regexes = Vec::with_capacity(config.patterns.len());
        for pattern in &config.patterns {
            regexes.push(Regex::new(&format!("(?i){pattern}"))?);
        }

        Ok(Self { regexes })
    }

    /// Whether the URL's path or query has a pagination shape
    pub fn is_pagination_url(&self, url: &Url) -> bool {
        let target = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        self.regexes.iter().any(|regex| regex.is_match(&target))
    }
}

/// Resolve a candidate string to an absolute URL against `base`
///
/// Absolute candidates pass through, `//host/...` inherits the base scheme,
/// `/path` resolves against the base origin and anything else resolves
/// relative to the base URL itself.
pub fn normalize_candidate(candidate: &str, base: &Url) -> Result<Url> {
    let candidate = candidate.trim();
    let malformed = |reason: String| Error::MalformedCandidate {
        candidate: candidate.to_string(),
        reason,
    };

    if candidate.is_empty() {
        return Err(malformed("empty candidate".to_string()));
    }

    let resolved = if let Ok(url) = Url::parse(candidate) {
        url
    } else if candidate.starts_with("//") {
        Url::parse(&format!("{}:{}", base.scheme(), candidate))
            .map_err(|e| malformed(e.to_string()))?
    } else if candidate.starts_with('/') {
        let origin = Url::parse(&base.origin().ascii_serialization())
            .map_err(|e| malformed(e.to_string()))?;
        origin.join(candidate).map_err(|e| malformed(e.to_string()))?
    } else {
        base.join(candidate).map_err(|e| malformed(e.to_string()))?
    };

    match resolved.scheme() {
        "http" | "https" => Ok(resolved),
        other => Err(malformed(format!("unsupported scheme '{other}'"))),
    }
}

/// Strip the fragment so `page#top` and `page` count as the same page
pub fn normalize_url(url: &Url) -> Url {
    let mut normalized = url.clone();
    normalized.set_fragment(None);
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/blog/").unwrap()
    }

    #[test]
    fn test_root_relative_resolves_against_origin() {
        let url = normalize_candidate("/page/2/", &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/page/2/");
    }

    #[test]
    fn test_relative_resolves_against_base() {
        let url = normalize_candidate("page/2", &base()).unwrap();
        assert_eq!(url.as_str(), "https://example.com/blog/page/2");
    }

    #[test]
    fn test_schema_relative_inherits_scheme() {
        let url = normalize_candidate("//cdn.example.com/x", &base()).unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/x");

        let http_base = Url::parse("http://example.com/").unwrap();
        let url = normalize_candidate("//cdn.example.com/x", &http_base).unwrap();
        assert_eq!(url.as_str(), "http://cdn.example.com/x");
    }

    #[test]
    fn test_absolute_passes_through() {
        let url = normalize_candidate("https://other.org/list?page=4", &base()).unwrap();
        assert_eq!(url.as_str(), "https://other.org/list?page=4");
    }

    #[test]
    fn test_malformed_candidates_are_rejected() {
        assert!(matches!(
            normalize_candidate("", &base()),
            Err(Error::MalformedCandidate { .. })
        ));
        assert!(matches!(
            normalize_candidate("http://[::1", &base()),
            Err(Error::MalformedCandidate { .. })
        ));
        assert!(matches!(
            normalize_candidate("mailto:someone@example.com", &base()),
            Err(Error::MalformedCandidate { .. })
        ));
    }

    #[test]
    fn test_pagination_shapes() {
        let filter = PaginationFilter::default();
        let check = |s: &str| filter.is_pagination_url(&Url::parse(s).unwrap());

        assert!(!check("https://example.com/about"));
        assert!(check("https://example.com/page/3/"));
        assert!(check("https://example.com/?cursor=abc123"));
        assert!(check("https://example.com/list?page=2"));
        assert!(check("https://example.com/list?sort=new&p=7"));
        assert!(check("https://example.com/archive/page-12.html"));
        assert!(check("https://example.com/search?q=x&offset=40"));
        assert!(check("https://example.com/PAGE/4"));
        assert!(!check("https://example.com/pages/about"));
    }

    #[test]
    fn test_host_is_not_matched() {
        let filter = PaginationFilter::default();
        let url = Url::parse("https://page-1.html.example.com/contact").unwrap();
        assert!(!filter.is_pagination_url(&url));
    }

    #[test]
    fn test_custom_patterns() {
        let config = PaginationFilterConfig {
            patterns: vec![r"/seite/\d+".to_string()],
        };
        let filter = PaginationFilter::new(config).unwrap();
        assert!(filter.is_pagination_url(&Url::parse("https://example.de/seite/2").unwrap()));
        assert!(!filter.is_pagination_url(&Url::parse("https://example.de/page/2").unwrap()));
    }

    #[test]
    fn test_invalid_pattern() {
        let config = PaginationFilterConfig {
            patterns: vec![r"page=(\d+".to_string()],
        };
        assert!(PaginationFilter::new(config).is_err());
    }

    #[test]
    fn test_normalize_url_strips_fragment() {
        let url = Url::parse("https://example.com/list?page=2#results").unwrap();
        assert_eq!(normalize_url(&url).as_str(), "https://example.com/list?page=2");
    }
}
