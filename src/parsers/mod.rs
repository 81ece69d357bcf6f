pub mod html;
pub mod text;


use crate::results::LinkRef;

/// Content, links and media extracted from one HTML page
#[derive(Debug, Clone, Default)]
pub struct ParseResult {
    /// Markdown-like text content
    pub content: String,
    /// Links and controls on the same host as the page
    pub internal_links: Vec<LinkRef>,
    /// Links pointing to other hosts
    pub external_links: Vec<LinkRef>,
    pub images: Vec<String>,
    pub videos: Vec<String>,
    pub audios: Vec<String>,
}

impl ParseResult {
    /// Creates a parse result with content only (no links or media)
    pub fn content_only(content: String) -> Self {
        Self {
            content,
            ..Self::default()
        }
    }
}
