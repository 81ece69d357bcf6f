use crate::error::{Error, Result};
use crate::oracle::PaginationDetector;
use crate::output::page_file_name;
use std::fs;
use std::path::Path;

const URL_PREFIX: &str = "URL: ";

/// Reads saved page 1 from `output_dir`, returning its full text and its URL
pub fn read_first_page(output_dir: &Path) -> Result<(String, String)> {
    let page_file = output_dir.join(page_file_name(1));
    if !page_file.is_file() {
        return Err(Error::FirstPageMissing(output_dir.to_path_buf()));
    }

    let content = fs::read_to_string(&page_file)?;
    let base_url = content
        .lines()
        .find_map(|line| line.strip_prefix(URL_PREFIX))
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| Error::FirstPageMissing(output_dir.to_path_buf()))?;

    Ok((content, base_url))
}

/// Recovers candidate pagination URLs from a saved crawl directory
///
/// Never fails: a missing or unreadable first page, or an oracle failure,
/// is logged and gives an empty list.
pub async fn recover_pagination_urls(
    output_dir: &Path,
    detector: &PaginationDetector,
) -> Vec<String> {
    let (content, base_url) = match read_first_page(output_dir) {
        Ok(page) => page,
        Err(e) => {
            ::log::error!("Error reading first page content: {}", e);
            return Vec::new();
        }
    };

    detector.detect(&content, &base_url).await
}
