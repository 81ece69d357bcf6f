use crate::error::Result;
use crate::parsers::text::clean_lines;
use crate::results::{CrawlResult, PageRecord};
use crate::utils::host_label;
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of a saved page
pub fn page_file_name(page_number: usize) -> String {
    format!("page_{page_number}.md")
}

/// Saved form of a page: header line, `URL:` line, blank line, cleaned content
pub fn render_page(page: &PageRecord) -> String {
    format!(
        "# Page {}\nURL: {}\n\n{}",
        page.page_number,
        page.url,
        clean_lines(&page.content)
    )
}

/// Directory for one crawl: `<root>/<host>_<timestamp>`
pub fn output_dir(root: &Path, url: &str, at: DateTime<Local>) -> PathBuf {
    root.join(format!(
        "{}_{}",
        host_label(url),
        at.format("%Y_%m_%d__%H_%M_%S")
    ))
}

/// Writes each page of a crawl into `dir`, creating it if needed
pub fn write_pages(dir: &Path, result: &CrawlResult) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(result.pages.len());
    for page in &result.pages {
        let path = dir.join(page_file_name(page.page_number));
        fs::write(&path, render_page(page))?;
        ::log::debug!("Saved page {} to {}", page.page_number, path.display());
        written.push(path);
    }

    Ok(written)
}

/// Saves a crawl under a fresh timestamped directory below `root`
pub fn save_crawl(root: &Path, start_url: &str, result: &CrawlResult) -> Result<PathBuf> {
    let dir = output_dir(root, start_url, Local::now());
    let written = write_pages(&dir, result)?;
    ::log::info!("Saved {} pages to {}", written.len(), dir.display());
    Ok(dir)
}
