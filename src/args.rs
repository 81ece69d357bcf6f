use clap::{Parser, Subcommand};
use next_page::config::parse_max_pages;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "next-page")]
#[command(about = "Fetches a page, follows its pagination and saves every page")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Crawl a URL and save each page as markdown
    Crawl(CrawlArgs),

    /// Suggest pagination URLs for a previously saved crawl
    Recover {
        /// Directory containing page_1.md
        output_dir: PathBuf,
    },
}

#[derive(clap::Args, Debug)]
pub struct CrawlArgs {
    /// URL of the first page
    pub url: String,

    /// Follow "more"/"next" links after the first page
    #[arg(short, long)]
    pub paginate: bool,

    /// Maximum number of pages to fetch [default: 10; non-numeric values fall back to it]
    #[arg(short, long, value_parser = max_pages_arg)]
    pub max_pages: Option<usize>,

    /// Pause between page fetches in milliseconds [default: 1000]
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Directory under which the crawl directory is created
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// JSON crawler configuration; command-line flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Do not click load-more buttons on fetched pages
    #[arg(long)]
    pub no_load_more: bool,

    /// Print the crawl result as JSON instead of saving pages
    #[arg(long)]
    pub json: bool,
}

/// Lenient page-limit parser: never rejects the argument
fn max_pages_arg(value: &str) -> Result<usize, String> {
    Ok(parse_max_pages(value))
}
