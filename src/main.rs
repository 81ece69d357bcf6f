use clap::Parser;
use next_page::output::save_crawl;
use next_page::stats::StatsReport;
use next_page::{Crawl, GeminiOracle, PaginationDetector, recover_pagination_urls};
use std::error::Error;
use tokio_util::sync::CancellationToken;

mod args;
use args::{Args, Command, CrawlArgs};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    match args.command {
        Command::Crawl(crawl_args) => crawl(crawl_args).await,
        Command::Recover { output_dir } => {
            let detector = PaginationDetector::new(Box::new(GeminiOracle::from_env()?));
            let urls = recover_pagination_urls(&output_dir, &detector).await;
            if urls.is_empty() {
                println!("No pagination URLs found in {}", output_dir.display());
            }
            for url in urls {
                println!("{url}");
            }
            Ok(())
        }
    }
}

async fn crawl(args: CrawlArgs) -> Result<(), Box<dyn Error>> {
    let mut builder = Crawl::new(&args.url);
    if let Some(path) = &args.config {
        let mut config = next_page::CrawlConfig::from_file(path)?;
        config.start_url = args.url.clone();
        builder = builder.with_config(config);
    }

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            ::log::warn!("Interrupted, cancelling crawl");
            ctrl_c.cancel();
        }
    });

    if args.paginate {
        builder = builder.with_pagination(true);
    }
    if let Some(max_pages) = args.max_pages {
        builder = builder.with_max_pages(max_pages);
    }
    if let Some(delay_ms) = args.delay_ms {
        builder = builder.with_page_delay_ms(delay_ms);
    }
    if args.no_load_more {
        builder = builder.with_interaction_hints(next_page::InteractionHints::none());
    }
    let builder = builder.with_cancellation_token(cancel);

    println!("Note: crawling requires a WebDriver server (e.g., ChromeDriver).");
    println!(
        "Set WEBDRIVER_URL environment variable if not using the default http://localhost:4444"
    );
    println!("\nScraping {}...", args.url);

    let start_time = std::time::Instant::now();
    let result = builder.run().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        if !result.success {
            std::process::exit(1);
        }
        return Ok(());
    }

    let result = match result.into_result() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    println!(
        "\n{}",
        StatsReport {
            stats: &result.aggregate_stats,
            total_pages: result.total_pages,
        }
    );

    let dir = save_crawl(&args.output, &args.url, &result)?;
    println!("\nFiles saved in directory: {}", dir.display());
    println!("Total pages scraped: {}", result.total_pages);

    ::log::info!(
        "Crawling complete - {} pages in {:.2} seconds",
        result.total_pages,
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
