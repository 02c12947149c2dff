//! Listing Harvester main entry point
//!
//! This is the command-line interface for the load-more listing harvester.

use clap::Parser;
use listing_harvester::config::load_config_with_hash;
use listing_harvester::harvest::run_harvest;
use listing_harvester::output::print_report;
use listing_harvester::store::{JsonFileStore, ResultStore};
use listing_harvester::url::ListingKey;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Listing Harvester: exhaustive "load more" listing scraper
///
/// Expands every configured listing page until nothing is left to load,
/// extracts article metadata and writes one JSON file per listing.
/// Listings that already have a non-empty result are skipped.
#[derive(Parser, Debug)]
#[command(name = "listing-harvester")]
#[command(version = "1.0.0")]
#[command(about = "Exhaustive load-more listing scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show where each listing would be stored
    #[arg(long, conflicts_with_all = ["stats", "export_merged"])]
    dry_run: bool,

    /// Show per-listing article counts from the storage root and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_merged"])]
    stats: bool,

    /// Write all stored articles, deduplicated by URL, to the merged path and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_merged: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_merged {
        handle_export_merged(&config)?;
    } else {
        handle_harvest(&config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("listing_harvester=info,warn"),
            1 => EnvFilter::new("listing_harvester=debug,info"),
            2 => EnvFilter::new("listing_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the plan without opening a browser
fn handle_dry_run(
    config: &listing_harvester::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Listing Harvester Dry Run ===\n");

    println!("Site:");
    println!("  Origin: {}", config.site.origin);

    println!("\nTraversal:");
    println!("  Load-more delay: {}ms", config.traversal.load_more_delay_ms);
    println!("  Max expansions: {}", config.traversal.max_expansions);
    println!("  Listing timeout: {}s", config.traversal.listing_timeout_secs);
    println!("  Max listings: {}", config.traversal.max_listings);

    println!("\nBrowser:");
    match &config.browser.remote_debugging_url {
        Some(url) => println!("  Remote: {}", url),
        None => println!("  Headless: {}", config.browser.headless),
    }

    let store = JsonFileStore::new(&config.output.storage_root);
    println!("\nListings ({}):", config.listings.len());

    let mut pending = 0;
    for listing in &config.listings {
        let key = ListingKey::from_url(listing)?;
        let done = store.has(&key)?;
        if !done {
            pending += 1;
        }
        println!(
            "  - {} -> {}{}",
            listing,
            store.path_for(&key).display(),
            if done { " (done, will skip)" } else { "" }
        );
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would harvest {} listings", pending);

    Ok(())
}

/// Handles the --stats mode: shows per-listing counts from the store
fn handle_stats(
    config: &listing_harvester::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    use listing_harvester::output::{load_statistics, print_statistics};

    println!("Storage root: {}\n", config.output.storage_root);

    let store = JsonFileStore::new(&config.output.storage_root);
    let stats = load_statistics(&store)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-merged mode: writes the deduplicated article list
fn handle_export_merged(
    config: &listing_harvester::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    use listing_harvester::output::export_merged;

    println!("=== Exporting Merged Articles ===\n");
    println!("Storage root: {}", config.output.storage_root);
    println!("Output: {}", config.output.merged_path);
    println!();

    let store = JsonFileStore::new(&config.output.storage_root);
    let written = export_merged(&store, Path::new(&config.output.merged_path))?;

    println!("✓ {} articles exported to: {}", written, config.output.merged_path);

    Ok(())
}

/// Handles the main harvest operation
async fn handle_harvest(
    config: &listing_harvester::config::Config,
) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Harvesting {} listings from {}",
        config.listings.len(),
        config.site.origin
    );

    match run_harvest(config).await {
        Ok(report) => {
            print_report(&report);
            if report.failures.is_empty() {
                tracing::info!("Harvest completed successfully");
            } else {
                tracing::warn!("{} listings failed", report.failures.len());
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
