//! Nemlig-Catalog main entry point
//!
//! This is the command-line interface for the nemlig.com catalog extractor.

use anyhow::Context;
use clap::Parser;
use nemlig_catalog::config::{default_config_hash, load_config_with_hash, Config};
use nemlig_catalog::crawler::discover;
use nemlig_catalog::output::{
    load_statistics, print_discovery_summary, print_product_summary, print_statistics,
};
use nemlig_catalog::pipeline;
use nemlig_catalog::storage::open_storage;
use nemlig_catalog::url::UrlNormalizer;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Nemlig-Catalog: a grocery catalog extractor
///
/// Discovers every product category of nemlig.com by walking its JSON
/// category tree, then fetches each category's products into SQLite.
#[derive(Parser, Debug)]
#[command(name = "nemlig-catalog")]
#[command(version)]
#[command(about = "A nemlig.com grocery catalog extractor", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be fetched without fetching
    #[arg(long, conflicts_with_all = ["stats", "discover_only"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "discover_only"])]
    stats: bool,

    /// Discover categories, print them as JSON and exit without storing
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    discover_only: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (cfg, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        None => {
            tracing::info!("No configuration file given, using defaults");
            (Config::default(), default_config_hash())
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.discover_only {
        handle_discover_only(&config).await?;
    } else {
        handle_run(&config, &config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("nemlig_catalog=info,warn"),
            1 => EnvFilter::new("nemlig_catalog=debug,info"),
            2 => EnvFilter::new("nemlig_catalog=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    let normalizer = UrlNormalizer::from_site(&config.site);

    println!("=== Nemlig-Catalog Dry Run ===\n");

    println!("Site:");
    println!("  Base URL: {}", config.site.base_url);
    println!("  Root page: {}", normalizer.normalize(&config.site.root_path));
    println!("  Category prefix: {}", config.site.category_prefix);
    println!("  Sort order: {}", config.site.sort_order);

    println!("\nHTTP:");
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  User agent: {}", config.http.user_agent);

    println!("\nProducts:");
    if config.products.enabled {
        println!("  Page size: {}", config.products.page_size);
        println!(
            "  Max pages per category: {}",
            config.products.max_pages_per_category
        );
    } else {
        println!("  Disabled");
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Database: {}\n", config.output.database_path);

    let storage = open_storage(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --discover-only mode: prints the category document to stdout
async fn handle_discover_only(config: &Config) -> anyhow::Result<()> {
    let outcome = discover(config).await?;

    if outcome.stats.fetch_failures > 0 {
        tracing::warn!(
            "{} pages failed to load: {:?}",
            outcome.stats.fetch_failures,
            outcome.stats.failed_paths
        );
    }

    let document = serde_json::to_string_pretty(&outcome.document())?;
    println!("{}", document);

    Ok(())
}

/// Handles a full run: discovery, product fetch and persistence
async fn handle_run(config: &Config, config_hash: &str) -> anyhow::Result<()> {
    tracing::info!(
        "Starting run against {}{}",
        config.site.base_url,
        config.site.root_path
    );

    match pipeline::run(config, config_hash).await {
        Ok(report) => {
            print_discovery_summary(&report.discovery);
            if let Some(products) = &report.products {
                println!();
                print_product_summary(products);
            }
            println!(
                "\nRun {} stored: {} new, {} updated, {} unchanged products",
                report.run_id, report.merge.inserted, report.merge.updated, report.merge.unchanged
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
