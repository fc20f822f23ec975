//! Statistics generation from the catalog database
//!
//! This module provides functionality for extracting and displaying
//! run statistics from the storage layer.

use crate::crawler::DiscoveryStats;
use crate::products::ProductFetchStats;
use crate::storage::{RunRecord, Storage};
use crate::CatalogError;

/// Catalog statistics summary
#[derive(Debug, Clone)]
pub struct CatalogStatistics {
    /// Number of runs recorded
    pub runs: u64,

    /// The most recent run
    pub latest_run: Option<RunRecord>,

    /// Categories stored by the latest crawl
    pub categories: u64,

    /// Distinct products stored
    pub products: u64,

    /// Product versions ever recorded
    pub history_rows: u64,

    /// Product versions currently valid
    pub current_history_rows: u64,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CatalogStatistics)` - Successfully loaded statistics
/// * `Err(CatalogError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CatalogStatistics, CatalogError> {
    Ok(CatalogStatistics {
        runs: storage.count_runs()?,
        latest_run: storage.get_latest_run()?,
        categories: storage.count_categories()?,
        products: storage.count_products()?,
        history_rows: storage.count_history_rows()?,
        current_history_rows: storage.count_current_history()?,
    })
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &CatalogStatistics) {
    println!("=== Catalog Statistics ===\n");

    println!("Runs recorded: {}", stats.runs);
    match &stats.latest_run {
        Some(run) => {
            println!("\nLatest run #{}:", run.id);
            println!("  Status:         {}", run.status.to_db_string());
            println!("  Started:        {}", run.started_at);
            println!(
                "  Finished:       {}",
                run.finished_at.as_deref().unwrap_or("-")
            );
            println!("  Config hash:    {}", run.config_hash);
            println!("  Pages fetched:  {}", run.totals.pages_fetched);
            println!("  Fetch failures: {}", run.totals.fetch_failures);
        }
        None => println!("\nNo runs recorded yet"),
    }

    println!("\nStored data:");
    println!("  Categories:            {}", stats.categories);
    println!("  Products:              {}", stats.products);
    println!("  Product versions:      {}", stats.history_rows);
    println!("  Current versions:      {}", stats.current_history_rows);
}

/// Prints the outcome of a discovery crawl
pub fn print_discovery_summary(stats: &DiscoveryStats) {
    println!("=== Category Discovery ===");
    println!("  Pages fetched:   {}", stats.pages_fetched);
    println!("  Category paths:  {}", stats.distinct_paths);
    println!("  Categories:      {}", stats.categories);
    println!("  Empty pages:     {}", stats.empty_pages);
    println!("  Fetch failures:  {}", stats.fetch_failures);

    for path in &stats.failed_paths {
        println!("    ✗ {}", path);
    }
}

/// Prints the outcome of a product fetch
pub fn print_product_summary(stats: &ProductFetchStats) {
    println!("=== Product Fetch ===");
    println!("  Categories:        {}", stats.categories);
    println!("  Pages fetched:     {}", stats.pages_fetched);
    println!("  Products:          {}", stats.products);
    println!("  Skipped entries:   {}", stats.skipped_entries);
    println!("  Truncated:         {}", stats.truncated_categories);
    println!("  Fetch failures:    {}", stats.fetch_failures);

    for category in &stats.failed_categories {
        println!("    ✗ product group {}", category);
    }
}
