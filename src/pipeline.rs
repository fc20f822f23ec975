//! Full extraction run
//!
//! Discovers the category tree, stores the categories with their freshness
//! tokens, pages through every category's products, and records the product
//! load in the products and history tables.

use crate::config::Config;
use crate::crawler::{DiscoveryCrawler, DiscoveryStats, HttpFetcher, JsonClient};
use crate::products::{ProductFetchStats, ProductPaginator};
use crate::storage::{open_storage, HistoryCounts, MergeCounts, RunTotals, Storage};
use crate::CatalogError;
use std::path::Path;

/// What a full run did
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub run_id: i64,
    pub discovery: DiscoveryStats,
    /// `None` when the product stage was skipped
    pub products: Option<ProductFetchStats>,
    pub merge: MergeCounts,
    pub history: HistoryCounts,
}

/// Runs discovery, product fetch and persistence against the given sink
///
/// The run is recorded in `storage` and marked failed if persisting fails.
/// Fetch failures never fail the run; they are counted in the report.
///
/// # Arguments
///
/// * `client` - The JSON client every request goes through
/// * `config` - The catalog configuration
/// * `storage` - Where categories and products are written
/// * `config_hash` - Hash recorded with the run
pub async fn run_pipeline<C: JsonClient>(
    client: C,
    config: &Config,
    storage: &mut dyn Storage,
    config_hash: &str,
) -> Result<PipelineReport, CatalogError> {
    let run_id = storage.create_run(config_hash)?;
    tracing::info!("Starting run {}", run_id);

    match execute(client, config, storage, run_id).await {
        Ok(report) => Ok(report),
        Err(e) => {
            tracing::error!("Run {} failed: {}", run_id, e);
            if let Err(mark_err) = storage.fail_run(run_id) {
                tracing::error!("Could not mark run {} failed: {}", run_id, mark_err);
            }
            Err(e)
        }
    }
}

async fn execute<C: JsonClient>(
    client: C,
    config: &Config,
    storage: &mut dyn Storage,
    run_id: i64,
) -> Result<PipelineReport, CatalogError> {
    let mut crawler = DiscoveryCrawler::new(&client, &config.site, config.products.page_size);
    let outcome = crawler.run().await;

    storage.replace_categories(run_id, &outcome.categories, &outcome.tokens)?;

    let mut totals = RunTotals {
        pages_fetched: outcome.stats.pages_fetched,
        fetch_failures: outcome.stats.fetch_failures,
        categories: outcome.stats.categories,
        products: 0,
    };
    let mut merge = MergeCounts::default();
    let mut history = HistoryCounts::default();
    let mut product_stats = None;

    if !config.products.enabled {
        tracing::info!("Product fetch disabled, storing categories only");
    } else if !outcome.tokens.is_complete() {
        tracing::warn!(
            "Skipping product fetch: root page gave no freshness tokens (magicStamp={:?} timeslot={:?})",
            outcome.tokens.magic_stamp,
            outcome.tokens.timeslot
        );
    } else {
        let paginator = ProductPaginator::new(
            &client,
            config.site.base_url.as_str(),
            config.products.max_pages_per_category,
        );
        let catalog = paginator
            .fetch_all(&outcome.categories, &outcome.tokens)
            .await;

        merge = storage.merge_products(run_id, &catalog.products)?;
        // History follows the merged table, not this run's possibly partial fetch
        let merged = storage.load_products()?;
        history = storage.record_product_history(&merged)?;
        tracing::info!(
            "Stored products inserted={} updated={} unchanged={} history_versions={} retired={}",
            merge.inserted,
            merge.updated,
            merge.unchanged,
            history.inserted,
            history.retired
        );

        totals.pages_fetched += catalog.stats.pages_fetched;
        totals.fetch_failures += catalog.stats.fetch_failures;
        totals.products = catalog.stats.products;
        product_stats = Some(catalog.stats);
    }

    storage.complete_run(run_id, &totals)?;
    tracing::info!("Run {} completed", run_id);

    Ok(PipelineReport {
        run_id,
        discovery: outcome.stats,
        products: product_stats,
        merge,
        history,
    })
}

/// Runs the full extraction against the live site
///
/// This is the main entry point for a full run. It will:
/// 1. Build the HTTP client
/// 2. Open (or create) the database
/// 3. Discover the category tree
/// 4. Fetch and store every category's products
///
/// # Arguments
///
/// * `config` - The catalog configuration
/// * `config_hash` - Hash recorded with the run
///
/// # Example
///
/// ```no_run
/// use nemlig_catalog::config::load_config_with_hash;
/// use nemlig_catalog::pipeline::run;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("catalog.toml"))?;
/// let report = run(&config, &hash).await?;
/// println!("Run {} stored {} categories", report.run_id, report.discovery.categories);
/// # Ok(())
/// # }
/// ```
pub async fn run(config: &Config, config_hash: &str) -> Result<PipelineReport, CatalogError> {
    let client = HttpFetcher::from_config(&config.http, &config.site)?;
    let mut storage = open_storage(Path::new(&config.output.database_path))?;
    run_pipeline(client, config, &mut storage, config_hash).await
}
