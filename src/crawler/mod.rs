//! Crawler module for category discovery
//!
//! This module contains the category discovery logic, including:
//! - JSON page fetching with failure classification
//! - Decoding and merging of partial category records
//! - Sub-category link extraction
//! - The breadth-first frontier and the crawl loop itself

mod discovery;
mod fetcher;
mod frontier;
mod links;
mod merger;
mod records;

#[cfg(test)]
pub(crate) mod mock;

pub use discovery::{
    CatalogDocument, DiscoveryCrawler, DiscoveryOutcome, DiscoveryPhase, DiscoveryStats,
};
pub use fetcher::{build_http_client, fetch_page, FetchError, HttpFetcher, JsonClient, PageContent};
pub use frontier::Frontier;
pub use links::extract_sub_paths;
pub use merger::{count_category_records, CatalogMerger};
pub use records::{CategoryDescriptor, CategoryRecord, FreshnessTokens};

use crate::config::Config;
use crate::CatalogError;

/// Runs a category discovery against the live site
///
/// This is the entry point for a discovery-only run. It will:
/// 1. Build the HTTP client
/// 2. Fetch the root listing and capture the freshness tokens
/// 3. Crawl every reachable category page
/// 4. Return the merged catalog
///
/// # Arguments
///
/// * `config` - The catalog configuration
///
/// # Returns
///
/// * `Ok(DiscoveryOutcome)` - Crawl finished (possibly with failed pages)
/// * `Err(CatalogError)` - The HTTP client could not be built
pub async fn discover(config: &Config) -> Result<DiscoveryOutcome, CatalogError> {
    let client = HttpFetcher::from_config(&config.http, &config.site)?;
    let mut crawler = DiscoveryCrawler::new(client, &config.site, config.products.page_size);
    Ok(crawler.run().await)
}
