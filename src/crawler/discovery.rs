//! Category discovery - breadth-first crawl of the category tree
//!
//! This module contains the crawl loop that finds every category page
//! reachable from the root listing:
//! - Fetching the root page and capturing its freshness tokens
//! - Draining the frontier one path at a time
//! - Merging every page's records into canonical descriptors
//! - Following sub-category links that were never seen before

use crate::config::SiteConfig;
use crate::crawler::fetcher::{fetch_page, JsonClient, PageContent};
use crate::crawler::frontier::Frontier;
use crate::crawler::links::extract_sub_paths;
use crate::crawler::merger::{count_category_records, CatalogMerger};
use crate::crawler::records::{CategoryDescriptor, FreshnessTokens};
use crate::url::UrlNormalizer;
use serde::Serialize;
use std::fmt;

/// Phases of a discovery crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryPhase {
    /// Nothing fetched yet
    Start,
    /// Root page merged, tokens captured, initial links queued
    RootFetched,
    /// Frontier being drained
    Draining,
    /// Frontier empty, result available
    Done,
}

impl fmt::Display for DiscoveryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::RootFetched => "root-fetched",
            Self::Draining => "draining",
            Self::Done => "done",
        };
        write!(f, "{}", s)
    }
}

/// Counters describing one discovery crawl
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryStats {
    /// Fetch attempts, the root included
    pub pages_fetched: u64,

    /// Fetch attempts that failed and were treated as empty
    pub fetch_failures: u64,

    /// Paths whose fetch failed, in crawl order
    pub failed_paths: Vec<String>,

    /// Pages that loaded but carried no records
    pub empty_pages: u64,

    /// Distinct category paths visited, the root excluded
    pub distinct_paths: u64,

    /// Distinct category identifiers discovered
    pub categories: u64,
}

/// Result of a discovery crawl
#[derive(Debug, Clone)]
pub struct DiscoveryOutcome {
    /// Descriptors in first-seen order
    pub categories: Vec<CategoryDescriptor>,

    /// Tokens captured from the root page
    pub tokens: FreshnessTokens,

    pub stats: DiscoveryStats,
}

impl DiscoveryOutcome {
    /// Serializable view handed to downstream consumers
    pub fn document(&self) -> CatalogDocument<'_> {
        CatalogDocument {
            product_group_ids: &self.categories,
            tokens: &self.tokens,
        }
    }
}

/// The crawler output contract: descriptors plus the settings bag
#[derive(Debug, Serialize)]
pub struct CatalogDocument<'a> {
    #[serde(rename = "productGroupIDs")]
    pub product_group_ids: &'a [CategoryDescriptor],

    #[serde(flatten)]
    pub tokens: &'a FreshnessTokens,
}

/// Breadth-first crawler over the category tree
///
/// The crawl is sequential: one request is outstanding at a time. A failed
/// page counts as a page with no records and no links; the crawl carries
/// on without it.
pub struct DiscoveryCrawler<C> {
    client: C,
    normalizer: UrlNormalizer,
    root_path: String,
    category_prefix: String,
    page_size: u32,
    phase: DiscoveryPhase,
}

impl<C: JsonClient> DiscoveryCrawler<C> {
    /// Creates a crawler for the configured site
    ///
    /// # Arguments
    ///
    /// * `client` - The JSON client pages are fetched with
    /// * `site` - Site origin, root path, link prefix and sort order
    /// * `page_size` - Page size recorded in the freshness tokens
    pub fn new(client: C, site: &SiteConfig, page_size: u32) -> Self {
        Self {
            client,
            normalizer: UrlNormalizer::from_site(site),
            root_path: site.root_path.clone(),
            category_prefix: site.category_prefix.clone(),
            page_size,
            phase: DiscoveryPhase::Start,
        }
    }

    /// Current phase
    pub fn phase(&self) -> DiscoveryPhase {
        self.phase
    }

    fn transition(&mut self, next: DiscoveryPhase) {
        tracing::debug!("Discovery phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Fetches one page, recording failures in the stats
    ///
    /// Returns `None` when the fetch failed.
    async fn fetch(&self, path: &str, stats: &mut DiscoveryStats) -> Option<PageContent> {
        let url = self.normalizer.normalize(path);
        stats.pages_fetched += 1;

        match fetch_page(&self.client, &url).await {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::warn!("Failed to fetch url={} error={}", url, e);
                stats.fetch_failures += 1;
                stats.failed_paths.push(path.to_string());
                None
            }
        }
    }

    /// Runs the crawl to completion
    ///
    /// Every call starts from scratch: a fresh frontier and an empty merge.
    #[tracing::instrument(name = "discovery", skip_all)]
    pub async fn run(&mut self) -> DiscoveryOutcome {
        self.phase = DiscoveryPhase::Start;
        tracing::info!("Collecting product group IDs (iterative traversal)");

        let mut stats = DiscoveryStats::default();
        let mut merger = CatalogMerger::new();
        let mut frontier = Frontier::new();

        // Root page
        let root_path = self.root_path.clone();
        let root = self
            .fetch(&root_path, &mut stats)
            .await
            .unwrap_or_else(PageContent::empty);
        tracing::info!(
            "Root page fetched product_groups={} has_settings={}",
            count_category_records(&root.records),
            !root.settings.is_empty()
        );

        let new_count = merger.merge_page(&root.records);
        tracing::info!(
            "Merged initial product groups new={} total={}",
            new_count,
            merger.len()
        );

        let tokens = FreshnessTokens::from_settings(
            &root.settings,
            self.page_size,
            self.normalizer.sort_order(),
        );

        let discovered = extract_sub_paths(&root.records, &self.category_prefix);
        for path in &discovered {
            frontier.enqueue(path);
        }
        tracing::info!("Initial discovered category paths={}", discovered.len());
        self.transition(DiscoveryPhase::RootFetched);

        if !frontier.is_empty() {
            self.transition(DiscoveryPhase::Draining);
        }

        while let Some(path) = frontier.next_path() {
            tracing::info!(
                "Fetching category path={} (visited={} queue={})",
                path,
                frontier.visited_len(),
                frontier.queued_len()
            );

            let Some(content) = self.fetch(&path, &mut stats).await else {
                continue;
            };

            if content.is_empty() {
                tracing::debug!("No content returned path={}", path);
                stats.empty_pages += 1;
                continue;
            }

            let new_count = merger.merge_page(&content.records);

            let mut enqueued = 0;
            for sub_path in extract_sub_paths(&content.records, &self.category_prefix) {
                if frontier.enqueue(&sub_path) {
                    enqueued += 1;
                }
            }

            tracing::debug!(
                "Processed path={} records={} new_product_groups={} total_product_groups={} new_paths={}",
                path,
                content.records.len(),
                new_count,
                merger.len(),
                enqueued
            );
        }

        self.transition(DiscoveryPhase::Done);

        stats.distinct_paths = frontier.visited_len() as u64;
        stats.categories = merger.len() as u64;

        tracing::info!(
            "Traversal complete pages_fetched={} distinct_paths={} product_groups={} failures={}",
            stats.pages_fetched,
            stats.distinct_paths,
            stats.categories,
            stats.fetch_failures
        );

        DiscoveryOutcome {
            categories: merger.into_descriptors(),
            tokens,
            stats,
        }
    }
}
