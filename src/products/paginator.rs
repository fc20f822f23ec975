//! Page-number pagination over the product endpoint

use crate::crawler::{CategoryDescriptor, FetchError, FreshnessTokens, JsonClient};
use crate::products::extract::{extract_product_list, product_id};
use crate::products::ProductRecord;
use crate::url::product_page_url;
use serde::Serialize;
use std::collections::HashMap;

/// Counters describing one product fetch stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductFetchStats {
    /// Categories paginated
    pub categories: u64,

    /// Page requests issued
    pub pages_fetched: u64,

    /// Page requests that failed
    pub fetch_failures: u64,

    /// Categories whose pagination ended on a failure
    pub failed_categories: Vec<String>,

    /// Categories cut off by the page cap
    pub truncated_categories: u64,

    /// Entries dropped for lacking an identifier
    pub skipped_entries: u64,

    /// Distinct products collected
    pub products: u64,
}

/// Products collected for a catalog, unique by id
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    /// Products in first-seen order; a later sighting replaces the data
    pub products: Vec<ProductRecord>,

    pub stats: ProductFetchStats,
}

/// Pages through the product endpoint for each category
pub struct ProductPaginator<C> {
    client: C,
    base_url: String,
    max_pages: u32,
}

impl<C: JsonClient> ProductPaginator<C> {
    /// Creates a paginator
    ///
    /// # Arguments
    ///
    /// * `client` - The JSON client pages are fetched with
    /// * `base_url` - Site origin the endpoint lives under
    /// * `max_pages` - Upper bound on pages requested per category
    pub fn new(client: C, base_url: impl Into<String>, max_pages: u32) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            max_pages,
        }
    }

    async fn fetch_product_page(
        &self,
        tokens: &FreshnessTokens,
        product_group_id: &str,
        page_index: u32,
    ) -> Result<Vec<serde_json::Value>, FetchError> {
        let url = product_page_url(&self.base_url, tokens, product_group_id, page_index)
            .map_err(|e| FetchError::Decode {
                url: self.base_url.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!("Fetching products url={}", url);
        let body = self.client.get_json(url.as_str()).await?;
        Ok(extract_product_list(&body))
    }

    /// Fetches every page of one category
    ///
    /// Pagination starts at page 0 and stops at the first empty page, the
    /// first failed page, or the page cap.
    pub async fn fetch_category(
        &self,
        tokens: &FreshnessTokens,
        product_group_id: &str,
        stats: &mut ProductFetchStats,
    ) -> Vec<ProductRecord> {
        let mut products = Vec::new();
        stats.categories += 1;

        for page_index in 0..self.max_pages {
            stats.pages_fetched += 1;

            let entries = match self
                .fetch_product_page(tokens, product_group_id, page_index)
                .await
            {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(
                        "Failed to fetch products product_group_id={} page={} error={}",
                        product_group_id,
                        page_index,
                        e
                    );
                    stats.fetch_failures += 1;
                    stats.failed_categories.push(product_group_id.to_string());
                    return products;
                }
            };

            if entries.is_empty() {
                return products;
            }

            for entry in entries {
                match product_id(&entry) {
                    Some(id) => products.push(ProductRecord {
                        id,
                        product_group_id: product_group_id.to_string(),
                        data: entry,
                    }),
                    None => stats.skipped_entries += 1,
                }
            }
        }

        tracing::warn!(
            "Stopped paginating product_group_id={} after {} pages",
            product_group_id,
            self.max_pages
        );
        stats.truncated_categories += 1;
        products
    }

    /// Fetches the products of every category
    ///
    /// A product listed under several categories is kept once, with the
    /// data of its last sighting.
    #[tracing::instrument(name = "products", skip_all)]
    pub async fn fetch_all(
        &self,
        categories: &[CategoryDescriptor],
        tokens: &FreshnessTokens,
    ) -> ProductCatalog {
        let mut stats = ProductFetchStats::default();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut products: Vec<ProductRecord> = Vec::new();

        tracing::info!("Fetching products for {} categories", categories.len());

        for category in categories {
            let fetched = self
                .fetch_category(tokens, &category.identifier, &mut stats)
                .await;

            tracing::info!(
                "Fetched products product_group_id={} heading={} products={} expected={}",
                category.identifier,
                category.heading,
                fetched.len(),
                category.total_count
            );

            for product in fetched {
                match index.get(&product.id) {
                    Some(&position) => products[position] = product,
                    None => {
                        index.insert(product.id.clone(), products.len());
                        products.push(product);
                    }
                }
            }
        }

        stats.products = products.len() as u64;
        tracing::info!(
            "Product fetch complete categories={} pages={} products={} failures={}",
            stats.categories,
            stats.pages_fetched,
            stats.products,
            stats.fetch_failures
        );

        ProductCatalog { products, stats }
    }
}
