//! Product fetch stage
//!
//! Consumes the discovery output: for every category it pages through the
//! product endpoint until a page comes back empty. This module handles:
//! - Building paged product URLs from the freshness tokens
//! - Locating the product list inside a response body
//! - De-duplicating products seen under several categories

mod extract;
mod paginator;

pub use extract::{extract_product_list, product_id};
pub use paginator::{ProductCatalog, ProductFetchStats, ProductPaginator};

use serde_json::Value;

/// One product as returned by the product endpoint
#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    /// Product identifier, rendered as a string
    pub id: String,

    /// Category the product was fetched under
    pub product_group_id: String,

    /// The raw product entry
    pub data: Value,
}
