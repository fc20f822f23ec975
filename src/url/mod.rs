//! URL handling module for Nemlig-Catalog
//!
//! This module turns the site-relative category paths found in catalog pages
//! into absolute JSON URLs, and builds the product endpoint URLs that the
//! product stage paginates through.

mod normalize;
mod product;

// Re-export main functions
pub use normalize::{UrlNormalizer, JSON_MARKER};
pub use product::product_page_url;
