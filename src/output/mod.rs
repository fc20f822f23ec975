//! Output module for run summaries and statistics
//!
//! This module handles:
//! - Console summaries of a discovery crawl and a product fetch
//! - Statistics loaded back from the database

pub mod stats;

pub use stats::{
    load_statistics, print_discovery_summary, print_product_summary, print_statistics,
    CatalogStatistics,
};
