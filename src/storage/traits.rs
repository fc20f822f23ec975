//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::{CategoryDescriptor, FreshnessTokens};
use crate::products::ProductRecord;
use crate::storage::{HistoryCounts, MergeCounts, RunRecord, RunTotals};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait is the sink for everything a run produces: the category list
/// with its freshness tokens, and the products fetched with them.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run, if any
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Marks a run completed and records its totals
    fn complete_run(&mut self, run_id: i64, totals: &RunTotals) -> StorageResult<()>;

    /// Marks a run failed
    fn fail_run(&mut self, run_id: i64) -> StorageResult<()>;

    // ===== Categories =====

    /// Replaces the stored category list and records the run's tokens
    ///
    /// Categories keep the order they are given in.
    fn replace_categories(
        &mut self,
        run_id: i64,
        categories: &[CategoryDescriptor],
        tokens: &FreshnessTokens,
    ) -> StorageResult<()>;

    /// Loads the stored category list in crawl order
    fn load_categories(&self) -> StorageResult<Vec<CategoryDescriptor>>;

    /// Loads the tokens a run captured
    fn load_tokens(&self, run_id: i64) -> StorageResult<Option<FreshnessTokens>>;

    // ===== Products =====

    /// Upserts products by id
    fn merge_products(
        &mut self,
        run_id: i64,
        products: &[ProductRecord],
    ) -> StorageResult<MergeCounts>;

    /// Loads every merged product, ordered by id
    fn load_products(&self) -> StorageResult<Vec<ProductRecord>>;

    /// Applies a full product snapshot to the history table
    ///
    /// Changed products get a new current version, products absent from the
    /// snapshot have their current version closed. An empty snapshot changes
    /// nothing. Callers pass the merged products table, so a product missed
    /// by one run's fetch keeps its current version.
    fn record_product_history(&mut self, products: &[ProductRecord])
        -> StorageResult<HistoryCounts>;

    // ===== Statistics =====

    /// Returns the number of runs
    fn count_runs(&self) -> StorageResult<u64>;

    /// Returns the number of stored categories
    fn count_categories(&self) -> StorageResult<u64>;

    /// Returns the number of stored products
    fn count_products(&self) -> StorageResult<u64>;

    /// Returns the number of history rows, current and closed
    fn count_history_rows(&self) -> StorageResult<u64>;

    /// Returns the number of current history rows
    fn count_current_history(&self) -> StorageResult<u64>;
}
