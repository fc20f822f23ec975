//! Storage module for persisting catalog data
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Run tracking with the configuration hash and run totals
//! - The category list and freshness tokens of the latest crawl
//! - Products merged by id, with type-2 history of every change

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::config::hash_content;
use crate::CatalogError;
use serde_json::Value;
use std::path::Path;

/// Opens the catalog database at `path`, creating it and its tables if needed
///
/// Used by full runs and `--stats` alike, so both see the same schema.
pub fn open_storage(path: &Path) -> Result<SqliteStorage, CatalogError> {
    SqliteStorage::new(path)
}

/// Hex SHA-256 of a product's JSON
///
/// Object keys serialize in sorted order, so equal values hash equally.
pub fn record_hash(data: &Value) -> String {
    hash_content(data.to_string().as_bytes())
}

/// Represents a run in the database
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub totals: RunTotals,
}

/// Totals recorded when a run completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunTotals {
    pub pages_fetched: u64,
    pub fetch_failures: u64,
    pub categories: u64,
    pub products: u64,
}

/// Outcome of merging a product load into the products table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeCounts {
    pub inserted: u64,
    pub updated: u64,
    pub unchanged: u64,
}

/// Outcome of applying a product load to the history table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryCounts {
    /// New current versions written
    pub inserted: u64,
    /// Current versions closed
    pub retired: u64,
    /// Products whose current version already matched
    pub unchanged: u64,
}

/// Status of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
