//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::{CategoryDescriptor, FreshnessTokens};
use crate::products::ProductRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{record_hash, HistoryCounts, MergeCounts, RunRecord, RunStatus, RunTotals};
use crate::CatalogError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, \
     pages_fetched, fetch_failures, categories, products";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// The parent directory of `path` is created if missing.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CatalogError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CatalogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Running),
        totals: RunTotals {
            pages_fetched: row.get::<_, i64>(5)? as u64,
            fetch_failures: row.get::<_, i64>(6)? as u64,
            categories: row.get::<_, i64>(7)? as u64,
            products: row.get::<_, i64>(8)? as u64,
        },
    })
}

impl SqliteStorage {
    fn count(&self, sql: &str) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        self.conn
            .query_row(&sql, params![run_id], run_from_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        Ok(self.conn.query_row(&sql, [], run_from_row).optional()?)
    }

    fn complete_run(&mut self, run_id: i64, totals: &RunTotals) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_fetched = ?3, \
             fetch_failures = ?4, categories = ?5, products = ?6 WHERE id = ?7",
            params![
                RunStatus::Completed.to_db_string(),
                now,
                totals.pages_fetched as i64,
                totals.fetch_failures as i64,
                totals.categories as i64,
                totals.products as i64,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![RunStatus::Failed.to_db_string(), now, run_id],
        )?;
        Ok(())
    }

    // ===== Categories =====

    fn replace_categories(
        &mut self,
        run_id: i64,
        categories: &[CategoryDescriptor],
        tokens: &FreshnessTokens,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM categories", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO categories (product_group_id, total_products, heading, position, run_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for (position, category) in categories.iter().enumerate() {
                insert.execute(params![
                    category.identifier,
                    category.total_count as i64,
                    category.heading,
                    position as i64,
                    run_id
                ])?;
            }
        }
        tx.execute(
            "INSERT OR REPLACE INTO run_settings
             (run_id, magic_stamp, timeslot, magic1, magic2, page_size, sort_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                run_id,
                tokens.magic_stamp,
                tokens.timeslot,
                tokens.magic1,
                tokens.magic2,
                tokens.page_size,
                tokens.order
            ],
        )?;
        tx.commit()?;

        tracing::debug!("Stored {} categories for run {}", categories.len(), run_id);
        Ok(())
    }

    fn load_categories(&self) -> StorageResult<Vec<CategoryDescriptor>> {
        let mut stmt = self.conn.prepare(
            "SELECT product_group_id, total_products, heading FROM categories ORDER BY position",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(CategoryDescriptor {
                identifier: row.get(0)?,
                total_count: row.get::<_, i64>(1)? as u64,
                heading: row.get(2)?,
            })
        })?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    fn load_tokens(&self, run_id: i64) -> StorageResult<Option<FreshnessTokens>> {
        let tokens = self
            .conn
            .query_row(
                "SELECT magic_stamp, timeslot, magic1, magic2, page_size, sort_order
                 FROM run_settings WHERE run_id = ?1",
                params![run_id],
                |row| {
                    Ok(FreshnessTokens {
                        magic_stamp: row.get(0)?,
                        timeslot: row.get(1)?,
                        magic1: row.get(2)?,
                        magic2: row.get(3)?,
                        page_size: row.get(4)?,
                        order: row.get(5)?,
                    })
                },
            )
            .optional()?;
        Ok(tokens)
    }

    // ===== Products =====

    fn merge_products(
        &mut self,
        run_id: i64,
        products: &[ProductRecord],
    ) -> StorageResult<MergeCounts> {
        let now = Utc::now().to_rfc3339();
        let mut counts = MergeCounts::default();

        let tx = self.conn.transaction()?;
        {
            let mut existing_hash =
                tx.prepare("SELECT record_hash FROM products WHERE id = ?1")?;
            let mut upsert = tx.prepare(
                "INSERT INTO products (id, product_group_id, data, record_hash, run_id, loaded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(id) DO UPDATE SET
                    product_group_id = excluded.product_group_id,
                    data = excluded.data,
                    record_hash = excluded.record_hash,
                    run_id = excluded.run_id,
                    loaded_at = excluded.loaded_at",
            )?;

            for product in products {
                let hash = record_hash(&product.data);
                let previous: Option<String> = existing_hash
                    .query_row(params![product.id], |row| row.get(0))
                    .optional()?;

                match previous {
                    Some(ref h) if *h == hash => counts.unchanged += 1,
                    Some(_) => counts.updated += 1,
                    None => counts.inserted += 1,
                }

                upsert.execute(params![
                    product.id,
                    product.product_group_id,
                    product.data.to_string(),
                    hash,
                    run_id,
                    now
                ])?;
            }
        }
        tx.commit()?;

        Ok(counts)
    }

    fn load_products(&self) -> StorageResult<Vec<ProductRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, product_group_id, data FROM products ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut products = Vec::new();
        for row in rows {
            let (id, product_group_id, data) = row?;
            let data = serde_json::from_str(&data).map_err(|e| {
                StorageError::Serialization(format!("product {}: {}", id, e))
            })?;
            products.push(ProductRecord {
                id,
                product_group_id,
                data,
            });
        }
        Ok(products)
    }

    fn record_product_history(
        &mut self,
        products: &[ProductRecord],
    ) -> StorageResult<HistoryCounts> {
        let mut counts = HistoryCounts::default();
        if products.is_empty() {
            return Ok(counts);
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        {
            let mut current = tx.prepare(
                "SELECT row_id, record_hash FROM products_history
                 WHERE id = ?1 AND valid_to IS NULL",
            )?;
            let mut retire =
                tx.prepare("UPDATE products_history SET valid_to = ?1 WHERE row_id = ?2")?;
            let mut insert = tx.prepare(
                "INSERT INTO products_history (id, data, record_hash, valid_from)
                 VALUES (?1, ?2, ?3, ?4)",
            )?;

            let mut loaded: HashSet<&str> = HashSet::new();
            for product in products {
                if !loaded.insert(product.id.as_str()) {
                    continue;
                }

                let hash = record_hash(&product.data);
                let existing: Option<(i64, String)> = current
                    .query_row(params![product.id], |row| Ok((row.get(0)?, row.get(1)?)))
                    .optional()?;

                match existing {
                    Some((_, ref h)) if *h == hash => {
                        counts.unchanged += 1;
                        continue;
                    }
                    Some((row_id, _)) => {
                        retire.execute(params![now, row_id])?;
                        counts.retired += 1;
                    }
                    None => {}
                }

                insert.execute(params![product.id, product.data.to_string(), hash, now])?;
                counts.inserted += 1;
            }

            // Products missing from this load are no longer current
            let mut open_rows =
                tx.prepare("SELECT row_id, id FROM products_history WHERE valid_to IS NULL")?;
            let vanished: Vec<i64> = open_rows
                .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
                .filter_map(|row| match row {
                    Ok((row_id, id)) if !loaded.contains(id.as_str()) => Some(Ok(row_id)),
                    Ok(_) => None,
                    Err(e) => Some(Err(e)),
                })
                .collect::<Result<_, _>>()?;

            for row_id in vanished {
                retire.execute(params![now, row_id])?;
                counts.retired += 1;
            }
        }
        tx.commit()?;

        tracing::debug!(
            "Product history inserted={} retired={} unchanged={}",
            counts.inserted,
            counts.retired,
            counts.unchanged
        );
        Ok(counts)
    }

    // ===== Statistics =====

    fn count_runs(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM runs")
    }

    fn count_categories(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM categories")
    }

    fn count_products(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM products")
    }

    fn count_history_rows(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM products_history")
    }

    fn count_current_history(&self) -> StorageResult<u64> {
        self.count("SELECT COUNT(*) FROM products_history WHERE valid_to IS NULL")
    }
}
