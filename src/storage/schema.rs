//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Nemlig-Catalog database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_fetched INTEGER NOT NULL DEFAULT 0,
    fetch_failures INTEGER NOT NULL DEFAULT 0,
    categories INTEGER NOT NULL DEFAULT 0,
    products INTEGER NOT NULL DEFAULT 0
);

-- Categories of the latest crawl, replaced wholesale each run
CREATE TABLE IF NOT EXISTS categories (
    product_group_id TEXT PRIMARY KEY,
    total_products INTEGER NOT NULL,
    heading TEXT NOT NULL,
    position INTEGER NOT NULL,
    run_id INTEGER NOT NULL REFERENCES runs(id)
);

CREATE INDEX IF NOT EXISTS idx_categories_position ON categories(position);

-- Freshness tokens captured by each run
CREATE TABLE IF NOT EXISTS run_settings (
    run_id INTEGER PRIMARY KEY REFERENCES runs(id),
    magic_stamp TEXT NOT NULL,
    timeslot TEXT NOT NULL,
    magic1 TEXT NOT NULL,
    magic2 TEXT NOT NULL,
    page_size INTEGER NOT NULL,
    sort_order TEXT NOT NULL
);

-- Latest version of every product, merged by id
CREATE TABLE IF NOT EXISTS products (
    id TEXT PRIMARY KEY,
    product_group_id TEXT NOT NULL,
    data TEXT NOT NULL,
    record_hash TEXT NOT NULL,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    loaded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_group ON products(product_group_id);

-- Every version of every product; valid_to IS NULL marks the current one
CREATE TABLE IF NOT EXISTS products_history (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL,
    data TEXT NOT NULL,
    record_hash TEXT NOT NULL,
    valid_from TEXT NOT NULL,
    valid_to TEXT
);

CREATE INDEX IF NOT EXISTS idx_products_history_id ON products_history(id);
CREATE INDEX IF NOT EXISTS idx_products_history_current ON products_history(valid_to);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
