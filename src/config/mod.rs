//! Configuration module for Nemlig-Catalog
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an empty file (or no file at all) describes the
//! stock nemlig.com setup.
//!
//! # Example
//!
//! ```no_run
//! use nemlig_catalog::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("catalog.toml")).unwrap();
//! println!("Crawling from: {}{}", config.site.base_url, config.site.root_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, HttpConfig, OutputConfig, ProductsConfig, SiteConfig};

// Re-export parser functions
pub use parser::{
    compute_config_hash, default_config_hash, hash_content, load_config, load_config_with_hash,
};
pub use validation::validate;
