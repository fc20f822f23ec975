use serde::{Deserialize, Serialize};

/// Main configuration structure for Nemlig-Catalog
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub products: ProductsConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Where the category tree lives and how its pages are requested
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Site origin without a trailing slash
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the root category listing
    #[serde(rename = "root-path")]
    pub root_path: String,

    /// Only links below this prefix are followed
    #[serde(rename = "category-prefix")]
    pub category_prefix: String,

    /// Value of the `sortorder` query parameter
    #[serde(rename = "sort-order")]
    pub sort_order: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.nemlig.com".to_string(),
            root_path: "/dagligvarer".to_string(),
            category_prefix: "/dagligvarer/".to_string(),
            sort_order: "navn".to_string(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("nemlig-catalog/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Product fetch stage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProductsConfig {
    /// Whether products are fetched after discovery
    pub enabled: bool,

    /// Products requested per page
    #[serde(rename = "page-size")]
    pub page_size: u32,

    /// Upper bound on pages requested for a single category
    #[serde(rename = "max-pages-per-category")]
    pub max_pages_per_category: u32,
}

impl Default for ProductsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            page_size: 100,
            max_pages_per_category: 500,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./data/nemlig.db".to_string(),
        }
    }
}
