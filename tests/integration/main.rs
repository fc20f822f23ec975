//! Integration tests against a mock nemlig.com server

mod crawl_tests;
mod pipeline_tests;

use nemlig_catalog::config::Config;

/// Builds a configuration pointing at the mock server
pub fn create_test_config(base_url: &str, db_path: &str) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.http.timeout_secs = 5;
    config.http.user_agent = "TestBot/1.0".to_string();
    config.products.page_size = 2;
    config.products.max_pages_per_category = 10;
    config.output.database_path = db_path.to_string();
    config
}
