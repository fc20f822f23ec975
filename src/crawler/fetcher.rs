//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests against the catalog, including:
//! - Building the HTTP client with timeout, user agent and referer
//! - GET requests returning decoded JSON
//! - Splitting a catalog page into its records and settings
//! - Error classification (transport, status, decode)

use crate::config::{HttpConfig, SiteConfig};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, REFERER};
use reqwest::Client;
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors produced while fetching one URL
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid JSON from {url}: {message}")]
    Decode { url: String, message: String },
}

impl FetchError {
    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Transport { url, .. } | Self::Status { url, .. } | Self::Decode { url, .. } => {
                url
            }
        }
    }
}

/// Records and settings of one catalog page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    /// Entries of the page's `content` array
    pub records: Vec<Value>,

    /// The page's `Settings` object
    pub settings: Map<String, Value>,
}

impl PageContent {
    /// A page with no records and no settings
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the page has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Splits a decoded page body into records and settings
    ///
    /// The body must be a JSON object. A missing or mistyped `content`
    /// yields no records and a missing or mistyped `Settings` yields no
    /// settings.
    pub fn from_json(url: &str, body: Value) -> Result<Self, FetchError> {
        let Value::Object(mut body) = body else {
            return Err(FetchError::Decode {
                url: url.to_string(),
                message: "expected a JSON object at the top level".to_string(),
            });
        };

        let records = match body.remove("content") {
            Some(Value::Array(records)) => records,
            _ => Vec::new(),
        };

        let settings = match body.remove("Settings") {
            Some(Value::Object(settings)) => settings,
            _ => Map::new(),
        };

        Ok(Self { records, settings })
    }
}

/// Something that can GET a URL and decode the body as JSON
#[async_trait]
pub trait JsonClient: Send + Sync {
    /// Fetches `url` and decodes the response body
    async fn get_json(&self, url: &str) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: JsonClient + ?Sized> JsonClient for &T {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        (**self).get_json(url).await
    }
}

/// Fetches one catalog page
///
/// # Arguments
///
/// * `client` - The JSON client to use
/// * `url` - Absolute, normalized page URL
///
/// # Returns
///
/// * `Ok(PageContent)` - The page's records and settings
/// * `Err(FetchError)` - Transport, status or decode failure
pub async fn fetch_page<C: JsonClient + ?Sized>(
    client: &C,
    url: &str,
) -> Result<PageContent, FetchError> {
    tracing::info!("Fetching content url={}", url);
    let body = client.get_json(url).await?;
    let content = PageContent::from_json(url, body)?;
    tracing::debug!(
        "Fetched page url={} records={} settings={}",
        url,
        content.records.len(),
        content.settings.len()
    );
    Ok(content)
}

/// Builds an HTTP client with proper configuration
///
/// Every request carries the configured user agent and a `Referer` pointing
/// at the root listing, which the product endpoint expects.
///
/// # Arguments
///
/// * `http` - Timeout and user agent settings
/// * `site` - Site settings used for the referer
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(http: &HttpConfig, site: &SiteConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    let referer = format!(
        "{}{}?sortorder={}",
        site.base_url, site.root_path, site.sort_order
    );
    match HeaderValue::from_str(&referer) {
        Ok(value) => {
            headers.insert(REFERER, value);
        }
        Err(e) => tracing::warn!("Skipping invalid referer header {}: {}", referer, e),
    }

    Client::builder()
        .user_agent(http.user_agent.clone())
        .timeout(Duration::from_secs(http.timeout_secs))
        .connect_timeout(Duration::from_secs(http.timeout_secs.min(10)))
        .default_headers(headers)
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed JSON client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an existing client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from configuration
    pub fn from_config(http: &HttpConfig, site: &SiteConfig) -> Result<Self, reqwest::Error> {
        build_http_client(http, site).map(Self::new)
    }
}

#[async_trait]
impl JsonClient for HttpFetcher {
    async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_decode() {
                FetchError::Decode {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            } else {
                FetchError::Transport {
                    url: url.to_string(),
                    source: e,
                }
            }
        })
    }
}
