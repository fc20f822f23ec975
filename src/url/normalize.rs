use crate::config::SiteConfig;

/// Query parameter that makes the site answer with JSON instead of HTML
pub const JSON_MARKER: &str = "GetAsJson=1";

/// Converts category paths into absolute URLs that request JSON output
///
/// # Normalization Steps
///
/// 1. Empty input stays empty (callers skip it)
/// 2. Input starting with `http` is taken as absolute; anything else is
///    prefixed with the site origin
/// 3. If the JSON marker is already present the URL is returned as is
/// 4. Otherwise `sortorder=<order>&GetAsJson=1` is appended, joined with `&`
///    when a query string exists and `?` otherwise
///
/// # Examples
///
/// ```
/// use nemlig_catalog::url::UrlNormalizer;
///
/// let normalizer = UrlNormalizer::new("https://www.nemlig.com", "navn");
/// assert_eq!(
///     normalizer.normalize("/dagligvarer/frugt"),
///     "https://www.nemlig.com/dagligvarer/frugt?sortorder=navn&GetAsJson=1"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlNormalizer {
    base_url: String,
    sort_order: String,
}

impl UrlNormalizer {
    /// Creates a normalizer for the given origin and sort order
    pub fn new(base_url: impl Into<String>, sort_order: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            sort_order: sort_order.into(),
        }
    }

    /// Creates a normalizer from the site configuration
    pub fn from_site(site: &SiteConfig) -> Self {
        Self::new(site.base_url.as_str(), site.sort_order.as_str())
    }

    /// The site origin, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The sort order appended to every normalized URL
    pub fn sort_order(&self) -> &str {
        &self.sort_order
    }

    /// Normalizes a path or absolute URL
    pub fn normalize(&self, path: &str) -> String {
        if path.is_empty() {
            return String::new();
        }

        let url = if path.starts_with("http") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        };

        if url.contains(JSON_MARKER) {
            tracing::debug!("Normalized URL path={} -> {}", path, url);
            return url;
        }

        let joiner = if url.contains('?') { '&' } else { '?' };
        let normalized = format!(
            "{}{}sortorder={}&{}",
            url, joiner, self.sort_order, JSON_MARKER
        );
        tracing::debug!("Normalized URL path={} -> {}", path, normalized);
        normalized
    }
}
