//! Category records as read from catalog pages, and their merged form
//!
//! Catalog pages are decoded loosely: every field except the identifier is
//! optional and falls back to a documented default at this boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON field holding a category identifier
pub const FIELD_PRODUCT_GROUP_ID: &str = "ProductGroupId";
/// JSON field holding a category's product count
pub const FIELD_TOTAL_PRODUCTS: &str = "TotalProducts";
/// JSON field holding a category's display heading
pub const FIELD_HEADING: &str = "Heading";

/// Root settings field carrying the combined timestamp token
pub const SETTING_MAGIC_STAMP: &str = "CombinedProductsAndSitecoreTimestamp";
/// Root settings field carrying the delivery timeslot token
pub const SETTING_TIMESLOT: &str = "TimeslotUtc";

/// One possibly partial description of a category, as found on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRecord {
    pub identifier: String,
    pub total_count: u64,
    pub heading: String,
}

impl CategoryRecord {
    /// Decodes a raw page entry
    ///
    /// Returns `None` when the identifier is missing or not a string.
    /// `TotalProducts` defaults to 0 when absent, null, negative or not a
    /// number; fractional counts are truncated. `Heading` defaults to "".
    pub fn from_value(value: &Value) -> Option<Self> {
        let identifier = value.get(FIELD_PRODUCT_GROUP_ID)?.as_str()?.to_string();

        let total_count = value
            .get(FIELD_TOTAL_PRODUCTS)
            .map(count_from_value)
            .unwrap_or(0);

        let heading = value
            .get(FIELD_HEADING)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        Some(Self {
            identifier,
            total_count,
            heading,
        })
    }
}

fn count_from_value(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f.trunc() as u64))
            .unwrap_or(0),
        _ => 0,
    }
}

/// The canonical, merged view of one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    #[serde(rename = "ProductGroupId")]
    pub identifier: String,

    #[serde(rename = "TotalProducts")]
    pub total_count: u64,

    #[serde(rename = "Heading")]
    pub heading: String,
}

impl From<CategoryRecord> for CategoryDescriptor {
    fn from(record: CategoryRecord) -> Self {
        Self {
            identifier: record.identifier,
            total_count: record.total_count,
            heading: record.heading,
        }
    }
}

/// Tokens the product endpoint needs in its URL path
///
/// `magic_stamp` and `timeslot` come from the root page's settings object;
/// the remaining fields are constants of the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreshnessTokens {
    #[serde(rename = "magicStamp")]
    pub magic_stamp: String,

    pub timeslot: String,

    pub magic1: String,

    pub magic2: String,

    #[serde(rename = "pageSize")]
    pub page_size: u32,

    pub order: String,
}

impl FreshnessTokens {
    pub const MAGIC1: &'static str = "1";
    pub const MAGIC2: &'static str = "0";

    /// Tokens with no timestamp or timeslot
    pub fn empty(page_size: u32, order: &str) -> Self {
        Self {
            magic_stamp: String::new(),
            timeslot: String::new(),
            magic1: Self::MAGIC1.to_string(),
            magic2: Self::MAGIC2.to_string(),
            page_size,
            order: order.to_string(),
        }
    }

    /// Captures the tokens from a root page's settings object
    pub fn from_settings(settings: &Map<String, Value>, page_size: u32, order: &str) -> Self {
        Self {
            magic_stamp: setting_text(settings, SETTING_MAGIC_STAMP),
            timeslot: setting_text(settings, SETTING_TIMESLOT),
            ..Self::empty(page_size, order)
        }
    }

    /// Whether both site-provided tokens are present
    pub fn is_complete(&self) -> bool {
        !self.magic_stamp.is_empty() && !self.timeslot.is_empty()
    }
}

fn setting_text(settings: &Map<String, Value>, key: &str) -> String {
    match settings.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
