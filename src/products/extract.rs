use serde_json::Value;

/// Key the product endpoint nests its list under
const PRODUCTS_KEY: &str = "Products";

/// Locates the list of product entries in a response body
///
/// A top-level array is the list itself. An object is searched under its
/// `Products` key first (descending through nested `Products` objects),
/// then for its first array-valued field in key order. Anything else holds
/// no products.
pub fn extract_product_list(body: &Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items.clone(),
        Value::Object(map) => match map.get(PRODUCTS_KEY) {
            Some(nested @ (Value::Array(_) | Value::Object(_))) => extract_product_list(nested),
            _ => map
                .values()
                .find_map(|v| v.as_array())
                .cloned()
                .unwrap_or_default(),
        },
        _ => Vec::new(),
    }
}

/// Reads a product's identifier from its `Id` (or `id`) field
///
/// Strings are taken as is and numbers are rendered; anything else, or an
/// empty string, means the entry has no usable identifier.
pub fn product_id(entry: &Value) -> Option<String> {
    let raw = entry.get("Id").or_else(|| entry.get("id"))?;
    match raw {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
