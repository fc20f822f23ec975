//! Sub-category link extraction

use serde_json::Value;
use std::collections::HashSet;

/// Collects the category paths a page links to
///
/// Each entry may carry a link in `Url` and another in `SeeMoreLink.Url`.
/// Only string candidates starting with `prefix` are kept. The result keeps
/// first-occurrence order (entries in page order, `Url` before
/// `SeeMoreLink.Url`) with duplicates removed, so the crawl order is stable
/// for a given set of pages.
pub fn extract_sub_paths(records: &[Value], prefix: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut paths = Vec::new();

    for record in records {
        let direct = record.get("Url").and_then(Value::as_str);
        let see_more = record
            .get("SeeMoreLink")
            .and_then(|link| link.get("Url"))
            .and_then(Value::as_str);

        for candidate in [direct, see_more].into_iter().flatten() {
            if candidate.starts_with(prefix) && seen.insert(candidate) {
                paths.push(candidate.to_string());
            }
        }
    }

    paths
}
