//! Merging of partial category records into canonical descriptors

use crate::crawler::records::{CategoryDescriptor, CategoryRecord};
use serde_json::Value;
use std::collections::HashMap;

/// Accumulates category descriptors across pages
///
/// Descriptors keep first-seen order. For an identifier seen more than
/// once the count is the maximum observed and the heading is the first
/// non-empty one.
#[derive(Debug, Default)]
pub struct CatalogMerger {
    index: HashMap<String, usize>,
    descriptors: Vec<CategoryDescriptor>,
}

impl CatalogMerger {
    /// Creates an empty merger
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one decoded record in; returns true if its identifier is new
    pub fn merge_record(&mut self, record: CategoryRecord) -> bool {
        match self.index.get(&record.identifier) {
            Some(&position) => {
                let existing = &mut self.descriptors[position];
                if record.total_count > existing.total_count {
                    existing.total_count = record.total_count;
                }
                if existing.heading.is_empty() && !record.heading.is_empty() {
                    existing.heading = record.heading;
                }
                false
            }
            None => {
                self.index
                    .insert(record.identifier.clone(), self.descriptors.len());
                self.descriptors.push(record.into());
                true
            }
        }
    }

    /// Folds a page's raw entries in
    ///
    /// Entries without a string `ProductGroupId` are skipped.
    ///
    /// # Returns
    ///
    /// The number of identifiers seen for the first time
    pub fn merge_page(&mut self, records: &[Value]) -> usize {
        let mut new_count = 0;
        for raw in records {
            match CategoryRecord::from_value(raw) {
                Some(record) => {
                    if self.merge_record(record) {
                        new_count += 1;
                    }
                }
                None => tracing::trace!("Skipping entry without product group id"),
            }
        }
        new_count
    }

    /// Number of distinct identifiers merged so far
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Looks up a descriptor by identifier
    pub fn get(&self, identifier: &str) -> Option<&CategoryDescriptor> {
        self.index
            .get(identifier)
            .map(|&position| &self.descriptors[position])
    }

    /// Finalizes the merge
    pub fn into_descriptors(self) -> Vec<CategoryDescriptor> {
        self.descriptors
    }
}

/// Counts the entries of a page that carry a usable identifier
pub fn count_category_records(records: &[Value]) -> usize {
    records
        .iter()
        .filter(|raw| CategoryRecord::from_value(raw).is_some())
        .count()
}
