//! FIFO frontier of category paths
//!
//! A path enters the queue at most once over a crawl: `enqueue` refuses any
//! path already visited or already waiting. This is what makes the crawl
//! terminate on a cyclic link graph.

use std::collections::{HashSet, VecDeque};

/// Queue of category paths to visit plus the set already visited
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a path unless it was visited or is already queued
    ///
    /// # Returns
    ///
    /// `true` if the path was added
    pub fn enqueue(&mut self, path: &str) -> bool {
        if self.visited.contains(path) || self.queued.contains(path) {
            return false;
        }
        self.queued.insert(path.to_string());
        self.queue.push_back(path.to_string());
        true
    }

    /// Pops the oldest unvisited path and marks it visited
    ///
    /// Paths that were visited since they were queued are discarded.
    pub fn next_path(&mut self) -> Option<String> {
        while let Some(path) = self.queue.pop_front() {
            self.queued.remove(&path);
            if self.visited.contains(&path) {
                tracing::trace!("Discarding already visited path={}", path);
                continue;
            }
            self.visited.insert(path.clone());
            return Some(path);
        }
        None
    }

    /// Whether a path has been handed out by `next_path`
    pub fn is_visited(&self, path: &str) -> bool {
        self.visited.contains(path)
    }

    /// Returns the number of paths waiting
    pub fn queued_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns the number of distinct paths visited
    pub fn visited_len(&self) -> usize {
        self.visited.len()
    }

    /// Returns whether no path is waiting
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
