// src/crawl/visited.rs
// =============================================================================
// Per-crawl deduplication of discovered URLs.
//
// Several fetch tasks of the same crawl scan pages at the same time, so
// "have we seen this URL?" and "remember it" must happen as one step.
// A Mutex around the HashSet gives us that: HashSet::insert already answers
// whether the value was new.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of normalized absolute URLs seen during one site crawl
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `url` and returns true the first time it is seen,
    /// false on every later call
    pub fn mark_if_new(&self, url: &str) -> bool {
        // A panicking holder cannot leave the set half-updated, so a
        // poisoned lock is still safe to use
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        seen.insert(url.to_string())
    }

    /// Number of distinct URLs recorded so far
    pub fn len(&self) -> usize {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
