//! Visited-set helper for graph walks.
//!
//! The schema graph is cyclic; walks over it keep a [`DeduplicationFilter`]
//! so each key is expanded once per traversal.

use std::collections::HashSet;
use std::hash::Hash;

/// HashSet prevention pattern - check before expanding
///
/// # Example
/// ```ignore
/// let mut visited = DeduplicationFilter::new();
/// if visited.should_process((node, parent)) {
///     // walk the node's children
/// }
/// ```
#[derive(Debug)]
pub struct DeduplicationFilter<K: Eq + Hash> {
    processed: HashSet<K>,
}

impl<K: Eq + Hash> DeduplicationFilter<K> {
    /// Create a new empty deduplication filter
    pub fn new() -> Self {
        Self {
            processed: HashSet::new(),
        }
    }

    /// Returns true if the key is new (and records it), false if it was seen before.
    pub fn should_process(&mut self, key: K) -> bool {
        self.processed.insert(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.processed.contains(key)
    }

    pub fn len(&self) -> usize {
        self.processed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed.is_empty()
    }
}

impl<K: Eq + Hash> Default for DeduplicationFilter<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_first_visit_only() {
        let mut visited = DeduplicationFilter::new();
        assert!(visited.should_process((1usize, 0usize)));
        assert!(!visited.should_process((1, 0)));
        // Same node under another parent is a separate visit.
        assert!(visited.should_process((1, 2)));
        assert!(visited.contains(&(1, 2)));
        assert_eq!(visited.len(), 2);
    }

    #[rstest]
    fn test_default_is_empty() {
        let visited: DeduplicationFilter<usize> = DeduplicationFilter::default();
        assert!(visited.is_empty());
    }
}
