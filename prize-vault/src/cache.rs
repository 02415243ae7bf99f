//! Append-only, block-ordered event caches.
//!
//! A cache only ever grows at its tail. Updates fetch from one block past
//! the last cached event, so consecutive updates cover disjoint block
//! ranges and never duplicate an event.

use serde::{Deserialize, Serialize};

use crate::format::BlockStamped;

/// Ordered events of one kind for one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCache<T> {
    events: Vec<T>,
}

impl<T> Default for EventCache<T> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<T> From<Vec<T>> for EventCache<T> {
    fn from(events: Vec<T>) -> Self {
        Self { events }
    }
}

impl<T: BlockStamped> EventCache<T> {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the next fetch should start at, or `None` if nothing is cached.
    #[must_use]
    pub fn resume_block(&self) -> Option<u64> {
        self.events.last().map(|e| e.block_number() + 1)
    }

    /// Return the cache with `new` appended after the existing events.
    #[must_use]
    pub fn appended(mut self, new: impl IntoIterator<Item = T>) -> Self {
        self.events.extend(new);
        self
    }

    /// Cached events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[T] {
        &self.events
    }

    /// Number of cached events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing is cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Consume the cache, returning its events.
    #[must_use]
    pub fn into_events(self) -> Vec<T> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct At(u64);

    impl BlockStamped for At {
        fn block_number(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn empty_cache_has_no_resume_point() {
        assert_eq!(EventCache::<At>::new().resume_block(), None, "empty cache");
    }

    #[test]
    fn resumes_one_past_last_block() {
        let cache = EventCache::from(vec![At(10), At(12), At(40)]);
        assert_eq!(cache.resume_block(), Some(41), "B + 1");
    }

    #[test]
    fn append_preserves_prefix() {
        let old = EventCache::from(vec![At(1), At(5)]);
        let next = old.clone().appended([At(6), At(9)]);

        assert!(next.len() >= old.len(), "cache never shrinks");
        assert_eq!(&next.events()[..old.len()], old.events(), "prefix unchanged");
        assert_eq!(next.events()[2..], [At(6), At(9)], "new events at the tail");
    }

    #[test]
    fn appending_nothing_is_identity() {
        let old = EventCache::from(vec![At(3)]);
        assert_eq!(old.clone().appended([]), old, "no new events");
    }
}
