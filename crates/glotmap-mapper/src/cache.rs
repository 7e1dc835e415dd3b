//! Bounded LRU cache for mapper handles.
//!
//! The set of distinct locale pairs is small in practice but unbounded in
//! principle, so handle caching needs an eviction policy. Linear scans
//! are fine at these sizes.

/// Least-recently-used cache over a recency-ordered vector
/// (front = most recent).
#[derive(Debug)]
pub struct LruCache<K, V> {
    capacity: usize,
    entries: Vec<(K, V)>,
}

impl<K: Eq, V: Clone> LruCache<K, V> {
    /// `capacity` of zero disables caching entirely.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: Vec::new(),
        }
    }

    /// Look up and mark as most recently used.
    pub fn get(&mut self, key: &K) -> Option<V> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        let entry = self.entries.remove(pos);
        let value = entry.1.clone();
        self.entries.insert(0, entry);
        Some(value)
    }

    /// Insert as most recently used, evicting the oldest entry past
    /// capacity.
    pub fn put(&mut self, key: K, value: V) {
        if let Some(pos) = self.entries.iter().position(|(k, _)| *k == key) {
            self.entries.remove(pos);
        }
        self.entries.insert(0, (key, value));
        self.entries.truncate(self.capacity);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
