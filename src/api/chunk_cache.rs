use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::ChunkKey;

/// Shared, immutable payload of one fetched chunk.
pub type ChunkPayload = Arc<[i16]>;

/// Runtime metrics exposed by chunk caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChunkCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

/// Keyed chunk cache consulted by the range fetcher.
///
/// The eviction policy lives entirely behind this trait so the fetch path is
/// unchanged whether one chunk or many are retained.
pub trait ChunkCache {
    /// Looks up `key`, counting a hit or a miss.
    fn get(&mut self, key: ChunkKey) -> Option<ChunkPayload>;

    /// Stores `payload` as the most recent entry, evicting per policy.
    fn put(&mut self, key: ChunkKey, payload: ChunkPayload);

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn stats(&self) -> ChunkCacheStats;
}

/// Most-recently-used cache holding at most one chunk.
#[derive(Debug, Default, Clone)]
pub struct SingleSlotCache {
    slot: Option<(ChunkKey, ChunkPayload)>,
    hits: u64,
    misses: u64,
}

impl SingleSlotCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn key(&self) -> Option<ChunkKey> {
        self.slot.as_ref().map(|(key, _)| *key)
    }
}

impl ChunkCache for SingleSlotCache {
    fn get(&mut self, key: ChunkKey) -> Option<ChunkPayload> {
        let value = self
            .slot
            .as_ref()
            .filter(|(slot_key, _)| *slot_key == key)
            .map(|(_, payload)| Arc::clone(payload));
        if value.is_some() {
            self.hits = self.hits.saturating_add(1);
        } else {
            self.misses = self.misses.saturating_add(1);
        }
        value
    }

    fn put(&mut self, key: ChunkKey, payload: ChunkPayload) {
        self.slot = Some((key, payload));
    }

    fn clear(&mut self) {
        self.slot = None;
    }

    fn len(&self) -> usize {
        usize::from(self.slot.is_some())
    }

    fn capacity(&self) -> usize {
        1
    }

    fn stats(&self) -> ChunkCacheStats {
        ChunkCacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.len(),
        }
    }
}

/// Least-recently-used cache holding up to `capacity` chunks.
#[derive(Debug, Clone)]
pub struct LruChunkCache {
    entries: IndexMap<ChunkKey, ChunkPayload>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl LruChunkCache {
    /// Creates a cache; a zero capacity is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: IndexMap::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Cached keys from least to most recently used.
    #[must_use]
    pub fn keys(&self) -> Vec<ChunkKey> {
        self.entries.keys().copied().collect()
    }
}

impl ChunkCache for LruChunkCache {
    fn get(&mut self, key: ChunkKey) -> Option<ChunkPayload> {
        let Some(index) = self.entries.get_index_of(&key) else {
            self.misses = self.misses.saturating_add(1);
            return None;
        };
        let last = self.entries.len() - 1;
        self.entries.move_index(index, last);
        self.hits = self.hits.saturating_add(1);
        self.entries.get(&key).cloned()
    }

    fn put(&mut self, key: ChunkKey, payload: ChunkPayload) {
        self.entries.shift_remove(&key);
        while self.entries.len() >= self.capacity {
            self.entries.shift_remove_index(0);
        }
        self.entries.insert(key, payload);
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn stats(&self) -> ChunkCacheStats {
        ChunkCacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.entries.len(),
        }
    }
}
