/*!
 * In-memory read cache for stored translations.
 *
 * Entries are keyed by translation key. The bulk driver clears the cache
 * at the end of each run so readers pick up newly written records.
 */

use std::collections::HashMap;
use std::sync::Arc;
use parking_lot::RwLock;
use log::debug;

use crate::catalog::ContentBlock;

/// A cached record: its store id and translated content
#[derive(Debug, Clone, PartialEq)]
pub struct CachedTranslation {
    pub record_id: i64,
    pub content: ContentBlock,
}

/// Hit/miss figures
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            self.hits as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Shared record cache; clones see the same entries
#[derive(Clone, Default)]
pub struct RecordCache {
    entries: Arc<RwLock<HashMap<String, CachedTranslation>>>,
    hits: Arc<RwLock<usize>>,
    misses: Arc<RwLock<usize>>,
}

impl RecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached translation for `key`, counting the hit or miss
    pub fn get(&self, key: &str) -> Option<CachedTranslation> {
        match self.entries.read().get(key) {
            Some(cached) => {
                *self.hits.write() += 1;
                debug!("Cache hit for {}", key);
                Some(cached.clone())
            }
            None => {
                *self.misses.write() += 1;
                debug!("Cache miss for {}", key);
                None
            }
        }
    }

    pub fn store(&self, key: impl Into<String>, cached: CachedTranslation) {
        self.entries.write().insert(key.into(), cached);
    }

    /// Drop one entry, e.g. after a manual edit
    pub fn remove(&self, key: &str) {
        self.entries.write().remove(key);
    }

    /// Drop every entry; statistics are kept
    pub fn invalidate(&self) {
        let mut entries = self.entries.write();
        let dropped = entries.len();
        entries.clear();
        debug!("Record cache invalidated ({} entries dropped)", dropped);
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: *self.hits.read(),
            misses: *self.misses.read(),
            entries: self.entries.read().len(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
