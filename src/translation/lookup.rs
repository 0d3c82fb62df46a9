/*!
 * Read-through access to stored translations.
 *
 * Serving a translation consults the in-memory `RecordCache` first and
 * falls back to the store. Every served lookup counts as one use of the
 * record.
 */

use log::warn;
use std::sync::Arc;

use crate::catalog::ContentBlock;
use crate::database::TranslationStore;
use crate::errors::StoreError;
use crate::translation::cache::{CachedTranslation, RecordCache};
use crate::translation::key::compute_key;

/// Cached reader over a translation store
#[derive(Clone)]
pub struct TranslationLookup {
    store: Arc<dyn TranslationStore>,
    cache: RecordCache,
}

impl TranslationLookup {
    pub fn new(store: Arc<dyn TranslationStore>, cache: RecordCache) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// Translated content for a unit, `None` when it was never translated
    pub async fn get(
        &self,
        page_name: &str,
        section_context: &str,
        target_language: &str,
    ) -> Result<Option<ContentBlock>, StoreError> {
        let key = compute_key(page_name, section_context, target_language);

        let cached = match self.cache.get(&key) {
            Some(cached) => cached,
            None => match self.store.find_by_key(&key).await? {
                Some(record) => {
                    let cached = CachedTranslation {
                        record_id: record.id,
                        content: record.translated_content,
                    };
                    self.cache.store(key.clone(), cached.clone());
                    cached
                }
                None => return Ok(None),
            },
        };

        if let Err(e) = self.store.increment_usage(cached.record_id).await {
            warn!("Failed to count usage of {}: {}", key, e);
            if matches!(e, StoreError::NotFound(_)) {
                self.cache.remove(&key);
            }
        }

        Ok(Some(cached.content))
    }
}
