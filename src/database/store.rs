/*!
 * Translation store seam.
 *
 * The bulk driver, the integrity sweep and the lookup layer only talk to
 * this trait. `Repository` implements it over SQLite.
 */

use async_trait::async_trait;
use std::time::Duration;

use super::models::{LeaseOutcome, NewTranslationRecord, RecordKey, StoreStats, TranslationRecord};
use crate::catalog::ContentBlock;
use crate::errors::StoreError;

/// Persistent collection of translation records
#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// All records, ordered by id
    async fn list_records(&self) -> Result<Vec<TranslationRecord>, StoreError>;

    /// Id, target language and key of every record, ordered by id
    ///
    /// Only scalar columns are read, so rows with undecodable content are included.
    async fn list_keys(&self) -> Result<Vec<RecordKey>, StoreError>;

    /// Record with the given translation key, if any
    async fn find_by_key(&self, key: &str) -> Result<Option<TranslationRecord>, StoreError>;

    /// Persist a new record with `usage_count = 0`
    async fn create_record(
        &self,
        record: NewTranslationRecord,
    ) -> Result<TranslationRecord, StoreError>;

    /// Replace a record's translated content and bump `updated_at`
    async fn update_translated_content(
        &self,
        id: i64,
        translated_content: &ContentBlock,
    ) -> Result<TranslationRecord, StoreError>;

    /// Delete a record; `NotFound` if it does not exist
    async fn delete_record(&self, id: i64) -> Result<(), StoreError>;

    /// Add one to a record's usage count
    async fn increment_usage(&self, id: i64) -> Result<(), StoreError>;

    /// Try to take the bulk-run lease for `ttl`
    async fn acquire_lease(&self, holder: &str, ttl: Duration) -> Result<LeaseOutcome, StoreError>;

    /// Drop the lease if `holder` owns it
    async fn release_lease(&self, holder: &str) -> Result<(), StoreError>;

    /// Aggregate figures
    async fn stats(&self) -> Result<StoreStats, StoreError>;
}
