/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database tables and provide
 * type-safe access to persisted data.
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::ContentBlock;
use crate::translation::key::compute_key;

/// Persisted translation of one (page, section, language) unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Store-assigned id
    pub id: i64,
    /// Logical page identifier
    pub page_name: String,
    /// Section identifier within the page
    pub section_context: String,
    /// Language the content was translated into
    pub target_language: String,
    /// Source content snapshot at translation time
    pub content_block: ContentBlock,
    /// Translated content, mirroring `content_block`
    pub translated_content: ContentBlock,
    /// `page:section:language`
    pub translation_key: String,
    /// Number of times the record was served
    pub usage_count: i64,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
    /// Last update timestamp (ISO 8601)
    pub updated_at: String,
}

/// Identifying columns of a stored record, readable even when its content is not
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordKey {
    /// Store-assigned id
    pub id: i64,
    /// Language the content was translated into
    pub target_language: String,
    /// `page:section:language`
    pub translation_key: String,
}

/// Data for a record that has not been stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewTranslationRecord {
    /// Logical page identifier
    pub page_name: String,
    /// Section identifier within the page
    pub section_context: String,
    /// Target language code
    pub target_language: String,
    /// Source content snapshot
    pub content_block: ContentBlock,
    /// Translated content
    pub translated_content: ContentBlock,
    /// Composite lookup key
    pub translation_key: String,
}

impl NewTranslationRecord {
    /// Create a new record, stamping its translation key
    pub fn new(
        page_name: impl Into<String>,
        section_context: impl Into<String>,
        target_language: impl Into<String>,
        content_block: ContentBlock,
        translated_content: ContentBlock,
    ) -> Self {
        let page_name = page_name.into();
        let section_context = section_context.into();
        let target_language = target_language.into();
        let translation_key = compute_key(&page_name, &section_context, &target_language);

        Self {
            page_name,
            section_context,
            target_language,
            content_block,
            translated_content,
            translation_key,
        }
    }
}

/// Exclusive bulk-run lease
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaseRecord {
    /// Lease holder id (UUID)
    pub holder: String,
    /// Acquisition timestamp (ISO 8601)
    pub acquired_at: String,
    /// Expiry timestamp (ISO 8601)
    pub expires_at: String,
}

/// Result of a lease acquisition attempt
#[derive(Debug, Clone, PartialEq)]
pub enum LeaseOutcome {
    /// The caller now holds the lease
    Acquired(LeaseRecord),
    /// Somebody else holds a live lease
    Held(LeaseRecord),
}

impl fmt::Display for LeaseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (until {})", self.holder, self.expires_at)
    }
}

/// Aggregate figures about the translation store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreStats {
    /// Total number of records
    pub total_records: i64,
    /// Record count per target language
    pub records_per_language: BTreeMap<String, i64>,
    /// Sum of usage counts
    pub total_usage: i64,
    /// Currently held lease, if any
    pub active_lease: Option<LeaseRecord>,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Records: {}, Usage: {}", self.total_records, self.total_usage)?;
        for (language, count) in &self.records_per_language {
            write!(f, ", {}: {}", language, count)?;
        }
        if let Some(lease) = &self.active_lease {
            write!(f, ", Lease: {}", lease)?;
        }
        Ok(())
    }
}

/// Current timestamp in the store's sortable format
pub fn now_timestamp() -> String {
    timestamp_after(std::time::Duration::ZERO)
}

/// Timestamp `offset` in the future, same format as `now_timestamp`
pub fn timestamp_after(offset: std::time::Duration) -> String {
    let offset = chrono::Duration::from_std(offset).unwrap_or(chrono::Duration::zero());
    (chrono::Utc::now() + offset).to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
