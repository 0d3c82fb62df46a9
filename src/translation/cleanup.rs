/*!
 * Integrity sweep: removes records that "translate" into the source language.
 *
 * Such records are never written by the current write path, but stores
 * filled by older builds may still hold them.
 */

use log::{info, warn};

use crate::database::TranslationStore;
use crate::database::models::now_timestamp;
use crate::errors::StoreError;
use crate::language_utils::language_codes_match;
use crate::translation::reporter::{EntryLevel, LogEntry};

/// Result of one sweep
#[derive(Debug, Default, Clone)]
pub struct SweepReport {
    /// Records inspected
    pub scanned: usize,
    /// Ids removed
    pub deleted: Vec<i64>,
    /// Ids that could not be removed, with the reason
    pub failed: Vec<(i64, String)>,
    /// One entry per attempted deletion
    pub entries: Vec<LogEntry>,
}

impl SweepReport {
    fn record(&mut self, level: EntryLevel, message: String) {
        self.entries.push(LogEntry {
            message,
            level,
            timestamp: now_timestamp(),
        });
    }
}

/// Delete every record whose target language is the source language
pub async fn run_integrity_sweep(
    store: &dyn TranslationStore,
    source_language: &str,
) -> Result<SweepReport, StoreError> {
    let records = store.list_keys().await?;
    let mut report = SweepReport {
        scanned: records.len(),
        ..Default::default()
    };

    let offending: Vec<_> = records
        .into_iter()
        .filter(|record| {
            record.target_language == source_language
                || language_codes_match(&record.target_language, source_language)
        })
        .collect();

    info!(
        "Integrity sweep: {} of {} records target the source language '{}'",
        offending.len(),
        report.scanned,
        source_language
    );

    for record in offending {
        match store.delete_record(record.id).await {
            Ok(()) => {
                report.deleted.push(record.id);
                report.record(
                    EntryLevel::Success,
                    format!("Deleted record {} ({})", record.id, record.translation_key),
                );
            }
            Err(e) => {
                warn!("Could not delete record {}: {}", record.id, e);
                report.record(
                    EntryLevel::Error,
                    format!("Failed to delete record {}: {}", record.id, e),
                );
                report.failed.push((record.id, e.to_string()));
            }
        }
    }

    Ok(report)
}
