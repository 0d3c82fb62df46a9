/*!
 * Repository layer for database operations.
 *
 * SQLite implementation of `TranslationStore`. SQL details stay here;
 * callers only see typed records and `StoreError`.
 */

use anyhow::Result;
use async_trait::async_trait;
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::time::Duration;

use super::connection::DatabaseConnection;
use super::models::{
    now_timestamp, timestamp_after, LeaseOutcome, LeaseRecord, NewTranslationRecord, RecordKey,
    StoreStats, TranslationRecord,
};
use super::store::TranslationStore;
use crate::catalog::ContentBlock;
use crate::errors::StoreError;
use crate::language_utils::language_codes_match;

const RECORD_COLUMNS: &str = "id, page_name, section_context, target_language, content_block, \
     translated_content, translation_key, usage_count, created_at, updated_at";

/// Row as stored, before the JSON columns are decoded
struct StoredRow {
    id: i64,
    page_name: String,
    section_context: String,
    target_language: String,
    content_block: String,
    translated_content: String,
    translation_key: String,
    usage_count: i64,
    created_at: String,
    updated_at: String,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            page_name: row.get(1)?,
            section_context: row.get(2)?,
            target_language: row.get(3)?,
            content_block: row.get(4)?,
            translated_content: row.get(5)?,
            translation_key: row.get(6)?,
            usage_count: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn decode(self) -> Result<TranslationRecord, StoreError> {
        let content_block = ContentBlock::from_json_str(&self.content_block).map_err(|e| {
            StoreError::InvalidContent(format!("record {} content_block: {}", self.id, e))
        })?;
        let translated_content = ContentBlock::from_json_str(&self.translated_content)
            .map_err(|e| {
                StoreError::InvalidContent(format!("record {} translated_content: {}", self.id, e))
            })?;

        Ok(TranslationRecord {
            id: self.id,
            page_name: self.page_name,
            section_context: self.section_context,
            target_language: self.target_language,
            content_block,
            translated_content,
            translation_key: self.translation_key,
            usage_count: self.usage_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

/// SQLite-backed translation store
#[derive(Clone, Debug)]
pub struct Repository {
    db: DatabaseConnection,
    source_language: String,
}

impl Repository {
    /// Create a repository over an open connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            source_language: "en".to_string(),
        }
    }

    /// Repository at the default database location
    pub fn new_default() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_default()?))
    }

    /// Repository over an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// Set the language that must never appear as a translation target
    pub fn with_source_language(mut self, source_language: impl Into<String>) -> Self {
        self.source_language = source_language.into();
        self
    }

    /// The language refused by `create_record`
    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    fn get_record_sync(conn: &Connection, id: i64) -> Result<TranslationRecord> {
        let row = conn
            .query_row(
                &format!("SELECT {} FROM translation_records WHERE id = ?1", RECORD_COLUMNS),
                [id],
                StoredRow::from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        Ok(row.decode()?)
    }
}

#[async_trait]
impl TranslationStore for Repository {
    async fn list_records(&self) -> Result<Vec<TranslationRecord>, StoreError> {
        let rows = self
            .db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {} FROM translation_records ORDER BY id",
                    RECORD_COLUMNS
                ))?;
                let rows = stmt
                    .query_map([], StoredRow::from_row)?
                    .filter_map(|r| match r {
                        Ok(row) => Some(row),
                        Err(e) => {
                            warn!("Skipping unreadable row: {}", e);
                            None
                        }
                    })
                    .collect::<Vec<_>>();
                Ok(rows)
            })
            .await?;

        let records = rows
            .into_iter()
            .filter_map(|row| match row.decode() {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping unreadable record: {}", e);
                    None
                }
            })
            .collect();

        Ok(records)
    }

    async fn list_keys(&self) -> Result<Vec<RecordKey>, StoreError> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, target_language, translation_key FROM translation_records ORDER BY id",
                )?;
                let keys = stmt
                    .query_map([], |row| {
                        Ok(RecordKey {
                            id: row.get(0)?,
                            target_language: row.get(1)?,
                            translation_key: row.get(2)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(keys)
            })
            .await
            .map_err(StoreError::from)
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<TranslationRecord>, StoreError> {
        let key = key.to_string();

        let row = self
            .db
            .execute_async(move |conn| {
                let row = conn
                    .query_row(
                        &format!(
                            "SELECT {} FROM translation_records WHERE translation_key = ?1",
                            RECORD_COLUMNS
                        ),
                        [&key],
                        StoredRow::from_row,
                    )
                    .optional()?;
                Ok(row)
            })
            .await?;

        row.map(StoredRow::decode).transpose()
    }

    async fn create_record(
        &self,
        record: NewTranslationRecord,
    ) -> Result<TranslationRecord, StoreError> {
        if record.target_language == self.source_language
            || language_codes_match(&record.target_language, &self.source_language)
        {
            return Err(StoreError::SourceLanguageTarget(record.target_language));
        }

        let content_block = record.content_block.to_json_string();
        let translated_content = record.translated_content.to_json_string();

        let id = self
            .db
            .execute_async(move |conn| {
                let now = now_timestamp();
                let inserted = conn.execute(
                    r#"
                    INSERT INTO translation_records (
                        page_name, section_context, target_language, content_block,
                        translated_content, translation_key, usage_count, created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?7)
                    "#,
                    params![
                        record.page_name,
                        record.section_context,
                        record.target_language,
                        content_block,
                        translated_content,
                        record.translation_key,
                        now,
                    ],
                );

                match inserted {
                    Ok(_) => Ok(conn.last_insert_rowid()),
                    Err(e) if is_unique_violation(&e) => {
                        Err(StoreError::DuplicateKey(record.translation_key).into())
                    }
                    Err(e) => Err(e.into()),
                }
            })
            .await?;

        debug!("Created translation record {}", id);

        self.db
            .execute_async(move |conn| Self::get_record_sync(conn, id))
            .await
            .map_err(StoreError::from)
    }

    async fn update_translated_content(
        &self,
        id: i64,
        translated_content: &ContentBlock,
    ) -> Result<TranslationRecord, StoreError> {
        let translated_content = translated_content.to_json_string();

        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    "UPDATE translation_records SET translated_content = ?1, updated_at = ?2 WHERE id = ?3",
                    params![translated_content, now_timestamp(), id],
                )?;
                if updated == 0 {
                    return Err(StoreError::NotFound(id.to_string()).into());
                }
                Self::get_record_sync(conn, id)
            })
            .await
            .map_err(StoreError::from)
    }

    async fn delete_record(&self, id: i64) -> Result<(), StoreError> {
        self.db
            .execute_async(move |conn| {
                let deleted = conn.execute("DELETE FROM translation_records WHERE id = ?1", [id])?;
                if deleted == 0 {
                    return Err(StoreError::NotFound(id.to_string()).into());
                }
                debug!("Deleted translation record {}", id);
                Ok(())
            })
            .await
            .map_err(StoreError::from)
    }

    async fn increment_usage(&self, id: i64) -> Result<(), StoreError> {
        self.db
            .execute_async(move |conn| {
                let updated = conn.execute(
                    "UPDATE translation_records SET usage_count = usage_count + 1 WHERE id = ?1",
                    [id],
                )?;
                if updated == 0 {
                    return Err(StoreError::NotFound(id.to_string()).into());
                }
                Ok(())
            })
            .await
            .map_err(StoreError::from)
    }

    async fn acquire_lease(&self, holder: &str, ttl: Duration) -> Result<LeaseOutcome, StoreError> {
        let holder = holder.to_string();

        self.db
            .transaction_async(move |tx| {
                let now = now_timestamp();
                tx.execute("DELETE FROM run_leases WHERE expires_at <= ?1", [&now])?;

                let current = tx
                    .query_row(
                        "SELECT holder, acquired_at, expires_at FROM run_leases WHERE id = 1",
                        [],
                        |row| {
                            Ok(LeaseRecord {
                                holder: row.get(0)?,
                                acquired_at: row.get(1)?,
                                expires_at: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;

                if let Some(lease) = current {
                    if lease.holder != holder {
                        return Ok(LeaseOutcome::Held(lease));
                    }
                }

                let lease = LeaseRecord {
                    holder,
                    acquired_at: now,
                    expires_at: timestamp_after(ttl),
                };
                tx.execute(
                    "INSERT OR REPLACE INTO run_leases (id, holder, acquired_at, expires_at) VALUES (1, ?1, ?2, ?3)",
                    params![lease.holder, lease.acquired_at, lease.expires_at],
                )?;

                Ok(LeaseOutcome::Acquired(lease))
            })
            .await
            .map_err(StoreError::from)
    }

    async fn release_lease(&self, holder: &str) -> Result<(), StoreError> {
        let holder = holder.to_string();

        self.db
            .execute_async(move |conn| {
                let released = conn.execute("DELETE FROM run_leases WHERE holder = ?1", [&holder])?;
                if released == 0 {
                    debug!("No lease held by {} to release", holder);
                }
                Ok(())
            })
            .await
            .map_err(StoreError::from)
    }

    async fn stats(&self) -> Result<StoreStats, StoreError> {
        self.db
            .execute_async(|conn| {
                let total_records: i64 =
                    conn.query_row("SELECT COUNT(*) FROM translation_records", [], |row| row.get(0))?;
                let total_usage: i64 = conn.query_row(
                    "SELECT COALESCE(SUM(usage_count), 0) FROM translation_records",
                    [],
                    |row| row.get(0),
                )?;

                let mut stmt = conn.prepare(
                    "SELECT target_language, COUNT(*) FROM translation_records GROUP BY target_language",
                )?;
                let records_per_language = stmt
                    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                    .filter_map(|r| r.ok())
                    .collect::<BTreeMap<_, _>>();

                let active_lease = conn
                    .query_row(
                        "SELECT holder, acquired_at, expires_at FROM run_leases WHERE id = 1 AND expires_at > ?1",
                        [now_timestamp()],
                        |row| {
                            Ok(LeaseRecord {
                                holder: row.get(0)?,
                                acquired_at: row.get(1)?,
                                expires_at: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;

                Ok(StoreStats {
                    total_records,
                    records_per_language,
                    total_usage,
                    active_lease,
                })
            })
            .await
            .map_err(StoreError::from)
    }
}
