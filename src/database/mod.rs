/*!
 * Database module for persistent storage of translations.
 *
 * This module provides SQLite-based persistence for:
 * - Translation records keyed by `page:section:language`
 * - The bulk-run lease that keeps two runs from overlapping
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;
pub mod store;

// Re-export main types
pub use connection::DatabaseConnection;
pub use models::{
    LeaseOutcome, LeaseRecord, NewTranslationRecord, RecordKey, StoreStats, TranslationRecord,
};
pub use repository::Repository;
pub use store::TranslationStore;
