/*!
 * Translation of the content catalog into the site languages.
 *
 * - `key`: cache keys for (page, section, language) units
 * - `prompts`: instruction text and output schema sent to providers
 * - `throttle`: token bucket in front of provider calls
 * - `reporter`: run state, progress and run log
 * - `driver`: the bulk regeneration loop
 * - `cache` / `lookup`: read-through access to stored translations
 * - `quality`: the "contains English" heuristic
 * - `cleanup`: integrity sweep for source-language records
 */

pub mod cache;
pub mod cleanup;
pub mod driver;
pub mod key;
pub mod lookup;
pub mod prompts;
pub mod quality;
pub mod reporter;
pub mod throttle;

// Re-export main types
pub use self::cache::RecordCache;
pub use self::cleanup::{run_integrity_sweep, SweepReport};
pub use self::driver::{BulkTranslationDriver, RunSummary, SectionError, SectionStatus};
pub use self::key::{compute_key, TranslationKey};
pub use self::lookup::TranslationLookup;
pub use self::quality::contains_english;
pub use self::reporter::{EntryLevel, LogEntry, ProgressState, Reporter, RunState};
pub use self::throttle::Throttle;
