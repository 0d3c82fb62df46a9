/*!
 * # Nexus Translator
 *
 * Translation cache and bulk regeneration back-office for the
 * Thai Nexus Visa Hub content site.
 *
 * ## Features
 *
 * - Bulk translation of the content catalog into every site language
 * - Persistent SQLite translation store keyed by `page:section:language`
 * - AI providers:
 *   - OpenAI API (also LM Studio through its OpenAI-compatible server)
 *   - Anthropic API
 * - Token-bucket throttling of provider calls
 * - Integrity sweep, "contains English" audit and retranslation
 * - Manual edits with local JSON validation, export and statistics
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `catalog`: The source-language content catalog
 * - `database`: SQLite translation store
 * - `translation`: Bulk driver, throttle, reporter, lookup, audit and cleanup
 * - `providers`: Client implementations for the AI completion endpoint
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod catalog;
pub mod database;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::Controller;
pub use catalog::{Catalog, ContentBlock};
pub use database::{Repository, TranslationRecord, TranslationStore};
pub use errors::{AppError, DriverError, InputError, ProviderError, StoreError, TranslationError};
pub use language_utils::{get_language_name, language_codes_match, normalize_language_code};
pub use translation::{compute_key, contains_english, BulkTranslationDriver, RunSummary};
