/*!
 * Common test utilities for the nexus-translator test suite
 */

use std::sync::Arc;

use nexus_translator::app_config::{Config, LanguageEntry, TranslationProvider};
use nexus_translator::catalog::{Catalog, ContentBlock};
use nexus_translator::database::{NewTranslationRecord, Repository, TranslationStore};
use nexus_translator::providers::mock::MockProvider;
use nexus_translator::translation::reporter::{CollectingNotifier, Reporter};
use nexus_translator::translation::{BulkTranslationDriver, Throttle};

/// Route library logs to the test output; set RUST_LOG to see them
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Language table entry
pub fn language(code: &str, name: &str) -> LanguageEntry {
    LanguageEntry::new(code, name)
}

/// English source plus French
pub fn en_fr() -> Vec<LanguageEntry> {
    vec![language("en", "English"), language("fr", "French")]
}

/// One page with a single `hero` section
pub fn single_section_catalog() -> Catalog {
    Catalog::new().with_section(
        "home",
        "hero",
        ContentBlock::new().text("title", "Welcome to Thailand"),
    )
}

/// One page with three sections
pub fn three_section_catalog() -> Catalog {
    Catalog::new()
        .with_section("home", "hero", ContentBlock::new().text("title", "Welcome"))
        .with_section(
            "home",
            "features",
            ContentBlock::new().list("items", &["Visa guides", "Calculators"]),
        )
        .with_section("home", "cta", ContentBlock::new().text("button", "Get started"))
}

/// In-memory repository with English as source language
pub fn memory_repository() -> Repository {
    Repository::new_in_memory()
        .expect("Failed to create in-memory repository")
        .with_source_language("en")
}

/// Driver over the given store and provider with throttling disabled
pub fn driver_for(
    repository: &Repository,
    provider: &MockProvider,
) -> (BulkTranslationDriver, Arc<CollectingNotifier>) {
    init_test_logging();
    let notifier = Arc::new(CollectingNotifier::new());
    let reporter = Arc::new(Reporter::with_notifier(notifier.clone()));

    let driver = BulkTranslationDriver::new(
        Arc::new(repository.clone()),
        Arc::new(provider.clone()),
        "en",
    )
    .with_throttle(Arc::new(Throttle::disabled()))
    .with_reporter(reporter);

    (driver, notifier)
}

/// Insert a record directly, bypassing the provider
pub async fn seed_record(repository: &Repository, page: &str, section: &str, language: &str, text: &str) -> i64 {
    repository
        .create_record(NewTranslationRecord::new(
            page,
            section,
            language,
            ContentBlock::new().text("title", "Welcome"),
            ContentBlock::new().text("title", text),
        ))
        .await
        .expect("Failed to seed record")
        .id
}

/// Insert a source-language record the way older builds did, straight into the table
pub fn seed_legacy_source_record(repository: &Repository, page: &str, section: &str) {
    let key = format!("{}:{}:en", page, section);
    repository
        .connection()
        .execute(move |conn| {
            conn.execute(
                "INSERT INTO translation_records (page_name, section_context, target_language,
                 content_block, translated_content, translation_key, usage_count, created_at, updated_at)
                 VALUES (?1, ?2, 'en', '{\"title\":\"Welcome\"}', '{\"title\":\"Welcome\"}', ?3, 0,
                 '2024-01-01T00:00:00.000Z', '2024-01-01T00:00:00.000Z')",
                [page, section, key.as_str()],
            )?;
            Ok(())
        })
        .expect("Failed to seed legacy record");
}

/// Configuration for controller tests: mock-friendly, no throttle, file-free
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::LMStudio;
    config.translation.common.throttle.enabled = false;
    config.languages = vec![
        language("en", "English"),
        language("fr", "French"),
        language("th", "Thai"),
    ];
    config
}
