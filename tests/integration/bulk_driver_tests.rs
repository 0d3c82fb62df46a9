/*!
 * End-to-end tests of the bulk translation driver over an in-memory store
 */

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use nexus_translator::catalog::ContentBlock;
use nexus_translator::database::{
    LeaseOutcome, NewTranslationRecord, RecordKey, Repository, StoreStats, TranslationRecord,
    TranslationStore,
};
use nexus_translator::errors::{DriverError, InputError, ProviderError, StoreError, TranslationError};
use nexus_translator::providers::mock::MockProvider;
use nexus_translator::translation::cache::CachedTranslation;
use nexus_translator::translation::reporter::{CollectingNotifier, EntryLevel, Reporter};
use nexus_translator::translation::{
    BulkTranslationDriver, RecordCache, RunState, SectionStatus, Throttle,
};

use crate::common::{self, en_fr, language, memory_repository, single_section_catalog, three_section_catalog};

#[tokio::test]
async fn test_run_withSingleSection_shouldCallProviderOnceAndStoreRecord() {
    let repository = memory_repository();
    let provider = MockProvider::working();
    let (driver, _) = common::driver_for(&repository, &provider);

    let summary = driver.run(&single_section_catalog(), &en_fr()).await.unwrap();

    assert_eq!(provider.call_count(), 1);
    assert_eq!(summary.total, 1);
    assert_eq!(summary.translated, 1);

    let records = repository.list_records().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].translation_key, "home:hero:fr");
    assert_eq!(records[0].usage_count, 0);
    assert_eq!(records[0].content_block, ContentBlock::new().text("title", "Welcome to Thailand"));
}

#[tokio::test]
async fn test_run_calledTwice_shouldSkipEverythingTheSecondTime() {
    let repository = memory_repository();
    let provider = MockProvider::working();
    let (driver, _) = common::driver_for(&repository, &provider);
    let catalog = three_section_catalog();
    let languages = vec![language("en", "English"), language("fr", "French"), language("de", "German")];

    driver.run(&catalog, &languages).await.unwrap();
    let calls_after_first = provider.call_count();
    let records_after_first = repository.list_records().await.unwrap();

    let second = driver.run(&catalog, &languages).await.unwrap();

    assert_eq!(calls_after_first, 6);
    assert_eq!(provider.call_count(), calls_after_first);
    assert_eq!(second.skipped, 6);
    assert_eq!(second.translated, 0);
    assert_eq!(repository.list_records().await.unwrap(), records_after_first);
    assert_eq!(
        driver.reporter().entries_with_level(EntryLevel::Info).len(),
        6,
        "every section should log a skip"
    );
}

#[tokio::test]
async fn test_run_withFailureOnSecondSection_shouldContinueAndLogOneError() {
    let repository = memory_repository();
    let provider = MockProvider::failing_on(&[2]);
    let (driver, notifier) = common::driver_for(&repository, &provider);

    let summary = driver.run(&three_section_catalog(), &en_fr()).await.unwrap();

    assert_eq!(provider.call_count(), 3, "third section must still be attempted");
    assert_eq!(summary.translated, 2);
    assert_eq!(summary.failed, 1);

    let entries = driver.reporter().entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries.iter().filter(|e| e.level == EntryLevel::Error).count(), 1);
    assert_eq!(entries.iter().filter(|e| e.level == EntryLevel::Success).count(), 2);
    assert!(entries[1].message.contains("home:features:fr"));

    let keys: Vec<String> = repository
        .list_records()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.translation_key)
        .collect();
    assert_eq!(keys, vec!["home:hero:fr", "home:cta:fr"]);

    let errors: Vec<_> = notifier
        .notifications()
        .into_iter()
        .filter(|(level, _)| *level == EntryLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
}

#[tokio::test]
async fn test_run_withFailures_shouldStillReachTotalBeforeReset() {
    let repository = memory_repository();
    let provider = MockProvider::failing_on(&[1, 3]);
    let (driver, notifier) = common::driver_for(&repository, &provider);

    let summary = driver.run(&three_section_catalog(), &en_fr()).await.unwrap();

    assert_eq!(summary.processed(), summary.total);

    let history = notifier.progress_history();
    let peak = history.iter().map(|p| p.current).max().unwrap_or(0);
    assert_eq!(peak, 3);
    assert!(history.iter().all(|p| p.total == 3 || p.total == 0));

    // progress is reset once the run completes
    assert_eq!(history.last().map(|p| p.current), Some(0));
    assert_eq!(driver.reporter().progress().current, 0);
    assert_eq!(driver.reporter().run_state(), RunState::Completed);
}

#[tokio::test]
async fn test_run_withMalformedResponses_shouldRecordSchemaViolations() {
    let repository = memory_repository();
    let provider = MockProvider::malformed();
    let (driver, _) = common::driver_for(&repository, &provider);

    let summary = driver.run(&three_section_catalog(), &en_fr()).await.unwrap();

    assert_eq!(summary.failed, 3);
    assert!(summary.errors().all(|e| matches!(
        e.source,
        TranslationError::Provider(ProviderError::SchemaViolation(_))
    )));
    assert!(repository.list_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_shouldNeverTranslateIntoSourceLanguage() {
    let repository = memory_repository();
    let provider = MockProvider::working();
    let (driver, _) = common::driver_for(&repository, &provider);

    let summary = driver
        .run(&single_section_catalog(), &[language("en", "English")])
        .await
        .unwrap();

    assert_eq!(summary.total, 0);
    assert_eq!(provider.call_count(), 0);
    assert!(repository.list_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_run_shouldVisitLanguagesThenPagesThenSections() {
    let repository = memory_repository();
    let provider = MockProvider::working();
    let (driver, _) = common::driver_for(&repository, &provider);
    let catalog = three_section_catalog().with_section(
        "contact",
        "form",
        ContentBlock::new().text("label", "Your email"),
    );
    let languages = vec![language("th", "Thai"), language("en", "English"), language("fr", "French")];

    let summary = driver.run(&catalog, &languages).await.unwrap();

    let order: Vec<&str> = summary
        .outcomes
        .iter()
        .map(|outcome| match outcome {
            Ok(status) => status.key(),
            Err(e) => e.key.as_str(),
        })
        .collect();
    assert_eq!(
        order,
        vec![
            "home:hero:th", "home:features:th", "home:cta:th", "contact:form:th",
            "home:hero:fr", "home:features:fr", "home:cta:fr", "contact:form:fr",
        ]
    );

    let prompts = provider.prompts();
    assert!(prompts[0].contains("Thai"));
    assert!(prompts[4].contains("French"));
}

#[tokio::test]
async fn test_run_withPartiallyFilledStore_shouldOnlyTranslateMissingSections() {
    let repository = memory_repository();
    common::seed_record(&repository, "home", "features", "fr", "Guides de visa").await;
    let provider = MockProvider::working();
    let (driver, _) = common::driver_for(&repository, &provider);

    let summary = driver.run(&three_section_catalog(), &en_fr()).await.unwrap();

    assert_eq!(provider.call_count(), 2);
    assert_eq!(summary.skipped, 1);
    assert!(matches!(
        &summary.outcomes[1],
        Ok(SectionStatus::Skipped(key)) if key == "home:features:fr"
    ));
}

#[tokio::test]
async fn test_run_whileAlreadyRunning_shouldRefuseToStart() {
    let repository = memory_repository();
    let provider = MockProvider::working();
    let (driver, _) = common::driver_for(&repository, &provider);
    driver.reporter().begin_run(1).unwrap();

    let result = driver.run(&single_section_catalog(), &en_fr()).await;

    assert!(matches!(result, Err(DriverError::AlreadyRunning)));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_run_withLeaseHeldElsewhere_shouldRefuseToStart() {
    let repository = memory_repository();
    repository
        .acquire_lease("other-process", Duration::from_secs(600))
        .await
        .unwrap();
    let provider = MockProvider::working();
    let (driver, _) = common::driver_for(&repository, &provider);

    let result = driver.run(&single_section_catalog(), &en_fr()).await;

    match result {
        Err(DriverError::LeaseHeld { holder, .. }) => assert_eq!(holder, "other-process"),
        other => panic!("unexpected result: {:?}", other.map(|s| s.to_string())),
    }
    assert_eq!(provider.call_count(), 0);
    assert_eq!(driver.reporter().run_state(), RunState::Idle);
}

#[tokio::test]
async fn test_run_afterCompletion_shouldReleaseLease() {
    let repository = memory_repository();
    let provider = MockProvider::working();
    let (driver, _) = common::driver_for(&repository, &provider);

    driver.run(&single_section_catalog(), &en_fr()).await.unwrap();

    let outcome = repository
        .acquire_lease("next-run", Duration::from_secs(60))
        .await
        .unwrap();
    assert!(matches!(outcome, LeaseOutcome::Acquired(_)));
}

#[tokio::test]
async fn test_run_shouldInvalidateReadCacheAndNotifySuccess() {
    let repository = memory_repository();
    let provider = MockProvider::working();
    let (driver, notifier) = common::driver_for(&repository, &provider);
    let cache = RecordCache::new();
    cache.store(
        "home:hero:fr",
        CachedTranslation {
            record_id: 99,
            content: ContentBlock::new().text("title", "stale"),
        },
    );
    let driver = driver.with_cache(cache.clone());

    driver.run(&single_section_catalog(), &en_fr()).await.unwrap();

    assert!(cache.is_empty());
    let last = notifier.notifications().pop().unwrap();
    assert_eq!(last.0, EntryLevel::Success);
    assert!(last.1.contains("1 translated"));
}

/// Store whose snapshot is always empty, as if another writer raced the run
struct StaleSnapshotStore(Repository);

#[async_trait]
impl TranslationStore for StaleSnapshotStore {
    async fn list_records(&self) -> Result<Vec<TranslationRecord>, StoreError> {
        self.0.list_records().await
    }
    async fn list_keys(&self) -> Result<Vec<RecordKey>, StoreError> {
        Ok(Vec::new())
    }
    async fn find_by_key(&self, key: &str) -> Result<Option<TranslationRecord>, StoreError> {
        self.0.find_by_key(key).await
    }
    async fn create_record(&self, record: NewTranslationRecord) -> Result<TranslationRecord, StoreError> {
        self.0.create_record(record).await
    }
    async fn update_translated_content(
        &self,
        id: i64,
        translated_content: &ContentBlock,
    ) -> Result<TranslationRecord, StoreError> {
        self.0.update_translated_content(id, translated_content).await
    }
    async fn delete_record(&self, id: i64) -> Result<(), StoreError> {
        self.0.delete_record(id).await
    }
    async fn increment_usage(&self, id: i64) -> Result<(), StoreError> {
        self.0.increment_usage(id).await
    }
    async fn acquire_lease(&self, holder: &str, ttl: Duration) -> Result<LeaseOutcome, StoreError> {
        self.0.acquire_lease(holder, ttl).await
    }
    async fn release_lease(&self, holder: &str) -> Result<(), StoreError> {
        self.0.release_lease(holder).await
    }
    async fn stats(&self) -> Result<StoreStats, StoreError> {
        self.0.stats().await
    }
}

#[tokio::test]
async fn test_run_withKeyWrittenAfterSnapshot_shouldFailThatSectionWithDuplicateKey() {
    let repository = memory_repository();
    common::seed_record(&repository, "home", "cta", "fr", "Commencer").await;
    let provider = MockProvider::working();
    let notifier = Arc::new(CollectingNotifier::new());
    let driver = BulkTranslationDriver::new(
        Arc::new(StaleSnapshotStore(repository.clone())),
        Arc::new(provider.clone()),
        "en",
    )
    .with_throttle(Arc::new(Throttle::disabled()))
    .with_reporter(Arc::new(Reporter::with_notifier(notifier)));

    let summary = driver.run(&three_section_catalog(), &en_fr()).await.unwrap();

    assert_eq!(summary.translated, 2);
    assert_eq!(summary.failed, 1);
    let failure = summary.errors().next().unwrap();
    assert_eq!(failure.key, "home:cta:fr");
    assert!(matches!(
        failure.source,
        TranslationError::Store(StoreError::DuplicateKey(_))
    ));
    assert_eq!(repository.list_records().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_run_withUnreadableStoredRow_shouldSkipItWithoutProviderCall() {
    let repository = memory_repository();
    repository
        .connection()
        .execute(|conn| {
            conn.execute(
                "INSERT INTO translation_records (page_name, section_context, target_language,
                 content_block, translated_content, translation_key, usage_count, created_at, updated_at)
                 VALUES ('home', 'hero', 'fr', '{\"t\":1}', '{\"t\":1}', 'home:hero:fr', 0,
                 '2024-01-01T00:00:00.000Z', '2024-01-01T00:00:00.000Z')",
                [],
            )?;
            Ok(())
        })
        .unwrap();
    let provider = MockProvider::working();
    let (driver, _) = common::driver_for(&repository, &provider);

    let summary = driver.run(&single_section_catalog(), &en_fr()).await.unwrap();

    assert_eq!(provider.call_count(), 0);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);
}

#[tokio::test]
async fn test_run_withSeparatorInSectionName_shouldFailSectionWithoutProviderCall() {
    let repository = memory_repository();
    let provider = MockProvider::working();
    let (driver, notifier) = common::driver_for(&repository, &provider);
    let catalog = nexus_translator::catalog::Catalog::new()
        .with_section("a:b", "c", ContentBlock::new().text("title", "One"))
        .with_section("a", "b:c", ContentBlock::new().text("title", "Two"))
        .with_section("home", "hero", ContentBlock::new().text("title", "Three"));

    let summary = driver.run(&catalog, &en_fr()).await.unwrap();

    assert_eq!(provider.call_count(), 1);
    assert_eq!(summary.translated, 1);
    assert_eq!(summary.failed, 2);
    assert!(summary.errors().all(|e| matches!(
        e.source,
        TranslationError::Input(InputError::InvalidKey(_))
    )));
    assert_eq!(
        notifier
            .notifications()
            .iter()
            .filter(|(level, _)| *level == EntryLevel::Error)
            .count(),
        2
    );
    let keys: Vec<String> = repository
        .list_records()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.translation_key)
        .collect();
    assert_eq!(keys, vec!["home:hero:fr"]);
}
