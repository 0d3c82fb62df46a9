/*!
 * Controller operations end to end over an in-memory store and mock provider
 */

use std::sync::Arc;

use nexus_translator::app_controller::Controller;
use nexus_translator::catalog::ContentBlock;
use nexus_translator::errors::{InputError, StoreError};
use nexus_translator::providers::mock::MockProvider;
use nexus_translator::providers::CompletionRequest;
use nexus_translator::translation::reporter::{CollectingNotifier, EntryLevel};
use nexus_translator::translation::RunState;
use tempfile::tempdir;

use crate::common::{
    init_test_logging, memory_repository, seed_legacy_source_record, seed_record, test_config,
    three_section_catalog,
};

fn controller_with(provider: &MockProvider) -> (Controller, nexus_translator::Repository) {
    init_test_logging();
    let repository = memory_repository();
    let controller = Controller::with_components(
        test_config(),
        repository.clone(),
        Arc::new(provider.clone()),
        three_section_catalog(),
    );
    (controller, repository)
}

fn french_answer(_request: &CompletionRequest) -> ContentBlock {
    ContentBlock::new().text("title", "Bienvenue en Thaïlande")
}

#[test]
fn test_withConfig_withDatabasePath_shouldOpenFileBackedStore() {
    init_test_logging();
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("store").join("translations.db");
    let mut config = test_config();
    config.storage.database_path = Some(db_path.to_string_lossy().to_string());

    let controller = Controller::with_config(config).unwrap();
    assert!(controller.catalog().get_section("home", "hero").is_some());

    let stats = tokio_test::block_on(controller.stats()).unwrap();
    assert_eq!(stats.store.total_records, 0);
    assert!(db_path.exists());
}

#[tokio::test]
async fn test_runBulkTranslation_shouldTranslateEveryTargetLanguage() {
    let provider = MockProvider::working();
    let (controller, _repo) = controller_with(&provider);

    let summary = controller.run_bulk_translation().await.unwrap();

    assert_eq!(summary.total, 6);
    assert_eq!(summary.translated, 6);
    assert_eq!(provider.call_count(), 6);
    assert_eq!(controller.reporter().run_state(), RunState::Completed);

    let record = controller.show("home:cta:th").await.unwrap();
    assert_eq!(record.target_language, "th");
    assert!(controller.show("home:cta:en").await.is_err());
}

#[tokio::test]
async fn test_runBulkTranslation_withNotifier_shouldReportFinalSummary() {
    let provider = MockProvider::failing_on(&[1]);
    let notifier = Arc::new(CollectingNotifier::new());
    let (controller, _repo) = controller_with(&provider);
    let controller = controller.with_notifier(notifier.clone());

    let summary = controller.run_bulk_translation().await.unwrap();

    assert_eq!(summary.failed, 1);
    let notifications = notifier.notifications();
    assert!(notifications.iter().any(|(level, _)| *level == EntryLevel::Error));
    let (level, message) = notifications.last().unwrap();
    assert_eq!(*level, EntryLevel::Success);
    assert!(message.contains("5 translated"));
}

#[tokio::test]
async fn test_show_withMalformedKey_shouldFail() {
    let (controller, _repo) = controller_with(&MockProvider::working());

    let err = controller.show("home-hero-fr").await.unwrap_err();
    assert!(err.downcast_ref::<InputError>().is_some());
}

#[tokio::test]
async fn test_show_withUnknownKey_shouldReturnNotFound() {
    let (controller, _repo) = controller_with(&MockProvider::working());

    let err = controller.show("home:hero:fr").await.unwrap_err();
    assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_editTranslation_withInvalidJson_shouldLeaveStoreUnchanged() {
    let (controller, repo) = controller_with(&MockProvider::working());
    seed_record(&repo, "home", "hero", "fr", "Bienvenue").await;

    let err = controller
        .edit_translation("home:hero:fr", r#"{"title": "Salut""#)
        .await
        .unwrap_err();
    assert!(matches!(err.downcast_ref::<InputError>(), Some(InputError::InvalidJson(_))));

    let err = controller
        .edit_translation("home:hero:fr", r#"{"title": 7}"#)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<InputError>(),
        Some(InputError::InvalidValue { .. })
    ));

    let record = controller.show("home:hero:fr").await.unwrap();
    assert_eq!(record.translated_content.string_leaves(), vec!["Bienvenue"]);
}

#[tokio::test]
async fn test_editTranslation_withValidJson_shouldReplaceContentAndEvictCache() {
    let (controller, repo) = controller_with(&MockProvider::working());
    seed_record(&repo, "home", "hero", "fr", "Bienvenue").await;

    let before = controller.lookup("home", "hero", "fr").await.unwrap().unwrap();
    assert_eq!(before.string_leaves(), vec!["Bienvenue"]);

    let updated = controller
        .edit_translation("home:hero:fr", r#"{"title": "Bienvenue en Thaïlande"}"#)
        .await
        .unwrap();
    assert_eq!(updated.translated_content.string_leaves(), vec!["Bienvenue en Thaïlande"]);

    let after = controller.lookup("home", "hero", "fr").await.unwrap().unwrap();
    assert_eq!(after.string_leaves(), vec!["Bienvenue en Thaïlande"]);
}

#[tokio::test]
async fn test_lookup_twice_shouldHitCacheAndCountBothUses() {
    let (controller, repo) = controller_with(&MockProvider::working());
    seed_record(&repo, "home", "hero", "fr", "Bienvenue").await;

    controller.lookup("home", "hero", "fr").await.unwrap();
    controller.lookup("home", "hero", "fr").await.unwrap();

    let cache = controller.cache().stats();
    assert_eq!(cache.misses, 1);
    assert_eq!(cache.hits, 1);
    let record = controller.show("home:hero:fr").await.unwrap();
    assert_eq!(record.usage_count, 2);
}

#[tokio::test]
async fn test_lookup_withUntranslatedUnit_shouldReturnNone() {
    let (controller, _repo) = controller_with(&MockProvider::working());

    let content = controller.lookup("home", "hero", "th").await.unwrap();
    assert!(content.is_none());
}

#[tokio::test]
async fn test_export_shouldWriteOneFilePerTargetLanguage() {
    let (controller, repo) = controller_with(&MockProvider::working());
    seed_record(&repo, "home", "hero", "fr", "Bienvenue").await;
    seed_record(&repo, "home", "cta", "fr", "Commencer").await;
    let dir = tempdir().unwrap();

    let written = controller.export(dir.path()).await.unwrap();

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["fr.json", "th.json"]);

    let french: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("fr.json")).unwrap()).unwrap();
    assert_eq!(french["home"]["hero"]["title"], "Bienvenue");
    assert_eq!(french["home"]["cta"]["title"], "Commencer");

    let thai = std::fs::read_to_string(dir.path().join("th.json")).unwrap();
    assert_eq!(thai.trim(), "{}");
}

#[tokio::test]
async fn test_stats_shouldReportRecordsAndCacheFigures() {
    let (controller, repo) = controller_with(&MockProvider::working());
    seed_record(&repo, "home", "hero", "fr", "Bienvenue").await;
    seed_record(&repo, "home", "hero", "th", "ยินดีต้อนรับ").await;
    controller.lookup("home", "hero", "th").await.unwrap();

    let stats = controller.stats().await.unwrap();

    assert_eq!(stats.store.total_records, 2);
    assert_eq!(stats.store.total_usage, 1);
    assert_eq!(stats.cache.misses, 1);
    assert_eq!(stats.database_size_bytes, 0);
}

#[tokio::test]
async fn test_runAudit_withRetranslate_shouldReplaceEnglishLookingRecords() {
    let provider = MockProvider::working().with_custom_response(french_answer);
    let (controller, repo) = controller_with(&provider);
    seed_record(&repo, "home", "hero", "fr", "Welcome to the visa hub").await;
    seed_record(&repo, "home", "cta", "fr", "Commencer").await;

    let report = controller.run_audit(true).await.unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.flagged, vec!["home:hero:fr".to_string()]);
    assert_eq!(report.retranslated, vec!["home:hero:fr".to_string()]);
    assert!(report.failed.is_empty());
    assert_eq!(provider.call_count(), 1);
    assert!(provider.prompts()[0].contains("French"));

    let record = controller.show("home:hero:fr").await.unwrap();
    assert_eq!(record.translated_content.string_leaves(), vec!["Bienvenue en Thaïlande"]);
}

#[tokio::test]
async fn test_runAudit_withoutRetranslate_shouldNotCallProvider() {
    let provider = MockProvider::working();
    let (controller, repo) = controller_with(&provider);
    seed_record(&repo, "home", "hero", "fr", "Welcome to the visa hub").await;

    let report = controller.run_audit(false).await.unwrap();

    assert_eq!(report.flagged.len(), 1);
    assert!(report.retranslated.is_empty());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_runCleanup_shouldRemoveLegacySourceRecords() {
    let (controller, repo) = controller_with(&MockProvider::working());
    seed_record(&repo, "home", "hero", "fr", "Bienvenue").await;
    seed_legacy_source_record(&repo, "home", "hero");

    let report = controller.run_cleanup().await.unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.deleted.len(), 1);
    assert!(controller.show("home:hero:en").await.is_err());
    assert!(controller.show("home:hero:fr").await.is_ok());
}

#[tokio::test]
async fn test_testProvider_withFailingProvider_shouldFail() {
    let (controller, _repo) = controller_with(&MockProvider::failing());
    assert!(controller.test_provider().await.is_err());

    let (controller, _repo) = controller_with(&MockProvider::working());
    assert!(controller.test_provider().await.is_ok());
}
