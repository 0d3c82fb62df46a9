/*!
 * Integrity sweep and English audit against a seeded store
 */

use nexus_translator::database::TranslationStore;
use nexus_translator::errors::StoreError;
use nexus_translator::translation::quality::flag_english_records;
use nexus_translator::translation::reporter::EntryLevel;
use nexus_translator::translation::run_integrity_sweep;

use crate::common::{memory_repository, seed_legacy_source_record, seed_record};

#[tokio::test]
async fn test_integritySweep_shouldDeleteOnlySourceLanguageRecords() {
    let repo = memory_repository();
    let fr = seed_record(&repo, "home", "hero", "fr", "Bienvenue").await;
    let th = seed_record(&repo, "home", "hero", "th", "ยินดีต้อนรับ").await;
    seed_legacy_source_record(&repo, "home", "hero");
    seed_legacy_source_record(&repo, "dtv_visa", "overview");

    let report = run_integrity_sweep(&repo, "en").await.unwrap();

    assert_eq!(report.scanned, 4);
    assert_eq!(report.deleted.len(), 2);
    assert!(report.failed.is_empty());
    assert_eq!(report.entries.len(), 2);
    assert!(report.entries.iter().all(|e| e.level == EntryLevel::Success));

    let remaining: Vec<i64> = repo.list_records().await.unwrap().iter().map(|r| r.id).collect();
    assert_eq!(remaining, vec![fr, th]);
}

#[tokio::test]
async fn test_integritySweep_runTwice_shouldDeleteNothingSecondTime() {
    let repo = memory_repository();
    seed_record(&repo, "home", "hero", "fr", "Bienvenue").await;
    seed_legacy_source_record(&repo, "home", "hero");

    let first = run_integrity_sweep(&repo, "en").await.unwrap();
    let second = run_integrity_sweep(&repo, "en").await.unwrap();

    assert_eq!(first.deleted.len(), 1);
    assert_eq!(second.scanned, 1);
    assert!(second.deleted.is_empty());
    assert!(second.entries.is_empty());
}

#[tokio::test]
async fn test_integritySweep_withUppercaseSourceCode_shouldMatchNormalizedCode() {
    let repo = memory_repository();
    seed_legacy_source_record(&repo, "home", "hero");

    let report = run_integrity_sweep(&repo, "EN").await.unwrap();

    assert_eq!(report.deleted.len(), 1);
    assert!(repo.list_records().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleteRecord_twice_shouldReturnNotFoundSecondTime() {
    let repo = memory_repository();
    let id = seed_record(&repo, "home", "hero", "fr", "Bienvenue").await;

    repo.delete_record(id).await.unwrap();
    let err = repo.delete_record(id).await.unwrap_err();

    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn test_flagEnglishRecords_shouldReturnOnlyEnglishLookingTranslations() {
    let repo = memory_repository();
    seed_record(&repo, "home", "hero", "fr", "Bienvenue en Thaïlande").await;
    seed_record(&repo, "home", "hero", "de", "Welcome to the Land of Smiles").await;
    seed_record(&repo, "home", "hero", "th", "ยินดีต้อนรับสู่ประเทศไทย").await;

    let records = repo.list_records().await.unwrap();
    let flagged: Vec<&str> = flag_english_records(&records)
        .iter()
        .map(|r| r.translation_key.as_str())
        .collect();

    assert_eq!(flagged, vec!["home:hero:de"]);
}

#[tokio::test]
async fn test_integritySweep_withUndecodableSourceRow_shouldStillDeleteIt() {
    let repo = memory_repository();
    let fr = seed_record(&repo, "home", "hero", "fr", "Bienvenue").await;
    repo.connection()
        .execute(|conn| {
            conn.execute(
                "INSERT INTO translation_records (page_name, section_context, target_language,
                 content_block, translated_content, translation_key, usage_count, created_at, updated_at)
                 VALUES ('home', 'hero', 'en', 'not json', 'not json', 'home:hero:en', 0,
                 '2024-01-01T00:00:00.000Z', '2024-01-01T00:00:00.000Z')",
                [],
            )?;
            Ok(())
        })
        .unwrap();

    let report = run_integrity_sweep(&repo, "en").await.unwrap();

    assert_eq!(report.scanned, 2);
    assert_eq!(report.deleted.len(), 1);
    assert!(report.failed.is_empty());
    let keys: Vec<i64> = repo.list_keys().await.unwrap().into_iter().map(|k| k.id).collect();
    assert_eq!(keys, vec![fr]);
}
