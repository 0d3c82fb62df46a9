/*!
 * Tests for configuration loading and saving
 */

use nexus_translator::app_config::{Config, LanguageEntry, TranslationProvider};
use tempfile::tempdir;

#[test]
fn test_save_thenFromFile_shouldPreserveSettings() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("conf.json");

    let mut config = Config::default();
    config.translation.provider = TranslationProvider::Anthropic;
    config.storage.database_path = Some("/tmp/nexus.db".to_string());
    config.storage.lease_ttl_secs = 90;
    config.translation.common.throttle.refill_interval_ms = 1000;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    assert_eq!(loaded.translation.provider, TranslationProvider::Anthropic);
    assert_eq!(loaded.storage.database_path.as_deref(), Some("/tmp/nexus.db"));
    assert_eq!(loaded.storage.lease_ttl_secs, 90);
    assert_eq!(loaded.translation.common.throttle.refill_interval_ms, 1000);
    assert_eq!(loaded.languages, config.languages);
}

#[test]
fn test_fromFile_withInvalidJson_shouldFail() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("conf.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_targetLanguages_withRegionalVariant_shouldKeepItAsTarget() {
    let mut config = Config::default();
    config.source_language = "en".to_string();
    config.languages = vec![
        LanguageEntry::new("en", "English"),
        LanguageEntry::new("en-GB", "British English"),
        LanguageEntry::new("th", "Thai"),
    ];

    let codes: Vec<String> = config.target_languages().into_iter().map(|l| l.code).collect();
    assert_eq!(codes, vec!["en-GB", "th"]);
}

#[test]
fn test_languageDisplayName_shouldPreferTableThenIsoName() {
    let mut config = Config::default();
    config.languages = vec![
        LanguageEntry::new("en", "English"),
        LanguageEntry::new("zh", "Chinese (Simplified)"),
    ];

    assert_eq!(config.language_display_name("zh"), "Chinese (Simplified)");
    assert_eq!(config.language_display_name("de"), "German");
    assert_eq!(config.language_display_name("xx-unknown"), "xx-unknown");
}

#[test]
fn test_validate_withLmStudioAndNoKey_shouldPass() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::LMStudio;
    assert!(config.validate().is_ok());
}

#[test]
fn test_getEndpoint_withEmptyEntry_shouldFallBackToProviderDefault() {
    let mut config = Config::default();
    config.translation.provider = TranslationProvider::OpenAI;
    if let Some(provider) = config.translation.get_active_provider_config_mut() {
        provider.endpoint = String::new();
    }

    assert_eq!(config.translation.get_endpoint(), "https://api.openai.com/v1");
}
