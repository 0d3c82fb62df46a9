use anyhow::{anyhow, Context, Result};
use log::{info, warn};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::Config;
use crate::catalog::{Catalog, ContentBlock};
use crate::database::{DatabaseConnection, Repository, StoreStats, TranslationRecord, TranslationStore};
use crate::errors::StoreError;
use crate::providers::{create_provider, Provider};
use crate::translation::cache::{CacheStats, RecordCache};
use crate::translation::driver::{request_translation, BulkTranslationDriver, RunSummary};
use crate::translation::quality::flag_english_records;
use crate::translation::reporter::{Notifier, Reporter};
use crate::translation::{run_integrity_sweep, SweepReport, Throttle, TranslationKey, TranslationLookup};

// @module: Application controller for the translation back-office

/// Records flagged by the English heuristic, and what became of them
#[derive(Debug, Default, Clone)]
pub struct AuditReport {
    /// Records inspected
    pub scanned: usize,
    /// Keys of records whose translation still looks English
    pub flagged: Vec<String>,
    /// Keys successfully retranslated
    pub retranslated: Vec<String>,
    /// Keys whose retranslation failed, with the reason
    pub failed: Vec<(String, String)>,
}

/// Store, cache and file figures
#[derive(Debug, Clone)]
pub struct ControllerStats {
    pub store: StoreStats,
    pub cache: CacheStats,
    pub database_size_bytes: u64,
}

impl fmt::Display for ControllerStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Cache hits: {}, Cache misses: {}, Size: {} KB",
            self.store,
            self.cache.hits,
            self.cache.misses,
            self.database_size_bytes / 1024
        )
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    repository: Repository,
    store: Arc<dyn TranslationStore>,
    provider: Arc<dyn Provider>,
    throttle: Arc<Throttle>,
    reporter: Arc<Reporter>,
    cache: RecordCache,
    catalog: Catalog,
}

impl Controller {
    // @method: Create a controller from configuration, opening the store and provider
    pub fn with_config(config: Config) -> Result<Self> {
        let db = match &config.storage.database_path {
            Some(path) => DatabaseConnection::new(path)?,
            None => DatabaseConnection::new_default()?,
        };

        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin(),
        };

        let provider = create_provider(&config.translation);
        Ok(Self::with_components(config, Repository::new(db), provider, catalog))
    }

    /// Assemble a controller from ready-made parts
    pub fn with_components(
        config: Config,
        repository: Repository,
        provider: Arc<dyn Provider>,
        catalog: Catalog,
    ) -> Self {
        let repository = repository.with_source_language(config.source_language.clone());
        let throttle = Arc::new(Throttle::from_config(&config.translation.common.throttle));

        Self {
            store: Arc::new(repository.clone()),
            repository,
            provider,
            throttle,
            reporter: Arc::new(Reporter::new()),
            cache: RecordCache::new(),
            catalog,
            config,
        }
    }

    /// Route run notifications to `notifier`
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.reporter = Arc::new(Reporter::with_notifier(notifier));
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

    pub fn cache(&self) -> &RecordCache {
        &self.cache
    }

    /// Regenerate every missing translation of the catalog
    pub async fn run_bulk_translation(&self) -> Result<RunSummary> {
        let start_time = std::time::Instant::now();

        let driver = BulkTranslationDriver::new(
            self.store.clone(),
            self.provider.clone(),
            self.config.source_language.clone(),
        )
        .with_throttle(self.throttle.clone())
        .with_reporter(self.reporter.clone())
        .with_cache(self.cache.clone())
        .with_lease_ttl(Duration::from_secs(self.config.storage.lease_ttl_secs));

        info!(
            "Translating {} sections into {} languages with {}",
            self.catalog.section_count(),
            self.config.target_languages().len(),
            self.provider.name()
        );

        let summary = driver
            .run(&self.catalog, &self.config.languages)
            .await
            .context("Bulk translation could not start")?;

        info!(
            "Bulk translation took {}",
            Self::format_duration(start_time.elapsed())
        );
        Ok(summary)
    }

    /// Remove records that target the source language
    pub async fn run_cleanup(&self) -> Result<SweepReport> {
        let report = run_integrity_sweep(self.store.as_ref(), &self.config.source_language)
            .await
            .context("Integrity sweep failed")?;

        if !report.deleted.is_empty() {
            self.cache.invalidate();
        }
        info!(
            "Integrity sweep: scanned {}, deleted {}, failed {}",
            report.scanned,
            report.deleted.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Flag records that still look English, optionally retranslating them
    pub async fn run_audit(&self, retranslate: bool) -> Result<AuditReport> {
        let records = self.store.list_records().await?;
        let flagged: Vec<TranslationRecord> = flag_english_records(&records)
            .into_iter()
            .cloned()
            .collect();

        let mut report = AuditReport {
            scanned: records.len(),
            flagged: flagged.iter().map(|r| r.translation_key.clone()).collect(),
            ..Default::default()
        };

        if !retranslate {
            return Ok(report);
        }

        for record in &flagged {
            match self.retranslate_record(record).await {
                Ok(()) => report.retranslated.push(record.translation_key.clone()),
                Err(e) => {
                    warn!("Retranslation of {} failed: {:#}", record.translation_key, e);
                    report
                        .failed
                        .push((record.translation_key.clone(), format!("{:#}", e)));
                }
            }
        }

        Ok(report)
    }

    async fn retranslate_record(&self, record: &TranslationRecord) -> Result<()> {
        let language_name = self.config.language_display_name(&record.target_language);
        let translated = request_translation(
            self.provider.as_ref(),
            &self.throttle,
            &record.page_name,
            &record.section_context,
            &language_name,
            &record.content_block,
        )
        .await?;

        self.store
            .update_translated_content(record.id, &translated)
            .await?;
        self.cache.remove(&record.translation_key);
        info!("Retranslated {}", record.translation_key);
        Ok(())
    }

    /// Stored record for a `page:section:language` key
    pub async fn show(&self, key: &str) -> Result<TranslationRecord> {
        let key = TranslationKey::parse(key)?;
        self.store
            .find_by_key(&key.to_string())
            .await?
            .ok_or_else(|| StoreError::NotFound(key.to_string()).into())
    }

    /// Serve a translation through the read cache, counting the use
    pub async fn lookup(
        &self,
        page_name: &str,
        section_context: &str,
        target_language: &str,
    ) -> Result<Option<ContentBlock>> {
        let lookup = TranslationLookup::new(self.store.clone(), self.cache.clone());
        Ok(lookup.get(page_name, section_context, target_language).await?)
    }

    /// Replace a record's translation with hand-written JSON
    ///
    /// The input is validated before the store is touched.
    pub async fn edit_translation(&self, key: &str, json_text: &str) -> Result<TranslationRecord> {
        let key = TranslationKey::parse(key)?;
        let content = ContentBlock::from_json_str(json_text)?;

        let record = self
            .store
            .find_by_key(&key.to_string())
            .await?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        if !record.content_block.mirrors(&content) {
            warn!("Edited content for {} does not mirror the source structure", key);
        }

        let updated = self
            .store
            .update_translated_content(record.id, &content)
            .await?;
        self.cache.remove(&updated.translation_key);

        info!("Updated translation {}", key);
        Ok(updated)
    }

    /// Write `<language>.json` (page → section → content) for every target language
    pub async fn export(&self, output_dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create export directory: {:?}", output_dir))?;

        let records = self.store.list_records().await?;
        let mut by_language: BTreeMap<String, Map<String, Value>> = BTreeMap::new();
        for language in self.config.target_languages() {
            by_language.insert(language.code, Map::new());
        }

        for record in records {
            let pages = by_language.entry(record.target_language.clone()).or_default();
            let sections = pages
                .entry(record.page_name.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(sections) = sections {
                sections.insert(record.section_context, record.translated_content.into());
            }
        }

        let mut written = Vec::with_capacity(by_language.len());
        for (language, pages) in by_language {
            let path = output_dir.join(format!("{}.json", language));
            let json = serde_json::to_string_pretty(&Value::Object(pages))
                .context("Failed to serialize export")?;
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write export file: {:?}", path))?;
            written.push(path);
        }

        info!("Exported {} language files to {:?}", written.len(), output_dir);
        Ok(written)
    }

    pub async fn stats(&self) -> Result<ControllerStats> {
        let store = self.store.stats().await?;
        let path = self.repository.connection().path();
        let database_size_bytes = if path.to_string_lossy() != ":memory:" {
            std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        Ok(ControllerStats {
            store,
            cache: self.cache.stats(),
            database_size_bytes,
        })
    }

    /// Check that the configured provider answers
    pub async fn test_provider(&self) -> Result<()> {
        self.provider
            .test_connection()
            .await
            .map_err(|e| anyhow!("{} provider is not reachable: {}", self.provider.name(), e))
    }

    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
