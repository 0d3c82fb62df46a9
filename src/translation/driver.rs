/*!
 * Bulk translation driver.
 *
 * Walks languages × pages × sections, skips units already in the store,
 * asks the provider for the rest and records every outcome. A failing
 * section is logged and the walk continues; the run itself only fails
 * when it cannot start.
 */

use log::{info, warn};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::app_config::LanguageEntry;
use crate::catalog::{Catalog, ContentBlock};
use crate::database::{LeaseOutcome, NewTranslationRecord, TranslationStore};
use crate::errors::{DriverError, ProviderError, TranslationError};
use crate::language_utils::language_codes_match;
use crate::providers::{CompletionRequest, Provider};
use crate::translation::cache::RecordCache;
use crate::translation::key::{compute_key, TranslationKey};
use crate::translation::prompts::{build_translation_prompt, translation_output_schema};
use crate::translation::reporter::{EntryLevel, Reporter};
use crate::translation::throttle::Throttle;

/// Default lifetime of the bulk-run lease
pub const DEFAULT_LEASE_TTL: Duration = Duration::from_secs(3600);

/// What happened to a section that did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionStatus {
    /// A new record was written under this key
    Translated(String),
    /// The key was already in the store
    Skipped(String),
}

impl SectionStatus {
    pub fn key(&self) -> &str {
        match self {
            SectionStatus::Translated(key) | SectionStatus::Skipped(key) => key,
        }
    }
}

/// A section that could not be translated or stored
#[derive(Debug, Error)]
#[error("{key}: {source}")]
pub struct SectionError {
    pub key: String,
    pub source: TranslationError,
}

/// Outcome of one section
pub type SectionResult = Result<SectionStatus, SectionError>;

/// Counts and per-section outcomes of a finished run
#[derive(Debug, Default)]
pub struct RunSummary {
    pub total: usize,
    pub translated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub outcomes: Vec<SectionResult>,
}

impl RunSummary {
    /// Fold per-section outcomes into counts
    pub fn from_outcomes(total: usize, outcomes: Vec<SectionResult>) -> Self {
        let (translated, skipped, failed) =
            outcomes
                .iter()
                .fold((0, 0, 0), |(t, s, f), outcome| match outcome {
                    Ok(SectionStatus::Translated(_)) => (t + 1, s, f),
                    Ok(SectionStatus::Skipped(_)) => (t, s + 1, f),
                    Err(_) => (t, s, f + 1),
                });

        Self {
            total,
            translated,
            skipped,
            failed,
            outcomes,
        }
    }

    /// Number of sections the run went through
    pub fn processed(&self) -> usize {
        self.outcomes.len()
    }

    pub fn errors(&self) -> impl Iterator<Item = &SectionError> {
        self.outcomes.iter().filter_map(|outcome| outcome.as_ref().err())
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} sections: {} translated, {} skipped, {} failed",
            self.total, self.translated, self.skipped, self.failed
        )
    }
}

/// Ask the provider to translate one content block, waiting on the throttle first
pub async fn request_translation(
    provider: &dyn Provider,
    throttle: &Throttle,
    page_name: &str,
    section_context: &str,
    language_name: &str,
    content: &ContentBlock,
) -> Result<ContentBlock, ProviderError> {
    throttle.acquire().await;

    let request = CompletionRequest {
        prompt: build_translation_prompt(page_name, section_context, language_name, content),
        response_json_schema: translation_output_schema(),
    };
    let response = provider.complete(request).await?;

    if !content.mirrors(&response.translated_content) {
        warn!(
            "Translation of {}/{} ({}) does not mirror the source structure",
            page_name, section_context, language_name
        );
    }

    Ok(response.translated_content)
}

/// Regenerates missing translations for a catalog
pub struct BulkTranslationDriver {
    store: Arc<dyn TranslationStore>,
    provider: Arc<dyn Provider>,
    throttle: Arc<Throttle>,
    reporter: Arc<Reporter>,
    cache: RecordCache,
    source_language: String,
    lease_ttl: Duration,
    holder: String,
}

impl BulkTranslationDriver {
    pub fn new(
        store: Arc<dyn TranslationStore>,
        provider: Arc<dyn Provider>,
        source_language: impl Into<String>,
    ) -> Self {
        Self {
            store,
            provider,
            throttle: Arc::new(Throttle::default()),
            reporter: Arc::new(Reporter::new()),
            cache: RecordCache::new(),
            source_language: source_language.into(),
            lease_ttl: DEFAULT_LEASE_TTL,
            holder: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn with_throttle(mut self, throttle: Arc<Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn with_reporter(mut self, reporter: Arc<Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Read cache to invalidate when a run ends
    pub fn with_cache(mut self, cache: RecordCache) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_lease_ttl(mut self, lease_ttl: Duration) -> Self {
        self.lease_ttl = lease_ttl;
        self
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

    /// Lease holder id used by this driver
    pub fn holder(&self) -> &str {
        &self.holder
    }

    /// Translate every missing (language, page, section) unit
    pub async fn run(
        &self,
        catalog: &Catalog,
        languages: &[LanguageEntry],
    ) -> Result<RunSummary, DriverError> {
        let targets: Vec<&LanguageEntry> = languages
            .iter()
            .filter(|language| !self.is_source_language(&language.code))
            .collect();
        let total = targets.len() * catalog.section_count();

        self.reporter.begin_run(total)?;

        if let Err(e) = self.acquire_lease().await {
            self.reporter.abandon_run();
            return Err(e);
        }

        let existing = match self.store.list_keys().await {
            Ok(keys) => keys
                .into_iter()
                .map(|key| key.translation_key)
                .collect::<HashSet<_>>(),
            Err(e) => {
                self.reporter.abandon_run();
                self.release_lease().await;
                return Err(DriverError::Store(e));
            }
        };

        info!(
            "Starting bulk translation: {} languages, {} sections, {} already stored",
            targets.len(),
            catalog.section_count(),
            existing.len()
        );

        let mut outcomes = Vec::with_capacity(total);
        for language in &targets {
            for page in catalog.pages() {
                for section in &page.sections {
                    self.reporter.set_current(&format!(
                        "{}/{} ({})",
                        page.name, section.name, language.code
                    ));

                    let outcome = self
                        .process_section(&existing, language, &page.name, &section.name, &section.content)
                        .await;
                    outcomes.push(outcome);

                    self.reporter.advance();
                }
            }
        }

        self.cache.invalidate();

        let summary = RunSummary::from_outcomes(total, outcomes);
        info!("Bulk translation finished: {}", summary);
        self.reporter.notify(
            EntryLevel::Success,
            &format!("Bulk translation finished: {}", summary),
        );
        self.reporter.finish_run();
        self.release_lease().await;

        Ok(summary)
    }

    async fn process_section(
        &self,
        existing: &HashSet<String>,
        language: &LanguageEntry,
        page_name: &str,
        section_context: &str,
        content: &ContentBlock,
    ) -> SectionResult {
        let key = match TranslationKey::new(page_name, section_context, &language.code) {
            Ok(key) => key.to_string(),
            Err(e) => {
                let key = compute_key(page_name, section_context, &language.code);
                return Err(self.section_failed(key, e.into()));
            }
        };

        if existing.contains(&key) {
            self.reporter
                .log(EntryLevel::Info, format!("{} skipping, already translated", key));
            return Ok(SectionStatus::Skipped(key));
        }

        match self
            .translate_and_store(language, page_name, section_context, content)
            .await
        {
            Ok(()) => {
                self.reporter
                    .log(EntryLevel::Success, format!("{} translated", key));
                Ok(SectionStatus::Translated(key))
            }
            Err(e) => Err(self.section_failed(key, e)),
        }
    }

    fn section_failed(&self, key: String, source: TranslationError) -> SectionError {
        let message = format!("{} failed: {}", key, source);
        self.reporter.log(EntryLevel::Error, message.clone());
        self.reporter.notify(EntryLevel::Error, &message);
        SectionError { key, source }
    }

    async fn translate_and_store(
        &self,
        language: &LanguageEntry,
        page_name: &str,
        section_context: &str,
        content: &ContentBlock,
    ) -> Result<(), TranslationError> {
        let translated = request_translation(
            self.provider.as_ref(),
            &self.throttle,
            page_name,
            section_context,
            &language.name,
            content,
        )
        .await?;

        self.store
            .create_record(NewTranslationRecord::new(
                page_name,
                section_context,
                &language.code,
                content.clone(),
                translated,
            ))
            .await?;

        Ok(())
    }

    fn is_source_language(&self, code: &str) -> bool {
        code == self.source_language || language_codes_match(code, &self.source_language)
    }

    async fn acquire_lease(&self) -> Result<(), DriverError> {
        match self.store.acquire_lease(&self.holder, self.lease_ttl).await? {
            LeaseOutcome::Acquired(_) => Ok(()),
            LeaseOutcome::Held(lease) => Err(DriverError::LeaseHeld {
                holder: lease.holder,
                expires_at: lease.expires_at,
            }),
        }
    }

    async fn release_lease(&self) {
        if let Err(e) = self.store.release_lease(&self.holder).await {
            warn!("Failed to release bulk run lease: {}", e);
        }
    }
}
