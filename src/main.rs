// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use nexus_translator::app_config::{self, Config, ProviderConfig, TranslationProvider};
use nexus_translator::app_controller::Controller;
use nexus_translator::translation::reporter::ConsoleNotifier;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    OpenAI,
    Anthropic,
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate every missing (language, page, section) unit
    Translate,

    /// Delete records whose target language is the source language
    Cleanup,

    /// List records whose translation still looks English
    Audit {
        /// Send flagged records back to the provider
        #[arg(long)]
        retranslate: bool,
    },

    /// Print a stored translation
    Show {
        /// Translation key, `page:section:language`
        key: String,
    },

    /// Replace a stored translation with the JSON object in a file
    Edit {
        /// Translation key, `page:section:language`
        key: String,

        /// JSON file holding the new translated content
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Write one `<language>.json` per target language
    Export {
        /// Output directory
        #[arg(short, long, default_value = "translations")]
        output: PathBuf,
    },

    /// Show store statistics
    Stats,

    /// Check that the configured provider answers
    TestProvider,

    /// Generate shell completions for nexus-translator
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Nexus Translator - translation back-office for the Thai Nexus Visa Hub
///
/// Translates the site's content catalog into every supported language
/// through an AI provider and keeps the translation store healthy.
#[derive(Parser, Debug)]
#[command(name = "nexus-translator")]
#[command(version)]
#[command(about = "Translation cache and bulk regeneration for the Thai Nexus Visa Hub")]
#[command(long_about = "Translates the Thai Nexus Visa Hub content catalog with AI providers and
maintains the SQLite translation store.

EXAMPLES:
    nexus-translator translate                        # Fill in missing translations
    nexus-translator -p anthropic translate           # Use a specific provider
    nexus-translator cleanup                          # Remove source-language records
    nexus-translator audit --retranslate              # Retranslate records that look English
    nexus-translator show home:hero:fr                # Print one translation
    nexus-translator edit home:hero:fr -f hero.json   # Replace one translation by hand
    nexus-translator export -o public/i18n            # Write per-language JSON files
    nexus-translator completions bash > nexus.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key)
    anthropic - Anthropic Claude API (requires API key)
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Database file, overriding the configuration
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Translation provider to use
    #[arg(short, long, global = true, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// API key for the selected provider
    #[arg(long, global = true, env = "NEXUS_TRANSLATOR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji and ANSI color for a level
    fn decoration(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("❌ ", "1;31"),
            Level::Warn => ("🚧 ", "1;33"),
            Level::Info => (" ", "1;32"),
            Level::Debug => ("🔍 ", "1;36"),
            Level::Trace => ("📋 ", "1;35"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("nexus_translator")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (emoji, color) = Self::decoration(record.level());

            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() {
    // Level is adjusted once the config is loaded
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: CommandLineOptions) -> Result<()> {
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "nexus-translator", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config = load_config(&cli)?;
    config.validate().context("Configuration validation failed")?;

    if cli.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;

    match cli.command {
        Commands::Translate => {
            let controller = controller.with_notifier(Arc::new(ConsoleNotifier::new()));
            let summary = controller.run_bulk_translation().await?;
            for failure in summary.errors() {
                warn!("Failed: {}", failure);
            }
            info!("{}", summary);
        }
        Commands::Cleanup => {
            let report = controller.run_cleanup().await?;
            for entry in &report.entries {
                info!("{}", entry.message);
            }
            info!(
                "Deleted {} of {} records ({} failures)",
                report.deleted.len(),
                report.scanned,
                report.failed.len()
            );
        }
        Commands::Audit { retranslate } => {
            let report = controller.run_audit(retranslate).await?;
            for key in &report.flagged {
                println!("{}", key);
            }
            info!(
                "{} of {} records look English",
                report.flagged.len(),
                report.scanned
            );
            if retranslate {
                info!(
                    "Retranslated {}, failed {}",
                    report.retranslated.len(),
                    report.failed.len()
                );
            }
        }
        Commands::Show { key } => {
            let record = controller.show(&key).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Commands::Edit { key, file } => {
            let json_text = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read edit file: {:?}", file))?;
            let record = controller.edit_translation(&key, &json_text).await?;
            info!("Saved {} (updated {})", record.translation_key, record.updated_at);
        }
        Commands::Export { output } => {
            for path in controller.export(&output).await? {
                println!("{}", path.display());
            }
        }
        Commands::Stats => {
            println!("{}", controller.stats().await?);
        }
        Commands::TestProvider => {
            controller.test_provider().await?;
            info!("Provider is reachable");
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

/// Load the config file (writing a default one when missing) and apply CLI overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    let config_path = Path::new(&cli.config);

    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", cli.config);
        let config = Config::default();
        config.save(config_path)?;
        config
    };

    if let Some(provider) = &cli.provider {
        config.translation.provider = provider.clone().into();
    }

    if config.translation.get_active_provider_config().is_none() {
        let provider = config.translation.provider.clone();
        config.translation.available_providers.push(ProviderConfig::new(provider));
    }

    if let Some(model) = &cli.model {
        if let Some(provider_config) = config.translation.get_active_provider_config_mut() {
            provider_config.model = model.clone();
        }
    }

    if let Some(api_key) = &cli.api_key {
        if let Some(provider_config) = config.translation.get_active_provider_config_mut() {
            provider_config.api_key = api_key.clone();
        }
    }

    if let Some(database) = &cli.database {
        config.storage.database_path = Some(database.to_string_lossy().to_string());
    }

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }

    Ok(config)
}
