/*!
 * Progress and log reporting for bulk runs.
 *
 * The reporter owns the run state machine (`Idle → Running → Completed`),
 * the progress counter and the per-run log. The driver is its only writer;
 * anything else reads snapshots. User-visible notifications go through a
 * `Notifier`, so the same run can drive a terminal progress bar, plain
 * log output, or a collector in tests.
 */

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::database::models::now_timestamp;
use crate::errors::DriverError;

/// Lifecycle of a bulk run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum RunState {
    /// No run has started yet
    #[default]
    Idle,
    /// A run is iterating sections
    Running,
    /// The last run finished
    Completed,
}

/// Position of the driver in the language × page × section product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgressState {
    pub current: usize,
    pub total: usize,
    pub current_label: String,
}

/// Severity of a log entry or notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntryLevel {
    Info,
    Success,
    Error,
}

impl fmt::Display for EntryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryLevel::Info => write!(f, "info"),
            EntryLevel::Success => write!(f, "success"),
            EntryLevel::Error => write!(f, "error"),
        }
    }
}

/// One line of the run log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub message: String,
    pub level: EntryLevel,
    pub timestamp: String,
}

/// Receiver of user-visible notifications
pub trait Notifier: Send + Sync {
    /// A notification the user should see
    fn notify(&self, level: EntryLevel, message: &str);

    /// Progress changed
    fn progress(&self, _progress: &ProgressState) {}
}

/// Notifier that writes through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, level: EntryLevel, message: &str) {
        match level {
            EntryLevel::Error => error!("{}", message),
            _ => info!("{}", message),
        }
    }
}

/// Terminal notifier drawing an indicatif progress bar
pub struct ConsoleNotifier {
    bar: ProgressBar,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style.progress_chars("█▓▒░"));
        Self { bar }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: EntryLevel, message: &str) {
        match level {
            EntryLevel::Error => self.bar.println(format!("❌ {}", message)),
            EntryLevel::Success => self.bar.println(format!("✅ {}", message)),
            EntryLevel::Info => self.bar.println(message),
        }
    }

    fn progress(&self, progress: &ProgressState) {
        if progress.total == 0 {
            self.bar.finish_and_clear();
            return;
        }
        self.bar.set_length(progress.total as u64);
        self.bar.set_position(progress.current as u64);
        self.bar.set_message(progress.current_label.clone());
    }
}

/// Notifier that keeps everything, for assertions
#[derive(Default)]
pub struct CollectingNotifier {
    notifications: Mutex<Vec<(EntryLevel, String)>>,
    progress: Mutex<Vec<ProgressState>>,
}

impl CollectingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications received so far
    pub fn notifications(&self) -> Vec<(EntryLevel, String)> {
        self.notifications.lock().clone()
    }

    /// Every progress snapshot received, in order
    pub fn progress_history(&self) -> Vec<ProgressState> {
        self.progress.lock().clone()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, level: EntryLevel, message: &str) {
        self.notifications.lock().push((level, message.to_string()));
    }

    fn progress(&self, progress: &ProgressState) {
        self.progress.lock().push(progress.clone());
    }
}

#[derive(Debug, Default)]
struct ReporterState {
    run_state: RunState,
    progress: ProgressState,
    entries: Vec<LogEntry>,
}

/// Shared progress, log and run-state holder
pub struct Reporter {
    state: RwLock<ReporterState>,
    notifier: Arc<dyn Notifier>,
}

impl Reporter {
    /// Reporter that notifies through the `log` facade
    pub fn new() -> Self {
        Self::with_notifier(Arc::new(LogNotifier))
    }

    pub fn with_notifier(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            state: RwLock::new(ReporterState::default()),
            notifier,
        }
    }

    /// Move to `Running`, clearing the log and sizing the progress counter
    pub fn begin_run(&self, total: usize) -> Result<(), DriverError> {
        let progress = {
            let mut state = self.state.write();
            if state.run_state == RunState::Running {
                return Err(DriverError::AlreadyRunning);
            }
            state.run_state = RunState::Running;
            state.entries.clear();
            state.progress = ProgressState {
                current: 0,
                total,
                current_label: String::new(),
            };
            state.progress.clone()
        };

        self.notifier.progress(&progress);
        Ok(())
    }

    /// Back to `Idle` when a run could not start after `begin_run`
    pub fn abandon_run(&self) {
        let mut state = self.state.write();
        state.run_state = RunState::Idle;
        state.progress = ProgressState::default();
    }

    /// Mark the section currently being worked on
    pub fn set_current(&self, label: &str) {
        self.state.write().progress.current_label = label.to_string();
    }

    /// Count one more processed section
    pub fn advance(&self) {
        let progress = {
            let mut state = self.state.write();
            state.progress.current += 1;
            state.progress.clone()
        };
        self.notifier.progress(&progress);
    }

    /// Append a log entry
    pub fn log(&self, level: EntryLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            EntryLevel::Info => debug!("{}", message),
            EntryLevel::Success => info!("{}", message),
            EntryLevel::Error => error!("{}", message),
        }

        self.state.write().entries.push(LogEntry {
            message,
            level,
            timestamp: now_timestamp(),
        });
    }

    /// Forward a notification to the user
    pub fn notify(&self, level: EntryLevel, message: &str) {
        self.notifier.notify(level, message);
    }

    /// Reset progress to zero and move to `Completed`
    pub fn finish_run(&self) {
        let progress = {
            let mut state = self.state.write();
            state.run_state = RunState::Completed;
            state.progress = ProgressState::default();
            state.progress.clone()
        };
        self.notifier.progress(&progress);
    }

    pub fn run_state(&self) -> RunState {
        self.state.read().run_state
    }

    pub fn progress(&self) -> ProgressState {
        self.state.read().progress.clone()
    }

    /// Snapshot of the current run's log
    pub fn entries(&self) -> Vec<LogEntry> {
        self.state.read().entries.clone()
    }

    /// Entries with the given level
    pub fn entries_with_level(&self, level: EntryLevel) -> Vec<LogEntry> {
        self.state
            .read()
            .entries
            .iter()
            .filter(|entry| entry.level == level)
            .cloned()
            .collect()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
