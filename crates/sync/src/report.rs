//! Batch reporting: what was installed, what was synced, what failed.

use crate::common::InstallResult;
use crate::error::HubError;

/// One recorded failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEntry {
    /// Which step failed (e.g., "Failed to sync demo to Codex")
    pub title: String,
    /// Human-readable cause
    pub message: String,
    /// Classified cause; typed payloads such as the occupied path live here
    pub error: HubError,
}

impl ReportEntry {
    pub fn sync_failed(skill: &str, tool_label: &str, error: HubError) -> Self {
        Self::new(format!("Failed to sync {skill} to {tool_label}"), error)
    }

    pub fn install_failed(name: &str, error: HubError) -> Self {
        Self::new(format!("Failed to install {name}"), error)
    }

    pub fn import_failed(name: &str, error: HubError) -> Self {
        Self::new(format!("Failed to import {name}"), error)
    }

    pub fn unsynced(name: &str, error: HubError) -> Self {
        Self::new(format!("{name} was not synced to any tool"), error)
    }

    pub fn refresh_failed(what: &str, error: HubError) -> Self {
        Self::new(format!("Failed to refresh {what}"), error)
    }

    fn new(title: String, error: HubError) -> Self {
        Self {
            title,
            message: error.to_string(),
            error,
        }
    }
}

/// Collects failures in encounter order. Nothing is dropped or reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorAggregator {
    entries: Vec<ReportEntry>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ReportEntry) {
        tracing::debug!(title = %entry.title, message = %entry.message, "Recorded batch error");
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First failure, verbatim.
    pub fn head(&self) -> Option<&ReportEntry> {
        self.entries.first()
    }

    /// Failures beyond the head (`total - 1`, or 0 when empty).
    pub fn more_count(&self) -> usize {
        self.entries.len().saturating_sub(1)
    }
}

/// Outcome of one orchestrated batch.
///
/// An empty error list means every attempted step succeeded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Skills installed or imported, in order
    pub installed: Vec<InstallResult>,
    /// Successful (skill, tool) sync steps
    pub synced: usize,
    pub errors: ErrorAggregator,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Head failure as title and message on separate lines, plus the
    /// overflow count.
    pub fn error_summary(&self) -> Option<String> {
        let head = self.errors.head()?;
        let more = self.errors.more_count();
        let mut out = format!("{}\n{}", head.title, head.message);
        if more > 0 {
            out.push_str(&format!(" (+{} more)", more));
        }
        Some(out)
    }

    /// Generates a formatted summary for display.
    pub fn format_summary(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("  Installed: {}\n", self.installed.len()));
        out.push_str(&format!("  Synced:    {}\n", self.synced));
        out.push_str(&format!("  Failed:    {}\n", self.errors.len()));
        out
    }
}
