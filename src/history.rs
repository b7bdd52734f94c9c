//! Calculation history.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::calculator::CalcResult;

/// Per-process counter that keeps ids distinct within one millisecond.
static NEXT_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// A single evaluated expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier for this entry.
    pub id: String,
    /// The expression as typed on the keypad.
    pub expression: String,
    /// The formatted result, or the error message for non-finite results.
    pub result: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

impl HistoryEntry {
    pub fn new(expression: impl Into<String>, result: impl Into<String>) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);

        Self {
            id: format!("{}-{}", timestamp, NEXT_SEQUENCE.fetch_add(1, Ordering::Relaxed)),
            expression: expression.into(),
            result: result.into(),
            timestamp,
        }
    }

    /// Create an entry from an evaluation result.
    pub fn from_calc_result(result: &CalcResult) -> Self {
        let text = result.plain().unwrap_or_else(|| result.display());
        Self::new(result.expression(), text)
    }
}

/// Newest-first list of entries with a fixed capacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct History {
    limit: usize,
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            entries: VecDeque::new(),
        }
    }

    /// Add an entry at the front, dropping the oldest past the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.limit);
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Default location of the history file.
    pub fn default_path() -> Option<PathBuf> {
        dirs::data_dir().map(|dir| dir.join("calcpad").join("history.json"))
    }

    /// Load entries from a JSON file, keeping at most `limit` of them.
    ///
    /// A missing file gives an empty history.
    pub fn load(path: &Path, limit: usize) -> anyhow::Result<Self> {
        use anyhow::Context;

        let mut history = Self::new(limit);
        if !path.exists() {
            return Ok(history);
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read history file {}", path.display()))?;
        let entries: Vec<HistoryEntry> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse history file {}", path.display()))?;

        history.entries = entries.into_iter().take(limit).collect();
        Ok(history)
    }

    /// Write entries to a JSON file, creating parent directories.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        use anyhow::Context;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let entries: Vec<&HistoryEntry> = self.entries.iter().collect();
        let json = serde_json::to_string_pretty(&entries)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write history file {}", path.display()))
    }
}
