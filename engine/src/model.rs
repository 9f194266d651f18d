//! Core data model for transfer runs.
//!
//! This module defines the main data structures for representing a transfer:
//! - TransferItem: one selected source file
//! - Batch: the ordered selection processed by one run
//! - Mode, ItemOutcome, Progress, RunSummary: run parameters and results

use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::debug;

use crate::error::EngineError;

/// A single selected source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferItem {
    source_path: PathBuf,
}

impl TransferItem {
    /// Create an item for `path`, which must name an existing regular file.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let path = path.into();
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() && path.file_name().is_some() => {
                Ok(TransferItem { source_path: path })
            }
            _ => Err(EngineError::NotAFile { path }),
        }
    }

    /// Full source path
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Candidate path for this file inside `dir`.
    pub fn destination_in(&self, dir: &Path) -> PathBuf {
        match self.source_path.file_name() {
            Some(name) => dir.join(name),
            None => dir.join(self.file_name()),
        }
    }

    /// Base name shown to the user.
    pub fn file_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source_path.display().to_string())
    }
}

/// The ordered selection for one run.
///
/// Items are processed front to back in selection order. Nothing is
/// reordered or deduplicated; the same file selected twice is visited twice.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    items: VecDeque<TransferItem>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` if it names an existing regular file.
    ///
    /// Anything else is silently left out; the return value tells whether
    /// the path was added.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> bool {
        match TransferItem::new(path) {
            Ok(item) => {
                self.items.push_back(item);
                true
            }
            Err(e) => {
                debug!(error = %e, "excluded from selection");
                false
            }
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransferItem> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub(crate) fn front(&self) -> Option<&TransferItem> {
        self.items.front()
    }

    pub(crate) fn pop_front(&mut self) -> Option<TransferItem> {
        self.items.pop_front()
    }
}

/// The operation mode for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Move files; the source is gone afterwards
    #[default]
    Move,
    /// Copy files; source remains unchanged
    Copy,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Move => write!(f, "Move"),
            Mode::Copy => write!(f, "Copy"),
        }
    }
}

impl Mode {
    /// Parse a mode name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "move" => Some(Mode::Move),
            "copy" => Some(Mode::Copy),
            _ => None,
        }
    }
}

/// What happened to one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// No collision; transferred under its own name
    Transferred { destination: PathBuf },
    /// Existing destination removed, then transferred
    Replaced { destination: PathBuf },
    /// Transferred under a uniquified name
    Renamed { destination: PathBuf },
    /// Left untouched at both ends
    Skipped,
}

impl ItemOutcome {
    pub fn destination(&self) -> Option<&Path> {
        match self {
            ItemOutcome::Transferred { destination }
            | ItemOutcome::Replaced { destination }
            | ItemOutcome::Renamed { destination } => Some(destination.as_path()),
            ItemOutcome::Skipped => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemOutcome::Transferred { .. } => "done",
            ItemOutcome::Replaced { .. } => "replaced",
            ItemOutcome::Renamed { .. } => "renamed",
            ItemOutcome::Skipped => "skipped",
        }
    }
}

/// Items processed out of the items present at run start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completion ratio in `[0, 1]`; zero for an empty total.
    pub fn ratio(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f32 / self.total as f32
        }
    }

    pub fn percent(&self) -> u32 {
        (self.ratio() * 100.0).round() as u32
    }
}

/// Counts for a run that drained its batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: Mode,
    pub destination: PathBuf,
    pub transferred: usize,
    pub replaced: usize,
    pub renamed: usize,
    pub skipped: usize,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl RunSummary {
    pub(crate) fn new(mode: Mode, destination: PathBuf) -> Self {
        let now = Local::now();
        RunSummary {
            mode,
            destination,
            transferred: 0,
            replaced: 0,
            renamed: 0,
            skipped: 0,
            started_at: now,
            finished_at: now,
        }
    }

    pub(crate) fn record(&mut self, outcome: &ItemOutcome) {
        match outcome {
            ItemOutcome::Transferred { .. } => self.transferred += 1,
            ItemOutcome::Replaced { .. } => self.replaced += 1,
            ItemOutcome::Renamed { .. } => self.renamed += 1,
            ItemOutcome::Skipped => self.skipped += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.transferred + self.replaced + self.renamed + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_keeps_selection_order_and_duplicates() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let a = temp_dir.path().join("a.txt");
        let b = temp_dir.path().join("b.txt");
        fs::write(&a, "a").expect("Failed to write a");
        fs::write(&b, "b").expect("Failed to write b");

        let mut batch = Batch::new();
        assert!(batch.add(&b));
        assert!(batch.add(&a));
        assert!(batch.add(&b));

        let names: Vec<_> = batch.iter().map(|i| i.file_name()).collect();
        assert_eq!(names, vec!["b.txt", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_batch_excludes_directories_and_missing_paths() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut batch = Batch::new();

        assert!(!batch.add(temp_dir.path()));
        assert!(!batch.add(temp_dir.path().join("missing.jpg")));
        assert!(batch.is_empty());
    }

    #[test]
    fn test_transfer_item_rejects_directory() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let result = TransferItem::new(temp_dir.path());
        assert!(matches!(result, Err(EngineError::NotAFile { .. })));
    }

    #[test]
    fn test_progress_ratio() {
        assert_eq!(Progress::default().ratio(), 0.0);
        let p = Progress { completed: 1, total: 4 };
        assert_eq!(p.ratio(), 0.25);
        assert_eq!(p.percent(), 25);
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!(Mode::parse("MOVE"), Some(Mode::Move));
        assert_eq!(Mode::parse("copy"), Some(Mode::Copy));
        assert_eq!(Mode::parse("sync"), None);
    }
}
