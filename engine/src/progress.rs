//! Progress reporting.
//!
//! `ProgressCallback` decouples the engine from whatever displays a run
//! (terminal, window). `ChannelProgress` is the implementation used when the
//! run happens on its own thread: it turns every callback into a
//! [`TransferEvent`] and sends it to the interactive side.

use std::path::{Path, PathBuf};

use crossbeam_channel::Sender;
use uuid::Uuid;

use crate::error::EngineError;
use crate::model::{ItemOutcome, Mode, Progress, RunSummary, TransferItem};

/// Trait for receiving progress updates from a run.
///
/// All methods are called synchronously on the thread executing the run.
/// Exactly one of `on_run_completed` / `on_run_failed` is called per run
/// that got past its preconditions.
pub trait ProgressCallback: Send {
    /// Called once the destination exists and before the first item.
    fn on_run_started(&self, run_id: Uuid, total: usize, mode: Mode, destination: &Path);

    /// Called when an item is about to be processed.
    fn on_item_started(&self, index: usize, item: &TransferItem);

    /// Called when an item is done (transferred or skipped).
    fn on_item_completed(&self, index: usize, item: &TransferItem, outcome: &ItemOutcome);

    /// Called after every item, and once more with a zeroed value when the
    /// batch has been drained.
    fn on_progress(&self, progress: Progress);

    /// Called when every item has been processed.
    fn on_run_completed(&self, summary: &RunSummary);

    /// Called when the run stops on a fatal error. `remaining` items are
    /// still in the batch.
    fn on_run_failed(&self, error: &EngineError, remaining: usize);
}

/// A run event as seen by the interactive side.
#[derive(Debug, Clone)]
pub enum TransferEvent {
    RunStarted {
        run_id: Uuid,
        total: usize,
        mode: Mode,
        destination: PathBuf,
    },
    ItemStarted {
        index: usize,
        name: String,
    },
    ItemCompleted {
        index: usize,
        source: PathBuf,
        outcome: ItemOutcome,
    },
    Progress(Progress),
    Completed(RunSummary),
    Failed {
        message: String,
        remaining: usize,
    },
}

impl TransferEvent {
    /// True for the single event that ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferEvent::Completed(_) | TransferEvent::Failed { .. })
    }
}

/// A ProgressCallback implementation that forwards events over a channel.
pub struct ChannelProgress {
    sender: Sender<TransferEvent>,
}

impl ChannelProgress {
    pub fn new(sender: Sender<TransferEvent>) -> Self {
        ChannelProgress { sender }
    }

    fn send(&self, event: TransferEvent) {
        // The receiver may be gone if the host shut down mid-run.
        let _ = self.sender.send(event);
    }
}

impl ProgressCallback for ChannelProgress {
    fn on_run_started(&self, run_id: Uuid, total: usize, mode: Mode, destination: &Path) {
        self.send(TransferEvent::RunStarted {
            run_id,
            total,
            mode,
            destination: destination.to_path_buf(),
        });
    }

    fn on_item_started(&self, index: usize, item: &TransferItem) {
        self.send(TransferEvent::ItemStarted {
            index,
            name: item.file_name(),
        });
    }

    fn on_item_completed(&self, index: usize, item: &TransferItem, outcome: &ItemOutcome) {
        self.send(TransferEvent::ItemCompleted {
            index,
            source: item.source_path().to_path_buf(),
            outcome: outcome.clone(),
        });
    }

    fn on_progress(&self, progress: Progress) {
        self.send(TransferEvent::Progress(progress));
    }

    fn on_run_completed(&self, summary: &RunSummary) {
        self.send(TransferEvent::Completed(summary.clone()));
    }

    fn on_run_failed(&self, error: &EngineError, remaining: usize) {
        self.send(TransferEvent::Failed {
            message: error.to_string(),
            remaining,
        });
    }
}
