//! Run orchestration.
//!
//! `run_batch` drains a [`Batch`] into a destination directory, one item at a
//! time in selection order:
//! - a free destination name is transferred directly
//! - a taken name goes through the run's sticky decision or the resolver
//! - every processed item (skips included) advances progress
//!
//! The first failing file operation stops the run. The failing item and
//! everything after it stay in the batch.

use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::conflict::{ConflictOutcome, ConflictResolver, StickyDecision};
use crate::error::EngineError;
use crate::fs_ops;
use crate::model::{Batch, ItemOutcome, Mode, Progress, RunSummary, TransferItem};
use crate::naming;
use crate::progress::ProgressCallback;

/// State that lives exactly as long as one run.
struct TransferRun {
    id: Uuid,
    mode: Mode,
    destination: PathBuf,
    total: usize,
    completed: usize,
    sticky: StickyDecision,
    summary: RunSummary,
}

impl TransferRun {
    fn new(destination: &Path, mode: Mode, total: usize) -> Self {
        TransferRun {
            id: Uuid::new_v4(),
            mode,
            destination: destination.to_path_buf(),
            total,
            completed: 0,
            sticky: StickyDecision::new(),
            summary: RunSummary::new(mode, destination.to_path_buf()),
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            completed: self.completed,
            total: self.total,
        }
    }
}

/// Check the preconditions of a run without touching the file system.
pub fn validate_run(batch: &Batch, destination: &Path) -> Result<(), EngineError> {
    if batch.is_empty() {
        return Err(EngineError::EmptyBatch);
    }
    if destination.as_os_str().is_empty() {
        return Err(EngineError::EmptyDestination);
    }
    Ok(())
}

/// Run a batch, moving or copying every item into `destination`.
///
/// `mode` is fixed for the whole run. `resolver` is consulted for each
/// collision unless an earlier answer in this run was marked `remember`.
///
/// # Errors
/// - `EmptyBatch` / `EmptyDestination` before anything happens (no callbacks)
/// - `DestinationCreate` if the directory cannot be created
/// - `Transfer` on the first failed file operation
/// - `DecisionChannelClosed` if the resolver can no longer answer
///
/// Failures after the preconditions are also reported through
/// `progress_callback.on_run_failed`.
pub fn run_batch(
    batch: &mut Batch,
    destination: &Path,
    mode: Mode,
    resolver: &mut dyn ConflictResolver,
    progress_callback: Option<&dyn ProgressCallback>,
) -> Result<RunSummary, EngineError> {
    validate_run(batch, destination)?;

    let mut run = TransferRun::new(destination, mode, batch.len());
    let span = info_span!("run", run_id = %run.id);
    let _enter = span.enter();

    if let Err(e) = fs_ops::ensure_dir_exists(destination) {
        warn!(error = %e, "destination unavailable");
        if let Some(callback) = progress_callback {
            callback.on_run_failed(&e, batch.len());
        }
        return Err(e);
    }

    info!(
        total = run.total,
        %mode,
        destination = %destination.display(),
        "transfer started"
    );
    if let Some(callback) = progress_callback {
        callback.on_run_started(run.id, run.total, mode, destination);
        callback.on_progress(run.progress());
    }

    let mut index = 0;
    while let Some(item) = batch.front().cloned() {
        if let Some(callback) = progress_callback {
            callback.on_item_started(index, &item);
        }

        let outcome = match process_item(&mut run, &item, resolver) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(
                    file = %item.source_path().display(),
                    error = %e,
                    remaining = batch.len(),
                    "transfer stopped"
                );
                if let Some(callback) = progress_callback {
                    callback.on_run_failed(&e, batch.len());
                }
                return Err(e);
            }
        };

        batch.pop_front();
        run.completed += 1;
        run.summary.record(&outcome);
        debug!(file = %item.file_name(), outcome = outcome.label(), "item processed");

        if let Some(callback) = progress_callback {
            callback.on_item_completed(index, &item, &outcome);
            callback.on_progress(run.progress());
        }
        index += 1;
    }

    run.summary.finished_at = chrono::Local::now();
    info!(
        transferred = run.summary.transferred,
        replaced = run.summary.replaced,
        renamed = run.summary.renamed,
        skipped = run.summary.skipped,
        "transfer completed"
    );

    if let Some(callback) = progress_callback {
        callback.on_progress(Progress::default());
        callback.on_run_completed(&run.summary);
    }

    Ok(run.summary)
}

/// Handle one item: transfer it, or resolve its collision first.
fn process_item(
    run: &mut TransferRun,
    item: &TransferItem,
    resolver: &mut dyn ConflictResolver,
) -> Result<ItemOutcome, EngineError> {
    let source = item.source_path();
    let candidate = item.destination_in(&run.destination);

    if !candidate.exists() {
        transfer(run.mode, source, &candidate)?;
        return Ok(ItemOutcome::Transferred {
            destination: candidate,
        });
    }

    // Already in place: replacing would delete the only copy.
    if fs_ops::is_same_file(source, &candidate) {
        info!(file = %source.display(), "source is already at the destination, skipping");
        return Ok(ItemOutcome::Skipped);
    }

    match run.sticky.decide(&item.file_name(), resolver)? {
        ConflictOutcome::Skip => Ok(ItemOutcome::Skipped),
        ConflictOutcome::Replace => {
            // A vanished source (or a duplicate entry already moved) must
            // not cost the existing file.
            fs_ops::ensure_source_exists(source)?;
            fs_ops::remove_file(&candidate)?;
            transfer(run.mode, source, &candidate)?;
            Ok(ItemOutcome::Replaced {
                destination: candidate,
            })
        }
        ConflictOutcome::KeepBoth => {
            let destination = naming::uniquify(&candidate);
            transfer(run.mode, source, &destination)?;
            Ok(ItemOutcome::Renamed { destination })
        }
    }
}

fn transfer(mode: Mode, source: &Path, destination: &Path) -> Result<(), EngineError> {
    match mode {
        Mode::Move => fs_ops::move_file(source, destination),
        Mode::Copy => fs_ops::copy_file_with_metadata(source, destination).map(|_| ()),
    }
}
