//! Background execution of runs for an interactive host.
//!
//! A `TransferSession` owns the selection. Starting a run hands the batch to
//! a freshly spawned transfer thread; the host then polls for events and
//! conflict requests from its own loop and gets the batch back once the run
//! ends. Only one run can be active, and the selection cannot change while
//! it is.

use std::mem;
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, TryRecvError};
use tracing::{debug, error};

use crate::channel::{decision_channel, ConflictRequest, DecisionResponder};
use crate::conflict::ConflictDecision;
use crate::error::EngineError;
use crate::job::{run_batch, validate_run};
use crate::model::{Batch, Mode};
use crate::progress::{ChannelProgress, TransferEvent};

#[derive(Debug)]
struct ActiveRun {
    events: Receiver<TransferEvent>,
    conflicts: DecisionResponder,
    handle: JoinHandle<Batch>,
}

/// The selection plus at most one in-flight run.
///
/// If the transfer thread panics, the batch it was holding is lost: the
/// session reports `WorkerPanicked` and comes back with an empty selection.
#[derive(Debug, Default)]
pub struct TransferSession {
    batch: Batch,
    active: Option<ActiveRun>,
}

impl TransferSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The current selection. Empty while a run holds it.
    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    /// Append a file to the selection.
    ///
    /// Returns `Ok(false)` if `path` is not an existing regular file.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) -> Result<bool, EngineError> {
        if self.is_running() {
            return Err(EngineError::RunInProgress);
        }
        Ok(self.batch.add(path))
    }

    /// Drop the whole selection.
    pub fn clear(&mut self) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::RunInProgress);
        }
        self.batch.clear();
        Ok(())
    }

    /// Start a run on a new transfer thread.
    ///
    /// Refused up front (nothing spawned, nothing touched) if a run is
    /// active, the selection is empty or `destination` is empty.
    pub fn start(&mut self, destination: impl Into<PathBuf>, mode: Mode) -> Result<(), EngineError> {
        if self.is_running() {
            return Err(EngineError::RunInProgress);
        }
        let destination = destination.into();
        validate_run(&self.batch, &destination)?;

        let mut batch = mem::take(&mut self.batch);
        let (event_tx, event_rx) = unbounded();
        let (mut requester, responder) = decision_channel();

        debug!(items = batch.len(), %mode, "spawning transfer thread");
        let handle = thread::spawn(move || {
            let callback = ChannelProgress::new(event_tx);
            // The outcome travels to the host through the callback.
            let _ = run_batch(&mut batch, &destination, mode, &mut requester, Some(&callback));
            batch
        });

        self.active = Some(ActiveRun {
            events: event_rx,
            conflicts: responder,
            handle,
        });
        Ok(())
    }

    /// Drain pending events without blocking.
    ///
    /// Once the run's terminal event has been returned the session is idle
    /// again and holds whatever the run left in the batch.
    pub fn poll_events(&mut self) -> Vec<TransferEvent> {
        let mut events = Vec::new();
        let mut finished = false;

        if let Some(active) = &self.active {
            loop {
                match active.events.try_recv() {
                    Ok(event) => {
                        finished = event.is_terminal();
                        events.push(event);
                        if finished {
                            break;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        // Thread ended without a terminal event.
                        finished = true;
                        break;
                    }
                }
            }
        }

        if finished {
            if let Some(failure) = self.finish() {
                events.push(failure);
            }
        }
        events
    }

    /// Join the finished thread and take the batch back.
    fn finish(&mut self) -> Option<TransferEvent> {
        let active = self.active.take()?;
        match active.handle.join() {
            Ok(batch) => {
                self.batch = batch;
                None
            }
            Err(_) => {
                // The batch went down with the thread; the selection stays empty.
                error!("transfer thread panicked");
                Some(TransferEvent::Failed {
                    message: EngineError::WorkerPanicked.to_string(),
                    remaining: 0,
                })
            }
        }
    }

    /// Non-blocking check for a conflict awaiting a decision.
    pub fn next_conflict(&self) -> Option<ConflictRequest> {
        self.active.as_ref()?.conflicts.poll_request()
    }

    /// Answer the conflict last returned by `next_conflict`.
    pub fn resolve_conflict(&self, decision: ConflictDecision) -> Result<(), EngineError> {
        match &self.active {
            Some(active) => active.conflicts.respond(decision),
            None => Err(EngineError::DecisionChannelClosed),
        }
    }
}
