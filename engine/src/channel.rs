//! Request/response hand-off between the transfer thread and the prompt.
//!
//! Two unbounded queues: conflict requests flow from the engine to the
//! decision-maker, decisions flow back. The engine side sends one request
//! and blocks on the reply; the decision-maker side only ever polls, so the
//! thread that owns the interactive surface is never held up by a transfer.

use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use tracing::trace;

use crate::conflict::{ConflictDecision, ConflictResolver};
use crate::error::EngineError;

/// A pending question for the decision-maker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictRequest {
    /// Display name of the file that already exists at the destination.
    pub file_name: String,
}

/// Create a connected requester/responder pair.
pub fn decision_channel() -> (DecisionRequester, DecisionResponder) {
    let (request_tx, request_rx) = unbounded();
    let (response_tx, response_rx) = unbounded();
    (
        DecisionRequester {
            requests: request_tx,
            responses: response_rx,
        },
        DecisionResponder {
            requests: request_rx,
            responses: response_tx,
        },
    )
}

/// Engine end of the channel.
///
/// `resolve` takes `&mut self`, so a second request cannot be sent before
/// the answer to the first has been received.
#[derive(Debug)]
pub struct DecisionRequester {
    requests: Sender<ConflictRequest>,
    responses: Receiver<ConflictDecision>,
}

impl ConflictResolver for DecisionRequester {
    fn resolve(&mut self, file_name: &str) -> Result<ConflictDecision, EngineError> {
        trace!(file = file_name, "requesting conflict decision");
        self.requests
            .send(ConflictRequest {
                file_name: file_name.to_string(),
            })
            .map_err(|_| EngineError::DecisionChannelClosed)?;

        // No timeout: the decision-maker is expected to always answer.
        self.responses
            .recv()
            .map_err(|_| EngineError::DecisionChannelClosed)
    }
}

/// Decision-maker end of the channel.
#[derive(Debug)]
pub struct DecisionResponder {
    requests: Receiver<ConflictRequest>,
    responses: Sender<ConflictDecision>,
}

impl DecisionResponder {
    /// Non-blocking check for a pending request.
    pub fn poll_request(&self) -> Option<ConflictRequest> {
        match self.requests.try_recv() {
            Ok(request) => Some(request),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Answer the request most recently taken from `poll_request`.
    pub fn respond(&self, decision: ConflictDecision) -> Result<(), EngineError> {
        trace!(?decision, "sending conflict decision");
        self.responses
            .send(decision)
            .map_err(|_| EngineError::DecisionChannelClosed)
    }
}
