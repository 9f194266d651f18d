//! # MediaSort Engine - File Transfer Library
//!
//! A headless engine that moves or copies a batch of selected files into one
//! destination directory, asking an external decision-maker what to do when
//! a name is already taken. Used by the command-line and desktop front ends.
//!
//! ## Overview
//!
//! - Files are processed strictly in selection order
//! - Collisions resolve to replace, skip or keep both (numeric suffix)
//! - An "apply to all" answer is remembered for the rest of the run only
//! - Conflict prompts travel over a request/response channel so the
//!   transfer thread can wait without blocking the interactive thread
//! - The first failed file operation stops the run
//!
//! ## Basic Usage
//!
//! ```no_run
//! use mediasort_engine::{Batch, ConflictDecision, ConflictOutcome, ConflictResolver, EngineError, Mode};
//! use std::path::Path;
//!
//! struct AlwaysKeepBoth;
//!
//! impl ConflictResolver for AlwaysKeepBoth {
//!     fn resolve(&mut self, _file_name: &str) -> Result<ConflictDecision, EngineError> {
//!         Ok(ConflictDecision::for_all(ConflictOutcome::KeepBoth))
//!     }
//! }
//!
//! # fn main() -> Result<(), EngineError> {
//! let mut batch = Batch::new();
//! batch.add("/home/me/Downloads/photo.jpg");
//!
//! let summary = mediasort_engine::run_batch(
//!     &mut batch,
//!     Path::new("/home/me/Pictures"),
//!     Mode::Move,
//!     &mut AlwaysKeepBoth,
//!     None,
//! )?;
//! println!("{} renamed", summary.renamed);
//! # Ok(())
//! # }
//! ```
//!
//! Interactive hosts use [`TransferSession`] instead, which runs the batch
//! on its own thread and exposes non-blocking polling for events and
//! conflict requests.
//!
//! ## Modules
//!
//! - **model**: Core data structures (TransferItem, Batch, Mode, Progress)
//! - **error**: Error types and handling
//! - **fs_ops**: Low-level filesystem operations
//! - **naming**: Collision-free names for "keep both"
//! - **conflict**: Conflict outcomes, decisions and the sticky decision
//! - **channel**: Request/response decision channel
//! - **job**: The transfer run itself
//! - **progress**: Progress callback trait and events
//! - **worker**: Background session for interactive hosts
//! - **config**: Last-destination persistence
//! - **logging**: Tracing subscriber setup

pub mod channel;
pub mod config;
pub mod conflict;
pub mod error;
pub mod fs_ops;
pub mod job;
pub mod logging;
pub mod model;
pub mod naming;
pub mod progress;
pub mod worker;

// Re-export main types and functions
pub use channel::{decision_channel, ConflictRequest, DecisionRequester, DecisionResponder};
pub use config::{AppConfig, ConfigStore};
pub use conflict::{ConflictDecision, ConflictOutcome, ConflictResolver, StickyDecision};
pub use error::{EngineError, TransferOp};
pub use job::{run_batch, validate_run};
pub use model::{Batch, ItemOutcome, Mode, Progress, RunSummary, TransferItem};
pub use naming::uniquify;
pub use progress::{ChannelProgress, ProgressCallback, TransferEvent};
pub use worker::TransferSession;
