//! Error types for the transfer engine.
//!
//! `EngineError` covers everything that can go wrong around a run: refused
//! preconditions, a destination that cannot be created, a failed file
//! operation, a vanished decision-maker and config persistence failures.
//! Only some of these stop a run; see [`EngineError::is_fatal`].

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// The file-system operation that failed mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOp {
    /// Reading the source file
    Read,
    /// Writing the destination file
    Write,
    /// Renaming the source into place
    Move,
    /// Removing a file (the replaced destination or the moved source)
    Remove,
}

impl fmt::Display for TransferOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferOp::Read => write!(f, "read"),
            TransferOp::Write => write!(f, "write"),
            TransferOp::Move => write!(f, "move"),
            TransferOp::Remove => write!(f, "remove"),
        }
    }
}

/// Errors raised by the engine and its session.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A selected path is not an existing regular file.
    #[error("Not a regular file: {}", path.display())]
    NotAFile { path: PathBuf },

    /// A run was requested with nothing selected.
    #[error("No files selected")]
    EmptyBatch,

    /// A run was requested without a destination.
    #[error("Destination path is empty")]
    EmptyDestination,

    /// The destination directory could not be created.
    #[error("Failed to create destination directory: {}", path.display())]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A move/copy/remove failed for one item.
    #[error("Failed to {op} {}: {source}", path.display())]
    Transfer {
        op: TransferOp,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The decision-maker disconnected while a conflict was pending.
    #[error("Conflict decision channel closed")]
    DecisionChannelClosed,

    /// A run is already active.
    #[error("A transfer is already running")]
    RunInProgress,

    /// The transfer thread stopped without reporting a result.
    #[error("Transfer thread stopped unexpectedly")]
    WorkerPanicked,

    /// The config file could not be read or written.
    #[error("Failed to access config file: {}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The config file exists but is not valid.
    #[error("Invalid config file: {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl EngineError {
    pub(crate) fn transfer(op: TransferOp, path: impl Into<PathBuf>, source: io::Error) -> Self {
        EngineError::Transfer {
            op,
            path: path.into(),
            source,
        }
    }

    /// True if this error stops the run it occurred in.
    ///
    /// Selection and config failures never interrupt a transfer.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DestinationCreate { .. }
                | Self::Transfer { .. }
                | Self::DecisionChannelClosed
                | Self::WorkerPanicked
        )
    }

    /// Extract the OS error code from this error, if available.
    pub fn raw_os_error(&self) -> Option<i32> {
        match self {
            Self::DestinationCreate { source, .. }
            | Self::Transfer { source, .. }
            | Self::ConfigIo { source, .. } => source.raw_os_error(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_error_message_names_operation_and_path() {
        let err = EngineError::transfer(
            TransferOp::Remove,
            "/tmp/photo.jpg",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let msg = err.to_string();
        assert!(msg.contains("remove"), "unexpected message: {}", msg);
        assert!(msg.contains("photo.jpg"), "unexpected message: {}", msg);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_selection_and_config_errors_are_not_fatal() {
        let selection = EngineError::NotAFile {
            path: PathBuf::from("/tmp/dir"),
        };
        let config = EngineError::ConfigIo {
            path: PathBuf::from("config.json"),
            source: io::Error::new(io::ErrorKind::NotFound, "missing"),
        };
        assert!(!selection.is_fatal());
        assert!(!config.is_fatal());
        assert!(!EngineError::EmptyBatch.is_fatal());
    }

    #[test]
    fn test_raw_os_error_passthrough() {
        let err = EngineError::DestinationCreate {
            path: PathBuf::from("/root/x"),
            source: io::Error::from_raw_os_error(13),
        };
        assert_eq!(err.raw_os_error(), Some(13));
        assert_eq!(EngineError::RunInProgress.raw_os_error(), None);
    }
}
