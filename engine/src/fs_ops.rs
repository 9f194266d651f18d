//! Filesystem operations module.
//!
//! This module provides the low-level operations a run performs:
//! - Creating the destination directory (with parents)
//! - Copying a file with metadata preservation
//! - Moving a file, falling back to copy + remove across devices
//! - Removing a file about to be replaced, once its replacement is known to exist

use std::fs;
use std::io;
use std::path::Path;

use tracing::trace;

use crate::error::{EngineError, TransferOp};

/// Create `dir` and any missing parents.
///
/// # Errors
/// Returns `DestinationCreate` if the path cannot be created or exists as
/// something other than a directory.
pub fn ensure_dir_exists(dir: &Path) -> Result<(), EngineError> {
    match fs::metadata(dir) {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(EngineError::DestinationCreate {
            path: dir.to_path_buf(),
            source: io::Error::new(
                io::ErrorKind::InvalidInput,
                "Destination exists but is not a directory",
            ),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|e| EngineError::DestinationCreate {
                path: dir.to_path_buf(),
                source: e,
            })
        }
        Err(e) => Err(EngineError::DestinationCreate {
            path: dir.to_path_buf(),
            source: e,
        }),
    }
}

/// Which side of a copy an `io::copy` failure belongs to.
fn copy_error_op(error: &io::Error) -> TransferOp {
    match error.kind() {
        io::ErrorKind::PermissionDenied
        | io::ErrorKind::WriteZero
        | io::ErrorKind::StorageFull
        | io::ErrorKind::FileTooLarge
        | io::ErrorKind::ReadOnlyFilesystem => TransferOp::Write,
        _ => TransferOp::Read,
    }
}

/// Check that `src` still exists before anything at the destination is
/// removed on its behalf.
pub fn ensure_source_exists(src: &Path) -> Result<(), EngineError> {
    fs::metadata(src)
        .map(|_| ())
        .map_err(|e| EngineError::transfer(TransferOp::Read, src, e))
}

/// Copy a file from source to destination with metadata preservation.
///
/// Permissions and access/modification times follow the source.
///
/// # Returns
/// Number of bytes copied
pub fn copy_file_with_metadata(src: &Path, dst: &Path) -> Result<u64, EngineError> {
    let mut src_file =
        fs::File::open(src).map_err(|e| EngineError::transfer(TransferOp::Read, src, e))?;

    let src_metadata = src_file
        .metadata()
        .map_err(|e| EngineError::transfer(TransferOp::Read, src, e))?;

    let mut dst_file =
        fs::File::create(dst).map_err(|e| EngineError::transfer(TransferOp::Write, dst, e))?;

    let bytes_copied = io::copy(&mut src_file, &mut dst_file).map_err(|e| match copy_error_op(&e) {
        TransferOp::Write => EngineError::transfer(TransferOp::Write, dst, e),
        op => EngineError::transfer(op, src, e),
    })?;
    drop(dst_file);

    // Times before permissions: a read-only copy may refuse the time update.
    let atime = filetime::FileTime::from_last_access_time(&src_metadata);
    let mtime = filetime::FileTime::from_last_modification_time(&src_metadata);
    filetime::set_file_times(dst, atime, mtime)
        .map_err(|e| EngineError::transfer(TransferOp::Write, dst, e))?;

    fs::set_permissions(dst, src_metadata.permissions())
        .map_err(|e| EngineError::transfer(TransferOp::Write, dst, e))?;

    Ok(bytes_copied)
}

/// Move a file into place.
///
/// Tries a rename first; if that fails (different filesystems, for one)
/// the file is copied and the source removed afterwards.
pub fn move_file(src: &Path, dst: &Path) -> Result<(), EngineError> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) => {
            trace!(src = %src.display(), error = %e, "rename failed, copying instead");
            copy_file_with_metadata(src, dst)?;
            remove_file(src)
        }
    }
}

/// Remove a single file.
pub fn remove_file(path: &Path) -> Result<(), EngineError> {
    fs::remove_file(path).map_err(|e| EngineError::transfer(TransferOp::Remove, path, e))
}

/// True if `a` and `b` resolve to the same file on disk.
pub fn is_same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
