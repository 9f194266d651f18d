//! Collision-free destination names for the "keep both" outcome.

use std::path::{Path, PathBuf};

/// Return a variant of `path` that does not exist on disk.
///
/// `dir/photo.jpg` becomes `dir/photo_1.jpg`, `dir/photo_2.jpg`, ... whichever
/// is free first. Every candidate is checked against the disk at the moment
/// it is considered. The extension is the part after the last dot of the
/// file name, so `archive.tar.gz` yields `archive.tar_1.gz`; a dotfile such
/// as `.profile` has no extension and yields `.profile_1`.
pub fn uniquify(path: &Path) -> PathBuf {
    let parent = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path.extension().map(|e| e.to_string_lossy().into_owned());

    let mut counter: u64 = 1;
    loop {
        let name = match &extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_uniquify_skips_existing_suffixes() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let photo = temp_dir.path().join("photo.jpg");
        fs::write(&photo, "a").expect("Failed to write photo.jpg");
        fs::write(temp_dir.path().join("photo_1.jpg"), "b").expect("Failed to write photo_1.jpg");

        assert_eq!(uniquify(&photo), temp_dir.path().join("photo_2.jpg"));
    }

    #[test]
    fn test_uniquify_first_candidate() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let photo = temp_dir.path().join("photo.jpg");
        fs::write(&photo, "a").expect("Failed to write photo.jpg");

        assert_eq!(uniquify(&photo), temp_dir.path().join("photo_1.jpg"));
    }

    #[test]
    fn test_uniquify_without_extension() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let notes = temp_dir.path().join("notes");
        fs::write(&notes, "a").expect("Failed to write notes");

        assert_eq!(uniquify(&notes), temp_dir.path().join("notes_1"));
    }

    #[test]
    fn test_uniquify_uses_last_extension_only() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let archive = temp_dir.path().join("archive.tar.gz");

        assert_eq!(uniquify(&archive), temp_dir.path().join("archive.tar_1.gz"));
    }

    #[test]
    fn test_uniquify_dotfile() {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let profile = temp_dir.path().join(".profile");

        assert_eq!(uniquify(&profile), temp_dir.path().join(".profile_1"));
    }
}
