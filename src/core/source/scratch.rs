//! Request-scoped scratch storage for staged image bytes.
//!
//! Each request gets its own directory, named after its request id, and the
//! directory is removed when the `ScratchSpace` is dropped or closed.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use uuid::Uuid;

/// Temporary directory owned by exactly one request
#[derive(Debug)]
pub struct ScratchSpace {
    dir: TempDir,
}

impl ScratchSpace {
    /// Create a fresh directory under `root`, or the system temp dir
    pub fn create(root: Option<&Path>, request_id: Uuid) -> io::Result<Self> {
        let prefix = format!("photo-dedup-{}-", request_id);
        let mut builder = tempfile::Builder::new();
        builder.prefix(&prefix);

        let dir = match root {
            Some(root) => {
                fs::create_dir_all(root)?;
                builder.tempdir_in(root)?
            }
            None => builder.tempdir()?,
        };

        tracing::debug!(path = %dir.path().display(), "created scratch space");
        Ok(Self { dir })
    }

    /// Directory holding staged files
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path a given batch index is staged under
    pub fn staged_path(&self, index: usize) -> PathBuf {
        self.dir.path().join(format!("image_{}.bin", index))
    }

    /// Write one image's bytes and return the size recorded on disk
    pub fn stage(&self, index: usize, bytes: &[u8]) -> io::Result<u64> {
        let path = self.staged_path(index);
        fs::write(&path, bytes)?;
        Ok(fs::metadata(&path)?.len())
    }

    /// Remove the directory now and report any failure
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_reports_byte_size() {
        let scratch = ScratchSpace::create(None, Uuid::new_v4()).unwrap();
        let size = scratch.stage(3, &[0u8; 1234]).unwrap();

        assert_eq!(size, 1234);
        assert!(scratch.staged_path(3).exists());
    }

    #[test]
    fn drop_reclaims_directory() {
        let scratch = ScratchSpace::create(None, Uuid::new_v4()).unwrap();
        scratch.stage(0, b"bytes").unwrap();
        let path = scratch.path().to_path_buf();

        drop(scratch);

        assert!(!path.exists());
    }

    #[test]
    fn concurrent_requests_get_separate_directories() {
        let root = tempfile::tempdir().unwrap();
        let a = ScratchSpace::create(Some(root.path()), Uuid::new_v4()).unwrap();
        let b = ScratchSpace::create(Some(root.path()), Uuid::new_v4()).unwrap();

        assert_ne!(a.path(), b.path());
        assert!(a.path().starts_with(root.path()));

        let path = a.path().to_path_buf();
        a.close().unwrap();
        assert!(!path.exists());
        assert!(b.path().exists());
    }
}
