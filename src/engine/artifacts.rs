//! Output checks and scoped intermediate files

use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tracing::debug;

use crate::error::{SegmentError, SegmentResult};

/// Fail unless `path` exists and is non-empty
pub async fn ensure_output(step: &'static str, path: &Path) -> SegmentResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(SegmentError::MissingOutput {
            step,
            path: path.to_path_buf(),
        }),
    }
}

/// File owned by one job; removed when dropped unless kept
///
/// Guards intermediates and, until it passes its check, the final output.
#[derive(Debug)]
pub struct IntermediateFile {
    path: TempPath,
}

impl IntermediateFile {
    pub fn new(path: impl Into<PathBuf>) -> SegmentResult<Self> {
        Ok(Self {
            path: TempPath::try_from_path(path.into())?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now and report failures
    pub fn remove(self) -> SegmentResult<()> {
        let removed = self.path.to_path_buf();
        self.path.close()?;
        debug!(path = %removed.display(), "Removed intermediate file");
        Ok(())
    }

    /// Disarm the guard and leave the file in place
    pub fn keep(self) -> SegmentResult<PathBuf> {
        Ok(self.path.keep().map_err(std::io::Error::from)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_ensure_output_rejects_missing_and_empty_files() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.mp4");
        assert!(matches!(
            ensure_output("final cut", &missing).await,
            Err(SegmentError::MissingOutput { step: "final cut", .. })
        ));

        let empty = dir.path().join("empty.mp4");
        std::fs::write(&empty, b"").unwrap();
        assert!(ensure_output("final cut", &empty).await.is_err());

        let full = dir.path().join("full.mp4");
        std::fs::write(&full, b"data").unwrap();
        assert!(ensure_output("final cut", &full).await.is_ok());
    }

    #[test]
    fn test_intermediate_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.raw.mp4");
        std::fs::write(&path, b"partial").unwrap();

        drop(IntermediateFile::new(&path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn test_intermediate_drop_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        drop(IntermediateFile::new(dir.path().join("never-written.raw.aac")).unwrap());
    }

    #[test]
    fn test_remove_deletes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.merge.mp4");
        std::fs::write(&path, b"merged").unwrap();

        IntermediateFile::new(&path).unwrap().remove().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_kept_file_survives_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip-1.mp4");
        std::fs::write(&path, b"final").unwrap();

        let kept = IntermediateFile::new(&path).unwrap().keep().unwrap();
        assert_eq!(kept, path);
        assert!(path.exists());
    }

    #[test]
    fn test_unkept_output_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("clip-2.mp4");
        {
            let guard = IntermediateFile::new(&path).unwrap();
            std::fs::write(guard.path(), b"truncated").unwrap();
        }
        assert!(!path.exists());
    }
}
