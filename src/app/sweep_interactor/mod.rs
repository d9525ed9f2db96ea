// Sweep interactor - Removes intermediates left behind by crashed jobs

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::domain::rules::is_intermediate_filename;
use crate::error::SegmentResult;

/// Sweep options
#[derive(Debug, Clone)]
pub struct SweepRequest {
    /// Files modified more recently than this may belong to a running job
    pub min_age: Duration,
    pub dry_run: bool,
}

impl Default for SweepRequest {
    fn default() -> Self {
        Self {
            min_age: Duration::from_secs(60 * 60),
            dry_run: false,
        }
    }
}

/// What a sweep found and removed
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub removed: Vec<PathBuf>,
    pub bytes: u64,
    /// Intermediates younger than `min_age`
    pub skipped: usize,
    pub dry_run: bool,
}

/// Interactor for the stale intermediate sweep
pub struct SweepInteractor {
    output_dir: PathBuf,
}

impl SweepInteractor {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn execute(&self, request: &SweepRequest) -> SegmentResult<SweepReport> {
        let mut report = SweepReport {
            dry_run: request.dry_run,
            ..SweepReport::default()
        };

        if !self.output_dir.is_dir() {
            info!(dir = %self.output_dir.display(), "Output directory missing; nothing to sweep");
            return Ok(report);
        }

        let now = SystemTime::now();
        for entry in WalkDir::new(&self.output_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !is_intermediate_filename(&name) {
                continue;
            }

            let metadata = entry.metadata().map_err(std::io::Error::from)?;
            let age = metadata
                .modified()
                .ok()
                .and_then(|modified| now.duration_since(modified).ok())
                .unwrap_or_default();
            if age < request.min_age {
                debug!(path = %entry.path().display(), age_secs = age.as_secs(), "Intermediate too recent");
                report.skipped += 1;
                continue;
            }

            if !request.dry_run {
                if let Err(e) = std::fs::remove_file(entry.path()) {
                    warn!(path = %entry.path().display(), error = %e, "Failed to remove intermediate");
                    continue;
                }
            }
            report.bytes += metadata.len();
            report.removed.push(entry.path().to_path_buf());
        }

        info!(
            removed = report.removed.len(),
            skipped = report.skipped,
            bytes = report.bytes,
            dry_run = report.dry_run,
            "Sweep finished"
        );
        Ok(report)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"leftover").unwrap();
        path
    }

    #[test]
    fn test_sweep_removes_only_intermediates() {
        let dir = TempDir::new().unwrap();
        let raw = touch(dir.path(), "clip-1-00-00-01-000--00-00-02-000.mp4.raw.mp4");
        let merged = touch(dir.path(), "clip-1-00-00-01-000--00-00-02-000.mp4.merge.mp4");
        let output = touch(dir.path(), "clip-1-00-00-01-000--00-00-02-000.mp4");
        let other = touch(dir.path(), "notes.raw.mp4");

        let report = SweepInteractor::new(dir.path())
            .execute(&SweepRequest {
                min_age: Duration::ZERO,
                dry_run: false,
            })
            .unwrap();

        assert_eq!(report.removed.len(), 2);
        assert_eq!(report.bytes, 16);
        assert!(!raw.exists() && !merged.exists());
        assert!(output.exists() && other.exists());
    }

    #[test]
    fn test_dry_run_keeps_files() {
        let dir = TempDir::new().unwrap();
        let raw = touch(dir.path(), "clip-2-a--b.aac.raw.aac");

        let report = SweepInteractor::new(dir.path())
            .execute(&SweepRequest {
                min_age: Duration::ZERO,
                dry_run: true,
            })
            .unwrap();

        assert_eq!(report.removed, vec![raw.clone()]);
        assert!(raw.exists());
    }

    #[test]
    fn test_recent_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        let raw = touch(dir.path(), "clip-3-a--b.mp4.raw.mp4");

        let report = SweepInteractor::new(dir.path())
            .execute(&SweepRequest::default())
            .unwrap();

        assert!(report.removed.is_empty());
        assert_eq!(report.skipped, 1);
        assert!(raw.exists());
    }

    #[test]
    fn test_missing_dir_is_empty_report() {
        let dir = TempDir::new().unwrap();
        let report = SweepInteractor::new(dir.path().join("absent"))
            .execute(&SweepRequest::default())
            .unwrap();
        assert!(report.removed.is_empty());
    }
}
