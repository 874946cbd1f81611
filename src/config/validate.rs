//! Config validation logic.
//! Verifies directory existence, readability/writability and that source and
//! destination are distinct.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use super::types::Config;
use crate::errors::SorterError;

impl Config {
    /// Validate directories and batch size before any file is touched.
    ///
    /// - source_dir must exist, be a directory, and be readable.
    /// - dest_dir must exist, be a directory, and be writable. A dry run only
    ///   checks the readonly bit so nothing is written.
    /// - both must not resolve to the same directory.
    pub fn validate(&self) -> Result<()> {
        let src = &self.source_dir;
        let dst = &self.dest_dir;

        if src.as_os_str().is_empty() {
            return Err(SorterError::MissingDirectory("source directory").into());
        }
        if dst.as_os_str().is_empty() {
            return Err(SorterError::MissingDirectory("destination directory").into());
        }
        if self.batch_size == 0 {
            return Err(SorterError::InvalidBatchSize(self.batch_size).into());
        }

        if !src.is_dir() || fs::read_dir(src).is_err() {
            error!(path = %src.display(), "source_dir is not a readable directory");
            return Err(SorterError::SourceInvalid(src.clone()).into());
        }
        debug!("source_dir readable: {}", src.display());

        if !dst.is_dir() || !dest_writable(dst, self.dry_run) {
            error!(path = %dst.display(), "dest_dir is not a writable directory");
            return Err(SorterError::DestInvalid(dst.clone()).into());
        }
        debug!("dest_dir writable: {}", dst.display());

        let src_real = dunce::canonicalize(src).unwrap_or_else(|_| src.clone());
        let dst_real = dunce::canonicalize(dst).unwrap_or_else(|_| dst.clone());
        if src_real == dst_real {
            return Err(SorterError::OverlappingDirs(src_real).into());
        }

        info!(
            "Config validated: source='{}' dest='{}' batch_size={} action={} dry_run={}",
            src.display(),
            dst.display(),
            self.batch_size,
            self.action_label(),
            self.dry_run
        );
        Ok(())
    }
}

/// Create and remove a probe file; in dry-run only inspect permissions.
fn dest_writable(dir: &Path, dry_run: bool) -> bool {
    if dry_run {
        return fs::metadata(dir)
            .map(|m| !m.permissions().readonly())
            .unwrap_or(false);
    }
    let probe = dir.join(format!(".exif_sorter_probe_{}.tmp", std::process::id()));
    match fs::OpenOptions::new().create_new(true).write(true).open(&probe) {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(e) => {
            debug!(path = %dir.display(), error = %e, "write probe failed");
            false
        }
    }
}

/// When the destination lives inside the source tree, return the destination as
/// seen from the source root so the scanner can prune it.
pub fn nested_exclusion(cfg: &Config) -> Option<PathBuf> {
    let src_real = dunce::canonicalize(&cfg.source_dir).ok()?;
    let dst_real = dunce::canonicalize(&cfg.dest_dir).ok()?;
    let rel = dst_real.strip_prefix(&src_real).ok()?;
    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(cfg.source_dir.join(rel))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn downcast(err: anyhow::Error) -> SorterError {
        err.downcast::<SorterError>().expect("SorterError")
    }

    #[test]
    fn accepts_two_distinct_directories() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        Config::new(src.path(), dst.path()).validate().unwrap();
    }

    #[test]
    fn rejects_missing_source() {
        let dst = tempdir().unwrap();
        let err = Config::new("/no/such/source/dir", dst.path()).validate().unwrap_err();
        assert!(matches!(downcast(err), SorterError::SourceInvalid(_)));
    }

    #[test]
    fn rejects_file_as_destination() {
        let src = tempdir().unwrap();
        let file = src.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        let err = Config::new(src.path(), &file).validate().unwrap_err();
        assert!(matches!(downcast(err), SorterError::DestInvalid(_)));
    }

    #[test]
    fn rejects_same_directory() {
        let dir = tempdir().unwrap();
        let err = Config::new(dir.path(), dir.path()).validate().unwrap_err();
        assert!(matches!(downcast(err), SorterError::OverlappingDirs(_)));
    }

    #[test]
    fn rejects_empty_paths_and_zero_batch() {
        let err = Config::default().validate().unwrap_err();
        assert!(matches!(downcast(err), SorterError::MissingDirectory(_)));

        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let mut cfg = Config::new(src.path(), dst.path());
        cfg.batch_size = 0;
        assert!(matches!(downcast(cfg.validate().unwrap_err()), SorterError::InvalidBatchSize(0)));
    }

    #[test]
    fn dry_run_validation_leaves_no_probe() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let mut cfg = Config::new(src.path(), dst.path());
        cfg.dry_run = true;
        cfg.validate().unwrap();
        assert_eq!(fs::read_dir(dst.path()).unwrap().count(), 0);
    }

    #[test]
    fn nested_destination_is_excluded() {
        let src = tempdir().unwrap();
        let nested = src.path().join("sorted");
        fs::create_dir_all(&nested).unwrap();
        let cfg = Config::new(src.path(), &nested);
        assert_eq!(nested_exclusion(&cfg), Some(src.path().join("sorted")));

        let other = tempdir().unwrap();
        assert_eq!(nested_exclusion(&Config::new(src.path(), other.path())), None);
    }
}
