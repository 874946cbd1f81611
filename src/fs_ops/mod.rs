//! Filesystem operations: executes planned entries.
//!
//! Per entry: conflict check, then dry-run short-circuit, then move or copy.
//! Failures are captured as `Outcome::Failed` and never stop the batch.
//!
//! Cross-volume moves decompose into copy + delete and are therefore not atomic:
//! a crash between the two steps leaves the file in both places.

mod atomic;
mod copy;
mod helpers;
mod metadata;

pub use copy::safe_copy_and_rename;
pub use helpers::io_error_with_help;
pub use metadata::{preserve_metadata, preserve_xattrs};

use anyhow::Result;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::plan::ActionEntry;
use crate::shutdown;

use atomic::{is_cross_device, try_atomic_move};

/// What happened to one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Moved(PathBuf),
    Copied(PathBuf),
    WouldMove(PathBuf),
    WouldCopy(PathBuf),
    /// Destination already existed and replacing was not allowed.
    SkippedExisting(PathBuf),
    Failed { dest: PathBuf, error: String },
}

/// Tally of executed entries.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExecReport {
    pub moved: usize,
    pub copied: usize,
    pub would_act: usize,
    pub skipped_existing: usize,
    pub failed: usize,
    /// Set when a shutdown request stopped the batch early.
    pub interrupted: bool,
}

impl ExecReport {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Moved(_) => self.moved += 1,
            Outcome::Copied(_) => self.copied += 1,
            Outcome::WouldMove(_) | Outcome::WouldCopy(_) => self.would_act += 1,
            Outcome::SkippedExisting(_) => self.skipped_existing += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Execute `entries` in order. Stops before the next entry once shutdown is requested.
pub fn execute(config: &Config, entries: &[ActionEntry]) -> ExecReport {
    let mut report = ExecReport::default();
    for entry in entries {
        if shutdown::is_requested() {
            warn!("shutdown requested; leaving remaining files untouched");
            report.interrupted = true;
            break;
        }
        let outcome = execute_entry(config, entry);
        report.record(&outcome);
    }
    report
}

/// Execute a single entry according to the conflict policy and configured action.
pub fn execute_entry(config: &Config, entry: &ActionEntry) -> Outcome {
    let src = &entry.source;
    let dest = entry.dest_file();

    // symlink_metadata: a dangling symlink at the destination still counts as taken.
    if !config.replace_existing && fs::symlink_metadata(&dest).is_ok() {
        debug!(src = %src.display(), dest = %dest.display(), "destination exists; skipping");
        return Outcome::SkippedExisting(dest);
    }

    if config.dry_run {
        info!(
            src = %src.display(),
            dest = %dest.display(),
            tier = %entry.resolution.tier,
            "dry-run: would {}",
            config.action_label()
        );
        return if config.move_files {
            Outcome::WouldMove(dest)
        } else {
            Outcome::WouldCopy(dest)
        };
    }

    let result = if config.move_files {
        move_file(src, &dest)
    } else {
        safe_copy_and_rename(src, &dest)
    };

    match result {
        Ok(()) if config.move_files => {
            info!(src = %src.display(), dest = %dest.display(), "moved");
            Outcome::Moved(dest)
        }
        Ok(()) => {
            info!(src = %src.display(), dest = %dest.display(), "copied");
            Outcome::Copied(dest)
        }
        Err(e) => {
            let error = format!("{e:#}");
            error!(src = %src.display(), dest = %dest.display(), error = %error, "{} failed", config.action_label());
            Outcome::Failed { dest, error }
        }
    }
}

/// Atomic rename. Only a cross-device failure falls back to copy + removal of
/// the source; any other rename error is returned with both files untouched.
fn move_file(src: &Path, dest: &Path) -> Result<()> {
    let Err(e) = try_atomic_move(src, dest) else {
        return Ok(());
    };
    if !e.downcast_ref::<io::Error>().is_some_and(is_cross_device) {
        return Err(e);
    }
    warn!(src = %src.display(), dest = %dest.display(), "cross-filesystem move; using safe copy+rename");
    copy_then_remove(src, dest, |p| fs::remove_file(p))
}

/// Copy `src` to `dest`, then remove `src`. If the source cannot be removed the
/// fresh copy is deleted again so the file exists in exactly one place.
fn copy_then_remove<F>(src: &Path, dest: &Path, remove_source: F) -> Result<()>
where
    F: FnOnce(&Path) -> io::Result<()>,
{
    safe_copy_and_rename(src, dest)?;
    if let Err(e) = remove_source(src) {
        if let Err(cleanup) = fs::remove_file(dest) {
            error!(dest = %dest.display(), error = %cleanup, "cannot undo copy after failed source removal");
        }
        return Err(io_error_with_help("remove original file", src)(e));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::{Resolution, ResolvedDate, Tier};
    use std::path::Path;
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        src: TempDir,
        dst: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                src: tempdir().unwrap(),
                dst: tempdir().unwrap(),
            }
        }

        fn config(&self) -> Config {
            Config::new(self.src.path(), self.dst.path())
        }

        fn entry(&self, name: &str, body: &[u8]) -> ActionEntry {
            let source = self.src.path().join(name);
            fs::write(&source, body).unwrap();
            self.entry_for(&source)
        }

        fn entry_for(&self, source: &Path) -> ActionEntry {
            let dest_dir = self.dst.path().join("2021/03/04");
            fs::create_dir_all(&dest_dir).unwrap();
            ActionEntry {
                source: source.to_path_buf(),
                file_name: source.file_name().unwrap().to_os_string(),
                dest_dir,
                resolution: Resolution {
                    date: ResolvedDate::from_ymd(2021, 3, 4).unwrap(),
                    tier: Tier::FileName,
                },
            }
        }
    }

    #[test]
    fn copy_keeps_source() {
        let fx = Fixture::new();
        let entry = fx.entry("a.jpg", b"pixels");
        let outcome = execute_entry(&fx.config(), &entry);
        assert_eq!(outcome, Outcome::Copied(entry.dest_file()));
        assert_eq!(fs::read(entry.dest_file()).unwrap(), b"pixels");
        assert!(entry.source.exists());
    }

    #[test]
    fn move_removes_source() {
        let fx = Fixture::new();
        let entry = fx.entry("a.jpg", b"pixels");
        let mut cfg = fx.config();
        cfg.move_files = true;
        assert_eq!(execute_entry(&cfg, &entry), Outcome::Moved(entry.dest_file()));
        assert!(!entry.source.exists());
        assert_eq!(fs::read(entry.dest_file()).unwrap(), b"pixels");
    }

    #[test]
    fn existing_destination_is_skipped_without_replace() {
        let fx = Fixture::new();
        let entry = fx.entry("a.jpg", b"new");
        fs::write(entry.dest_file(), b"old").unwrap();
        let mut cfg = fx.config();
        cfg.move_files = true;
        assert_eq!(execute_entry(&cfg, &entry), Outcome::SkippedExisting(entry.dest_file()));
        assert!(entry.source.exists());
        assert_eq!(fs::read(entry.dest_file()).unwrap(), b"old");
    }

    #[cfg(unix)]
    #[test]
    fn dangling_symlink_counts_as_existing() {
        let fx = Fixture::new();
        let entry = fx.entry("a.jpg", b"new");
        std::os::unix::fs::symlink(fx.dst.path().join("missing"), entry.dest_file()).unwrap();
        assert!(matches!(execute_entry(&fx.config(), &entry), Outcome::SkippedExisting(_)));
    }

    #[test]
    fn replace_overwrites_destination() {
        let fx = Fixture::new();
        let entry = fx.entry("a.jpg", b"new");
        fs::write(entry.dest_file(), b"old").unwrap();
        let mut cfg = fx.config();
        cfg.replace_existing = true;
        assert_eq!(execute_entry(&cfg, &entry), Outcome::Copied(entry.dest_file()));
        assert_eq!(fs::read(entry.dest_file()).unwrap(), b"new");
    }

    #[test]
    fn dry_run_touches_nothing() {
        let fx = Fixture::new();
        let entry = fx.entry("a.jpg", b"x");
        let mut cfg = fx.config();
        cfg.dry_run = true;
        cfg.move_files = true;
        assert_eq!(execute_entry(&cfg, &entry), Outcome::WouldMove(entry.dest_file()));
        assert!(entry.source.exists());
        assert!(!entry.dest_file().exists());
    }

    #[test]
    fn one_failure_does_not_stop_the_batch() {
        let fx = Fixture::new();
        let missing = fx.entry_for(&fx.src.path().join("vanished.jpg"));
        let present = fx.entry("b.jpg", b"ok");
        let report = execute(&fx.config(), &[missing, present.clone()]);
        assert_eq!(report.failed, 1);
        assert_eq!(report.copied, 1);
        assert!(!report.interrupted);
        assert!(present.dest_file().exists());
    }

    #[test]
    fn failed_source_removal_undoes_the_copy() {
        let fx = Fixture::new();
        let entry = fx.entry("a.jpg", b"pixels");
        let dest = entry.dest_file();
        let err = copy_then_remove(&entry.source, &dest, |_| {
            Err(io::Error::from(io::ErrorKind::PermissionDenied))
        })
        .unwrap_err();
        assert!(format!("{err:#}").contains("remove original file"));
        assert!(entry.source.exists(), "source must survive");
        assert!(!dest.exists(), "copy must be rolled back");
    }

    #[test]
    fn copy_then_remove_moves_the_file() {
        let fx = Fixture::new();
        let entry = fx.entry("a.jpg", b"pixels");
        copy_then_remove(&entry.source, &entry.dest_file(), |p| fs::remove_file(p)).unwrap();
        assert!(!entry.source.exists());
        assert_eq!(fs::read(entry.dest_file()).unwrap(), b"pixels");
    }

    #[test]
    fn same_device_rename_error_does_not_copy() {
        let fx = Fixture::new();
        let entry = fx.entry("a.jpg", b"pixels");
        let dest = fx.dst.path().join("no/such/dir/a.jpg");
        assert!(move_file(&entry.source, &dest).is_err());
        assert!(entry.source.exists());
        assert!(!dest.exists());
    }
}
