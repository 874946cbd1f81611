//! Atomic rename helper.
//! - Performs a rename with context-rich errors.
//! - On Windows, removes an existing destination first (RenameFile doesn't overwrite).
//! - On Unix, best-effort fsync of the destination directory after rename.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;

pub(super) fn try_atomic_move(src: &Path, dst: &Path) -> Result<()> {
    #[cfg(windows)]
    {
        if dst.exists() {
            if let Err(e) = fs::remove_file(dst) {
                if e.kind() != io::ErrorKind::NotFound {
                    return Err(e).with_context(|| {
                        format!("remove existing destination before rename: {}", dst.display())
                    });
                }
            }
        }
    }

    fs::rename(src, dst)
        .with_context(|| format!("atomic rename '{}' -> '{}'", src.display(), dst.display()))?;

    // Ignore fsync errors to avoid turning a successful rename into a failure.
    if let Some(parent) = dst.parent() {
        let _ = fsync_dir(parent);
    }
    Ok(())
}

/// True for EXDEV / ERROR_NOT_SAME_DEVICE.
pub(super) fn is_cross_device(e: &io::Error) -> bool {
    #[cfg(unix)]
    {
        e.raw_os_error() == Some(libc::EXDEV)
    }
    #[cfg(windows)]
    {
        e.raw_os_error() == Some(17)
    }
}

#[cfg(unix)]
pub(super) fn fsync_dir(dir: &Path) -> io::Result<()> {
    fs::File::open(dir)?.sync_all()
}

#[cfg(windows)]
pub(super) fn fsync_dir(_dir: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn rename_replaces_existing_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.jpg");
        let dst = dir.path().join("b.jpg");
        fs::write(&src, b"new").unwrap();
        fs::write(&dst, b"old").unwrap();
        try_atomic_move(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(fs::read(&dst).unwrap(), b"new");
    }

    #[test]
    fn missing_source_error_names_both_paths() {
        let dir = tempdir().unwrap();
        let err = try_atomic_move(&dir.path().join("nope"), &dir.path().join("dst")).unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("nope") && msg.contains("dst"), "{msg}");
        assert!(!is_cross_device(err.downcast_ref::<io::Error>().unwrap()));
    }
}
