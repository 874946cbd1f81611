//! Platform-specific helpers.
//! This module hides OS differences (Unix/Windows) behind a uniform API so
//! the rest of the codebase can remain platform-agnostic.

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{
    open_log_file_secure_append, set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600,
};

#[cfg(not(unix))]
pub use windows::{
    open_log_file_secure_append, set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600,
};

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Unique hidden sibling name used for write-then-rename.
/// Pattern: .exif_sorter.<tag>.<pid>.<nanos>.<seq>.tmp
pub(crate) fn tmp_sibling_name(target: &Path, tag: &str) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
    let name = format!(".exif_sorter.{tag}.{pid}.{nanos}.{seq}.tmp");
    target.parent().unwrap_or_else(|| Path::new(".")).join(name)
}

/// Bytes available to the current user on the volume holding `path`.
pub fn free_space_bytes(path: &Path) -> io::Result<u64> {
    fs2::available_space(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    #[test]
    fn sibling_names_are_unique_and_hidden() {
        let target = Path::new("/dest/2021/03/04/a.jpg");
        let handles: Vec<_> = (0..32)
            .map(|_| {
                let t = target.to_path_buf();
                thread::spawn(move || tmp_sibling_name(&t, "copy"))
            })
            .collect();
        let mut set = HashSet::new();
        for h in handles {
            let p = h.join().unwrap();
            assert_eq!(p.parent(), target.parent());
            assert!(p.file_name().unwrap().to_string_lossy().starts_with(".exif_sorter.copy."));
            assert!(set.insert(p));
        }
    }

    #[test]
    fn free_space_is_reported_for_an_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(free_space_bytes(dir.path()).unwrap() > 0);
    }

    #[test]
    fn free_space_errors_for_a_missing_path() {
        assert!(free_space_bytes(Path::new("/definitely/not/a/volume/path")).is_err());
    }
}
