//! Metadata preservation for copied files.
//! - Copies timestamps (atime, mtime) and, on Unix, permission bits from source to dest.
//! - Best-effort: failures are logged and the copy still counts as done.
//! - Extended attributes are carried over only with the `xattrs` feature.

use filetime::{FileTime, set_file_times};
use std::fs;
use std::path::Path;
use tracing::{trace, warn};

/// Preserve metadata on `dest` using already-fetched `src_meta`.
pub fn preserve_metadata(dest: &Path, src_meta: &fs::Metadata) {
    let at = FileTime::from_last_access_time(src_meta);
    let mt = FileTime::from_last_modification_time(src_meta);
    if let Err(e) = set_file_times(dest, at, mt) {
        warn!(path = %dest.display(), error = %e, "failed to set atime/mtime on destination");
    } else {
        trace!(path = %dest.display(), "set atime/mtime on destination");
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = src_meta.permissions().mode() & 0o777;
        if let Err(e) = fs::set_permissions(dest, fs::Permissions::from_mode(mode)) {
            warn!(path = %dest.display(), mode = format!("{mode:o}"), error = %e, "failed to set permissions on destination");
        }
    }

    #[cfg(windows)]
    {
        let ro = src_meta.permissions().readonly();
        if let Ok(meta) = fs::metadata(dest) {
            let mut perms = meta.permissions();
            perms.set_readonly(ro);
            if let Err(e) = fs::set_permissions(dest, perms) {
                warn!(path = %dest.display(), readonly = ro, error = %e, "failed to set readonly attribute on destination");
            }
        }
    }
}

/// Copy extended attributes from `src` to `dest` (no-op without the `xattrs` feature).
#[cfg(feature = "xattrs")]
pub fn preserve_xattrs(src: &Path, dest: &Path) {
    let names = match xattr::list(src) {
        Ok(names) => names,
        Err(e) => {
            warn!(src = %src.display(), error = %e, "failed to list xattrs; continuing");
            return;
        }
    };
    for name in names {
        let value = match xattr::get(src, &name) {
            Ok(v) => v.unwrap_or_default(),
            Err(e) => {
                warn!(src = %src.display(), xattr = %name.to_string_lossy(), error = %e, "failed to read xattr");
                continue;
            }
        };
        if let Err(e) = xattr::set(dest, &name, &value) {
            warn!(dest = %dest.display(), xattr = %name.to_string_lossy(), error = %e, "failed to set xattr");
        }
    }
}

#[cfg(not(feature = "xattrs"))]
pub fn preserve_xattrs(_src: &Path, _dest: &Path) {}
