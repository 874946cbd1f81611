//! I/O error enrichment.
//!
//! Usage:
//!   fs::create_dir_all(dir).map_err(io_error_with_help("create dir", dir))?;

use anyhow::anyhow;
use std::io;
use std::path::Path;

/// Format a human-friendly message with op/path plus a platform-aware hint.
fn build_message(op: &str, path: &Path, e: &io::Error) -> String {
    let mut msg = format!("{} '{}': {}", op, path.display(), e);

    let hint = match e.raw_os_error() {
        #[cfg(unix)]
        Some(code) => match code {
            libc::EACCES | libc::EPERM => Some("permission denied; check ownership and write permissions"),
            libc::EXDEV => Some("cross-filesystem; atomic rename not possible"),
            libc::ENOENT => Some("path not found; verify it exists"),
            libc::EEXIST => Some("already exists"),
            libc::ENOSPC => Some("insufficient space on device"),
            libc::EROFS => Some("read-only filesystem; cannot write here"),
            libc::ENAMETOOLONG => Some("filename or path too long"),
            libc::EMFILE | libc::ENFILE => Some("too many open files"),
            _ => None,
        },
        #[cfg(windows)]
        Some(code) => match code {
            5 => Some("access denied; check permissions"),
            17 => Some("not same device; cross-filesystem move"),
            32 => Some("sharing violation; file is in use"),
            2 | 3 => Some("path not found; verify it exists"),
            112 => Some("insufficient disk space"),
            _ => None,
        },
        None => match e.kind() {
            io::ErrorKind::PermissionDenied => Some("permission denied; check ownership and write permissions"),
            io::ErrorKind::NotFound => Some("path not found; verify it exists"),
            io::ErrorKind::AlreadyExists => Some("already exists"),
            _ => None,
        },
    };
    if let Some(hint) = hint {
        msg.push_str(" (");
        msg.push_str(hint);
        msg.push(')');
    }
    if let Some(code) = e.raw_os_error() {
        msg.push_str(&format!(" [os code: {code}]"));
    }
    msg
}

/// Returns a closure suitable for `.map_err(...)` that converts io::Error -> anyhow::Error.
pub fn io_error_with_help<'a>(
    op: &'a str,
    path: &'a Path,
) -> impl FnOnce(io::Error) -> anyhow::Error + 'a {
    move |e: io::Error| anyhow!(build_message(op, path, &e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_op_path_and_hint() {
        let e = io::Error::from(io::ErrorKind::NotFound);
        let err = io_error_with_help("open source", Path::new("/x/y.jpg"))(e);
        let msg = err.to_string();
        assert!(msg.starts_with("open source '/x/y.jpg'"), "{msg}");
        assert!(msg.contains("verify it exists"), "{msg}");
    }

    #[cfg(unix)]
    #[test]
    fn raw_os_code_is_reported() {
        let e = io::Error::from_raw_os_error(libc::ENOSPC);
        let msg = io_error_with_help("copy", Path::new("/d"))(e).to_string();
        assert!(msg.contains("insufficient space"), "{msg}");
        assert!(msg.contains(&format!("[os code: {}]", libc::ENOSPC)), "{msg}");
    }
}
