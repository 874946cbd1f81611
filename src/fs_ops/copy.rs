//! Safe copy-and-rename:
//! - Checks free space in the destination directory
//! - Streams into a hidden temp file in the destination directory and fsyncs it
//! - Atomically renames temp -> dest, so a half-written destination is never visible
//! - Preserves times, permissions and (optionally) xattrs

use anyhow::{Context, Result, anyhow};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

use super::atomic::try_atomic_move;
use super::helpers::io_error_with_help;
use super::metadata::{preserve_metadata, preserve_xattrs};
use crate::platform::{free_space_bytes, tmp_sibling_name};

const BUF_SIZE: usize = 1024 * 1024;
// Headroom kept free on the destination filesystem.
const SPACE_CUSHION: u64 = 4 * 1024 * 1024;

/// Copy `src` to `dest` through a temp file, then carry over metadata.
pub fn safe_copy_and_rename(src: &Path, dest: &Path) -> Result<()> {
    let dest_dir = dest
        .parent()
        .ok_or_else(|| anyhow!("destination has no parent: {}", dest.display()))?;
    let src_meta = fs::metadata(src).map_err(io_error_with_help("stat source", src))?;

    ensure_space_for_copy(dest_dir, src_meta.len())?;

    let tmp_path = tmp_sibling_name(dest, "copy");
    if let Err(e) = copy_streaming(src, &tmp_path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_error_with_help("copy to temporary file", &tmp_path)(e));
    }

    if let Err(e) = try_atomic_move(&tmp_path, dest) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| {
            format!(
                "rename temporary file '{}' -> '{}'",
                tmp_path.display(),
                dest.display()
            )
        });
    }

    preserve_metadata(dest, &src_meta);
    preserve_xattrs(src, dest);
    Ok(())
}

/// Copy `src` -> `dst` with buffered I/O, then fsync. `dst` must not exist.
fn copy_streaming(src: &Path, dst: &Path) -> io::Result<u64> {
    let src_f = File::open(src)?;
    let dst_f = OpenOptions::new().write(true).create_new(true).open(dst)?;

    let mut reader = BufReader::with_capacity(BUF_SIZE, src_f);
    let mut writer = BufWriter::with_capacity(BUF_SIZE, dst_f);
    let bytes = io::copy(&mut reader, &mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(bytes)
}

fn ensure_space_for_copy(dst_dir: &Path, required: u64) -> Result<()> {
    let free = free_space_bytes(dst_dir).map_err(io_error_with_help("query free space", dst_dir))?;
    if free < required.saturating_add(SPACE_CUSHION) {
        return Err(anyhow!(
            "not enough free space in '{}': need ~{}, free {}",
            dst_dir.display(),
            format_bytes(required),
            format_bytes(free)
        ));
    }
    Ok(())
}

fn format_bytes(n: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let f = n as f64;
    if f >= GB {
        format!("{:.1} GiB", f / GB)
    } else if f >= MB {
        format!("{:.1} MiB", f / MB)
    } else if f >= KB {
        format!("{:.1} KiB", f / KB)
    } else {
        format!("{n} B")
    }
}
