//! Source tree scanning.
//!
//! Two layers:
//! - `walk_files`: a lazy, depth-first walk yielding regular files. Entries whose
//!   name starts with `.` are skipped (hidden directories are not descended into).
//!   Directory entries are visited in file-name order so runs are reproducible.
//! - `Batches`: groups any iterator into chunks of exactly `size` items; only the
//!   final chunk may be shorter.
//!
//! Symlinks are not followed and symlinked files are not yielded.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// One candidate file found while scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub name: OsString,
    pub parent: PathBuf,
}

impl FileRecord {
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_os_string();
        let parent = path.parent()?.to_path_buf();
        Some(Self { path, name, parent })
    }
}

/// A batch of files processed together.
pub type Batch = Vec<FileRecord>;

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Lazily walk `root` depth-first, yielding regular, non-hidden files.
/// `exclude` prunes one subtree (typically a destination nested in the source).
pub fn walk_files(root: &Path, exclude: Option<PathBuf>) -> impl Iterator<Item = FileRecord> {
    WalkDir::new(root)
        .min_depth(1)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |e| {
            // The root itself may be hidden; only its descendants are filtered.
            if e.depth() == 0 {
                return true;
            }
            if is_hidden(e) {
                return false;
            }
            match &exclude {
                Some(ex) => e.path() != ex.as_path(),
                None => true,
            }
        })
        .filter_map(|res| match res {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| FileRecord::from_path(e.into_path()))
}

/// Fixed-size chunking adapter.
#[derive(Debug)]
pub struct Batches<I> {
    inner: I,
    size: usize,
}

impl<I: Iterator> Batches<I> {
    /// `size` of zero is treated as one.
    pub fn new(inner: I, size: usize) -> Self {
        Self {
            inner,
            size: size.max(1),
        }
    }
}

impl<I: Iterator> Iterator for Batches<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk: Vec<_> = self.inner.by_ref().take(self.size).collect();
        if chunk.is_empty() { None } else { Some(chunk) }
    }
}

/// Scan `root` into batches of `batch_size` files.
pub fn scan(
    root: &Path,
    batch_size: usize,
    exclude: Option<PathBuf>,
) -> Batches<impl Iterator<Item = FileRecord>> {
    Batches::new(walk_files(root, exclude), batch_size)
}
