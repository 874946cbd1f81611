//! Metadata extraction service.
//!
//! A `MetadataSource` receives one batch of file paths and returns one sparse
//! key/value record per file, in input order. Keys follow ExifTool's
//! group-prefixed naming so that both backends feed the resolver identically.

pub mod exiftool;
pub mod native;

pub use exiftool::ExifToolSource;
pub use native::NativeSource;

use anyhow::Result;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Path of the file the record describes. Always present.
pub const SOURCE_FILE: &str = "SourceFile";
/// Capture timestamp, `YYYY:MM:DD HH:MM:SS`.
pub const CREATE_DATE: &str = "EXIF:CreateDate";
/// Creation time of a QuickTime/MP4 container.
pub const QUICKTIME_CREATE_DATE: &str = "QuickTime:CreateDate";
/// Creation time stored in an XMP packet.
pub const XMP_CREATE_DATE: &str = "XMP:CreateDate";
/// UTC offset belonging to `EXIF:CreateDate` (DateTimeDigitized), e.g. `+02:00`.
pub const OFFSET_TIME_DIGITIZED: &str = "EXIF:OffsetTimeDigitized";
/// UTC offset belonging to the primary `DateTime` tag. Used for the capture
/// timestamp only when `OffsetTimeDigitized` is missing.
pub const OFFSET_TIME: &str = "EXIF:OffsetTime";

/// Creation-date keys in priority order. ExifTool reports a video's date under
/// the QuickTime group and an XMP-only file's under XMP.
pub const CREATE_DATE_KEYS: [&str; 3] = [CREATE_DATE, QUICKTIME_CREATE_DATE, XMP_CREATE_DATE];
/// Filesystem modification time, `YYYY:MM:DD HH:MM:SS+HH:MM`.
pub const FILE_MODIFY_DATE: &str = "File:FileModifyDate";
/// Base name of the file.
pub const FILE_NAME: &str = "File:FileName";

/// Lookup key for matching a record's `SourceFile` to a scanned path.
/// ExifTool writes Windows paths with forward slashes, so separators are unified.
pub fn source_key(path: &str) -> String {
    path.replace('\\', "/")
}

/// Sparse metadata for one file. Any key other than `SourceFile` may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataRecord {
    fields: BTreeMap<String, String>,
}

impl MetadataRecord {
    /// Record carrying only the `SourceFile` key.
    pub fn new(source: &Path) -> Self {
        let mut rec = Self::default();
        rec.insert(SOURCE_FILE, source.to_string_lossy());
        rec
    }

    /// Record with `SourceFile` and `File:FileName` only, used when a backend
    /// returned nothing for a file so the name tier can still run.
    pub fn bare(source: &Path) -> Self {
        let mut rec = Self::new(source);
        if let Some(name) = source.file_name() {
            rec.insert(FILE_NAME, name.to_string_lossy());
        }
        rec
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: &str, value: impl Into<String>) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn source_file(&self) -> Option<&str> {
        self.get(SOURCE_FILE)
    }

    /// First creation-date key present, with its value.
    pub fn create_date(&self) -> Option<(&'static str, &str)> {
        CREATE_DATE_KEYS
            .iter()
            .find_map(|key| self.get(key).map(|value| (*key, value)))
    }

    /// Offset for `EXIF:CreateDate`: `OffsetTimeDigitized`, else `OffsetTime`.
    pub fn create_date_offset(&self) -> Option<&str> {
        self.get(OFFSET_TIME_DIGITIZED).or_else(|| self.get(OFFSET_TIME))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<(String, String)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

/// Batch metadata extractor.
pub trait MetadataSource {
    /// Short backend name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Extract metadata for `files`, returning records in the same order.
    /// An `Err` means the whole batch failed; per-file problems must be
    /// expressed as records with fewer keys instead.
    fn extract(&mut self, files: &[PathBuf]) -> Result<Vec<MetadataRecord>>;
}

/// Selectable extraction backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetadataBackend {
    /// In-process EXIF reader plus filesystem timestamps.
    #[default]
    Native,
    /// External `exiftool` process, one invocation per batch.
    ExifTool,
}

impl MetadataBackend {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" | "builtin" => Some(MetadataBackend::Native),
            "exiftool" => Some(MetadataBackend::ExifTool),
            _ => None,
        }
    }
}

impl fmt::Display for MetadataBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MetadataBackend::Native => "native",
            MetadataBackend::ExifTool => "exiftool",
        })
    }
}

impl FromStr for MetadataBackend {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid metadata backend: '{s}'"))
    }
}
