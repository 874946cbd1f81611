//! Built-in backend: EXIF via `kamadak-exif`, video tracks via `nom-exif`,
//! timestamps and names from the filesystem.
//!
//! Produces the same keys ExifTool would for the fields the resolver uses:
//! - `EXIF:CreateDate`   <- DateTimeDigitized (DateTimeOriginal when absent)
//! - `EXIF:OffsetTimeDigitized`, `EXIF:OffsetTime` <- the matching tags
//! - `QuickTime:CreateDate` <- track CreateDate of a MOV/MP4 container
//! - `File:FileModifyDate` <- mtime, local time with offset
//! - `File:FileName`     <- base name
//!
//! Files inside one batch are read in parallel; record order follows input order.

use anyhow::Result;
use chrono::{DateTime, FixedOffset, Local};
use nom_exif::{MediaParser, MediaSource as MediaInput, TrackInfo, TrackInfoTag};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::{
    CREATE_DATE, FILE_MODIFY_DATE, FILE_NAME, MetadataRecord, MetadataSource, OFFSET_TIME,
    OFFSET_TIME_DIGITIZED, QUICKTIME_CREATE_DATE,
};

/// Layout ExifTool uses for dates with a zone.
const EXIFTOOL_ZONED: &str = "%Y:%m:%d %H:%M:%S%:z";

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeSource;

impl NativeSource {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataSource for NativeSource {
    fn name(&self) -> &'static str {
        "native"
    }

    fn extract(&mut self, files: &[PathBuf]) -> Result<Vec<MetadataRecord>> {
        Ok(files.par_iter().map(|p| read_record(p)).collect())
    }
}

/// Build a record for one file. Never fails: unreadable parts are left out.
pub fn read_record(path: &Path) -> MetadataRecord {
    let mut rec = MetadataRecord::new(path);

    if let Some(name) = path.file_name() {
        rec.insert(FILE_NAME, name.to_string_lossy());
    }

    match fs::metadata(path).and_then(|m| m.modified()) {
        Ok(mtime) => {
            let local: DateTime<Local> = mtime.into();
            rec.insert(FILE_MODIFY_DATE, local.format(EXIFTOOL_ZONED).to_string());
        }
        Err(e) => debug!(path = %path.display(), error = %e, "cannot read modification time"),
    }

    match read_exif(path) {
        Ok(exif) => {
            let created = ascii_field(&exif, exif::Tag::DateTimeDigitized)
                .or_else(|| ascii_field(&exif, exif::Tag::DateTimeOriginal));
            if let Some(created) = created {
                rec.insert(CREATE_DATE, created);
            }
            if let Some(offset) = ascii_field(&exif, exif::Tag::OffsetTimeDigitized) {
                rec.insert(OFFSET_TIME_DIGITIZED, offset);
            }
            if let Some(offset) = ascii_field(&exif, exif::Tag::OffsetTime) {
                rec.insert(OFFSET_TIME, offset);
            }
        }
        Err(e) => trace!(path = %path.display(), error = %e, "no EXIF data"),
    }

    if rec.get(CREATE_DATE).is_none() {
        match read_track_created(path) {
            Ok(Some(created)) => rec.insert(QUICKTIME_CREATE_DATE, format_track_date(created)),
            Ok(None) => {}
            Err(e) => trace!(path = %path.display(), error = %e, "no track data"),
        }
    }

    rec
}

/// Creation time of a MOV/MP4/3GP container; `None` for non-track files.
fn read_track_created(path: &Path) -> Result<Option<DateTime<FixedOffset>>> {
    let input = MediaInput::file_path(path)?;
    if !input.has_track() {
        return Ok(None);
    }
    let mut parser = MediaParser::new();
    let info: TrackInfo = parser.parse(input)?;
    Ok(info.get(TrackInfoTag::CreateDate).and_then(|v| v.as_time()))
}

fn format_track_date(created: DateTime<FixedOffset>) -> String {
    created.format(EXIFTOOL_ZONED).to_string()
}

fn read_exif(path: &Path) -> Result<exif::Exif> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(&file);
    Ok(exif::Reader::new().read_from_container(&mut reader)?)
}

/// Raw ASCII value of a primary-IFD tag, as stored (`YYYY:MM:DD HH:MM:SS`).
fn ascii_field(exif: &exif::Exif, tag: exif::Tag) -> Option<String> {
    let field = exif.get_field(tag, exif::In::PRIMARY)?;
    match field.value {
        exif::Value::Ascii(ref values) => values
            .first()
            .map(|v| String::from_utf8_lossy(v).trim_end_matches('\0').trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}
