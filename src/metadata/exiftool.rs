//! ExifTool backend: one `exiftool -json` process per batch.

use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Command;
use tracing::{debug, warn};

use super::{MetadataRecord, MetadataSource, source_key};
use crate::errors::SorterError;

/// Tags requested from ExifTool; `-G` prefixes them with their group name.
const REQUESTED_TAGS: [&str; 5] = [
    "-CreateDate",
    "-OffsetTimeDigitized",
    "-OffsetTime",
    "-FileModifyDate",
    "-FileName",
];

#[derive(Debug, Clone)]
pub struct ExifToolSource {
    program: PathBuf,
}

impl Default for ExifToolSource {
    fn default() -> Self {
        Self::new("exiftool")
    }
}

impl ExifToolSource {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Probe `exiftool -ver`; returns the reported version.
    pub fn check(&self) -> Result<String, SorterError> {
        let unavailable = |reason: String| SorterError::MetadataUnavailable {
            backend: "exiftool".into(),
            reason,
        };
        let output = Command::new(&self.program)
            .arg("-ver")
            .output()
            .map_err(|e| unavailable(format!("cannot run '{}': {e}", self.program.display())))?;
        if !output.status.success() {
            return Err(unavailable(format!(
                "'{} -ver' exited with {}",
                self.program.display(),
                output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl MetadataSource for ExifToolSource {
    fn name(&self) -> &'static str {
        "exiftool"
    }

    fn extract(&mut self, files: &[PathBuf]) -> Result<Vec<MetadataRecord>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }
        let batch_error = |reason: String| SorterError::MetadataBatch {
            backend: "exiftool".into(),
            files: files.len(),
            reason,
        };

        let output = Command::new(&self.program)
            .args(["-json", "-G", "-q"])
            .args(REQUESTED_TAGS)
            .arg("--")
            .args(files)
            .output()
            .map_err(|e| batch_error(format!("spawn '{}': {e}", self.program.display())))?;

        // ExifTool exits non-zero when some files could not be read but still
        // prints JSON for the rest.
        if !output.status.success() {
            warn!(
                status = %output.status,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "exiftool reported errors for this batch"
            );
        }
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(batch_error(format!("no output (exit status {})", output.status)).into());
        }

        let parsed: Vec<HashMap<String, Value>> = serde_json::from_slice(&output.stdout)
            .map_err(|e| batch_error(format!("unparseable JSON: {e}")))?;
        debug!(files = files.len(), records = parsed.len(), "exiftool batch parsed");

        Ok(align_to_input(files, parsed.into_iter().map(to_record).collect()))
    }
}

/// Convert one JSON object into a record, stringifying scalar values.
fn to_record(tags: HashMap<String, Value>) -> MetadataRecord {
    tags.into_iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                _ => return None,
            };
            Some((key, value))
        })
        .collect()
}

/// Order records like `files`, inserting bare records for files ExifTool skipped.
fn align_to_input(files: &[PathBuf], records: Vec<MetadataRecord>) -> Vec<MetadataRecord> {
    let mut by_source: HashMap<String, MetadataRecord> = records
        .into_iter()
        .filter_map(|r| r.source_file().map(source_key).map(|s| (s, r)))
        .collect();

    files
        .iter()
        .map(|path| {
            let key = source_key(&path.to_string_lossy());
            by_source.remove(&key).unwrap_or_else(|| {
                debug!(path = %path.display(), "no exiftool record; using bare record");
                MetadataRecord::bare(path)
            })
        })
        .collect()
}
