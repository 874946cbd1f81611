#![allow(dead_code)]

use anyhow::{Result, bail};
use chrono::{Local, TimeZone};
use filetime::FileTime;
use std::fs;
use std::path::{Path, PathBuf};

use exif_sorter::MetadataSource;
use exif_sorter::metadata::{CREATE_DATE, FILE_NAME, MetadataRecord};

/// Fake metadata backend that records the size of every call.
/// Files whose name starts with a `YYYYMMDD` stamp get it as their create date.
#[derive(Default)]
pub struct RecordingSource {
    pub calls: Vec<usize>,
    pub fail_on: Vec<usize>,
}

impl MetadataSource for RecordingSource {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn extract(&mut self, files: &[PathBuf]) -> Result<Vec<MetadataRecord>> {
        self.calls.push(files.len());
        if self.fail_on.contains(&self.calls.len()) {
            bail!("scripted failure on call {}", self.calls.len());
        }
        Ok(files
            .iter()
            .map(|p| {
                let name = p.file_name().unwrap().to_string_lossy().into_owned();
                let mut rec = MetadataRecord::new(p).with(FILE_NAME, name.clone());
                if name.len() >= 8 && name[..8].bytes().all(|b| b.is_ascii_digit()) {
                    let created = format!("{}:{}:{} 12:00:00", &name[..4], &name[4..6], &name[6..8]);
                    rec.insert(CREATE_DATE, created);
                }
                rec
            })
            .collect())
    }
}

pub fn write(path: &Path, body: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

/// Set a file's mtime to local noon on the given day.
pub fn pin_mtime(path: &Path, y: i32, m: u32, d: u32) -> FileTime {
    let ts = Local.with_ymd_and_hms(y, m, d, 12, 0, 0).single().unwrap().timestamp();
    let ft = FileTime::from_unix_time(ts, 0);
    filetime::set_file_mtime(path, ft).unwrap();
    ft
}

/// Every regular file under `root`, relative to it, sorted.
pub fn tree(root: &Path) -> Vec<String> {
    let mut out: Vec<String> = walkdir::WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    out.sort();
    out
}
