//! Action planning: turns a batch plus its metadata into destination entries.
//!
//! Entries keep batch order. Outside a dry run, every destination directory is
//! created here (idempotently), before any file is touched.

use std::collections::HashMap;
use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::date::{DateResolver, Resolution, Tier};
use crate::fs_ops::io_error_with_help;
use crate::metadata::{MetadataRecord, source_key};
use crate::scan::FileRecord;

/// One planned move/copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEntry {
    pub source: PathBuf,
    pub file_name: OsString,
    pub dest_dir: PathBuf,
    pub resolution: Resolution,
}

impl ActionEntry {
    /// Fully-qualified destination file: `dest_dir/<source basename>`.
    pub fn dest_file(&self) -> PathBuf {
        self.dest_dir.join(&self.file_name)
    }
}

/// Planning result for one batch.
#[derive(Debug, Default)]
pub struct Plan {
    pub entries: Vec<ActionEntry>,
    /// Files whose date could not be resolved by any tier.
    pub unresolved: Vec<PathBuf>,
    /// Files dropped because their destination directory could not be created.
    pub failed: Vec<PathBuf>,
}

impl Plan {
    /// Number of planned entries resolved by `tier`.
    pub fn count_tier(&self, tier: Tier) -> usize {
        self.entries.iter().filter(|e| e.resolution.tier == tier).count()
    }
}

/// Resolve every file in `batch` and compute its destination directory.
/// `records` are matched to files by `SourceFile`; files without a record get a
/// bare one so the file-name tier still applies.
pub fn plan_batch(
    config: &Config,
    resolver: &DateResolver,
    batch: &[FileRecord],
    records: Vec<MetadataRecord>,
) -> Plan {
    let mut by_source: HashMap<String, MetadataRecord> = records
        .into_iter()
        .filter_map(|r| r.source_file().map(source_key).map(|s| (s, r)))
        .collect();

    let mut plan = Plan::default();
    for file in batch {
        let key = source_key(&file.path.to_string_lossy());
        let record = by_source
            .remove(&key)
            .unwrap_or_else(|| MetadataRecord::bare(&file.path));

        let Some(resolution) = resolver.resolve(&record) else {
            info!(src = %file.path.display(), "no date found; leaving file in place");
            if tracing::enabled!(tracing::Level::DEBUG) {
                let tried: Vec<String> = Tier::ALL
                    .iter()
                    .map(|t| format!("{t}={:?}", t.candidate(&record)))
                    .collect();
                debug!(src = %file.path.display(), tried = %tried.join(", "), "unresolved candidates");
            }
            plan.unresolved.push(file.path.clone());
            continue;
        };

        let dest_dir = config.dest_dir.join(resolution.date.relative_dir());
        if !config.dry_run {
            if let Err(e) = fs::create_dir_all(&dest_dir)
                .map_err(io_error_with_help("create destination directory", &dest_dir))
            {
                error!(src = %file.path.display(), error = %e, "cannot prepare destination");
                plan.failed.push(file.path.clone());
                continue;
            }
        }

        debug!(
            src = %file.path.display(),
            dest = %dest_dir.display(),
            tier = %resolution.tier,
            date = %resolution.date,
            "planned"
        );
        plan.entries.push(ActionEntry {
            source: file.path.clone(),
            file_name: file.name.clone(),
            dest_dir,
            resolution,
        });
    }
    plan
}
