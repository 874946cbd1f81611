//! Pipeline driver: scan, extract, plan, execute, one batch at a time.
//!
//! Batches are processed strictly in sequence. A batch whose metadata call fails
//! is logged and counted; the run moves on to the next batch.

use anyhow::Result;
use std::path::PathBuf;
use tracing::{debug, error, info, warn};

use crate::config::{Config, nested_exclusion};
use crate::date::{DateResolver, Tier};
use crate::errors::SorterError;
use crate::fs_ops;
use crate::metadata::{ExifToolSource, MetadataBackend, MetadataSource, NativeSource};
use crate::plan::plan_batch;
use crate::scan::scan;
use crate::shutdown;

/// Aggregated counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub batches: usize,
    pub files_scanned: usize,
    pub planned: usize,
    pub unresolved: usize,
    pub moved: usize,
    pub copied: usize,
    /// Dry-run entries that would have been moved or copied.
    pub would_act: usize,
    pub skipped_existing: usize,
    pub failed_files: usize,
    pub failed_batches: usize,
    pub by_create_date: usize,
    pub by_modify_date: usize,
    pub by_file_name: usize,
}

impl RunReport {
    /// True when any file or batch failed.
    pub fn has_failures(&self) -> bool {
        self.failed_files > 0 || self.failed_batches > 0
    }

    fn add_tier(&mut self, tier: Tier, n: usize) {
        match tier {
            Tier::CreateDate => self.by_create_date += n,
            Tier::ModifyDate => self.by_modify_date += n,
            Tier::FileName => self.by_file_name += n,
        }
    }
}

/// Build the metadata backend selected by the config.
/// The exiftool backend is probed first so a missing tool fails before any work.
pub fn make_source(config: &Config) -> Result<Box<dyn MetadataSource>> {
    match config.metadata_backend {
        MetadataBackend::Native => Ok(Box::new(NativeSource::new())),
        MetadataBackend::ExifTool => {
            let source = ExifToolSource::new(&config.exiftool_path);
            let version = source.check()?;
            info!(version = %version.trim(), "using exiftool");
            Ok(Box::new(source))
        }
    }
}

/// Sort `config.source_dir` into `config.dest_dir` using `source` for metadata.
pub fn run(config: &Config, source: &mut dyn MetadataSource) -> Result<RunReport> {
    let resolver = DateResolver::new(config.date_match);
    let exclude = nested_exclusion(config);
    if let Some(ex) = &exclude {
        info!(path = %ex.display(), "destination is inside source; excluding it from the scan");
    }

    let mut report = RunReport::default();
    for batch in scan(&config.source_dir, config.batch_size, exclude) {
        if shutdown::is_requested() {
            warn!("shutdown requested; stopping before next batch");
            return Err(SorterError::Interrupted.into());
        }
        report.batches += 1;
        report.files_scanned += batch.len();
        debug!(batch = report.batches, files = batch.len(), "processing batch");

        let paths: Vec<PathBuf> = batch.iter().map(|f| f.path.clone()).collect();
        let records = match source.extract(&paths) {
            Ok(records) => records,
            Err(e) => {
                error!(
                    batch = report.batches,
                    files = batch.len(),
                    backend = source.name(),
                    error = %format!("{e:#}"),
                    "metadata extraction failed; skipping batch"
                );
                report.failed_batches += 1;
                continue;
            }
        };

        let plan = plan_batch(config, &resolver, &batch, records);
        report.planned += plan.entries.len();
        report.unresolved += plan.unresolved.len();
        report.failed_files += plan.failed.len();
        for tier in Tier::ALL {
            report.add_tier(tier, plan.count_tier(tier));
        }

        let exec = fs_ops::execute(config, &plan.entries);
        report.moved += exec.moved;
        report.copied += exec.copied;
        report.would_act += exec.would_act;
        report.skipped_existing += exec.skipped_existing;
        report.failed_files += exec.failed;
        if exec.interrupted {
            return Err(SorterError::Interrupted.into());
        }
    }

    if report.batches > 0 && report.failed_batches == report.batches {
        return Err(SorterError::AllBatchesFailed {
            batches: report.batches,
        }
        .into());
    }

    info!(
        batches = report.batches,
        scanned = report.files_scanned,
        planned = report.planned,
        unresolved = report.unresolved,
        failed = report.failed_files,
        "run finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{CREATE_DATE, MetadataRecord};
    use anyhow::bail;
    use std::fs;
    use tempfile::tempdir;

    /// Fake backend: dates every file 2022-02-02 and fails on chosen call numbers.
    struct Scripted {
        calls: Vec<usize>,
        fail_on: Vec<usize>,
    }

    impl MetadataSource for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn extract(&mut self, files: &[PathBuf]) -> Result<Vec<MetadataRecord>> {
            self.calls.push(files.len());
            if self.fail_on.contains(&self.calls.len()) {
                bail!("scripted failure");
            }
            Ok(files
                .iter()
                .map(|p| MetadataRecord::new(p).with(CREATE_DATE, "2022:02:02 02:02:02"))
                .collect())
        }
    }

    fn populate(dir: &std::path::Path, n: usize) {
        for i in 0..n {
            fs::write(dir.join(format!("f{i:02}.jpg")), b"x").unwrap();
        }
    }

    #[test]
    fn copies_everything_and_counts_tiers() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        populate(src.path(), 3);
        let cfg = Config::new(src.path(), dst.path());
        let mut fake = Scripted { calls: vec![], fail_on: vec![] };

        let report = run(&cfg, &mut fake).unwrap();
        assert_eq!(report.copied, 3);
        assert_eq!(report.by_create_date, 3);
        assert!(!report.has_failures());
        assert!(dst.path().join("2022/02/02/f01.jpg").is_file());
    }

    #[test]
    fn failed_batch_is_isolated() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        populate(src.path(), 5);
        let mut cfg = Config::new(src.path(), dst.path());
        cfg.batch_size = 2;
        let mut fake = Scripted { calls: vec![], fail_on: vec![1] };

        let report = run(&cfg, &mut fake).unwrap();
        assert_eq!(fake.calls, [2, 2, 1]);
        assert_eq!(report.failed_batches, 1);
        assert_eq!(report.copied, 3);
        assert!(report.has_failures());
    }

    #[test]
    fn all_batches_failing_is_an_error() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        populate(src.path(), 2);
        let cfg = Config::new(src.path(), dst.path());
        let mut fake = Scripted { calls: vec![], fail_on: vec![1] };

        let err = run(&cfg, &mut fake).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SorterError>(),
            Some(SorterError::AllBatchesFailed { batches: 1 })
        ));
    }

    #[test]
    fn empty_source_is_a_clean_no_op() {
        let src = tempdir().unwrap();
        let dst = tempdir().unwrap();
        let cfg = Config::new(src.path(), dst.path());
        let mut fake = Scripted { calls: vec![], fail_on: vec![] };
        let report = run(&cfg, &mut fake).unwrap();
        assert_eq!(report, RunReport::default());
        assert!(fake.calls.is_empty());
    }
}
