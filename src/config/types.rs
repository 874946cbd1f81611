//! Core configuration types.
//! - Config holds runtime settings with sensible defaults.
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use super::DEFAULT_BATCH_SIZE;
use crate::date::MatchStrategy;
use crate::metadata::MetadataBackend;

/// Program-defined verbosity levels exposed to users/config.
/// Ordered from least to most output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Warnings and the end-of-run summary (default)
    #[default]
    Normal,
    /// Every planned and executed action (`--verbose`)
    Info,
    /// Resolution attempts and skips (`--debug`)
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" | "warn" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// Runtime configuration for one sorting run.
/// Built once (defaults < config file < CLI) and then only read.
#[derive(Debug, Clone)]
pub struct Config {
    /// Tree of media files to sort
    pub source_dir: PathBuf,
    /// Root of the generated YYYY/MM/DD tree
    pub dest_dir: PathBuf,
    /// Files per metadata call / planning pass
    pub batch_size: usize,
    /// Console verbosity
    pub log_level: LogLevel,
    /// Optional path to a log file
    pub log_file: Option<PathBuf>,
    /// If true, report actions but do not modify the filesystem
    pub dry_run: bool,
    /// Move instead of copy
    pub move_files: bool,
    /// Overwrite files already present at the destination
    pub replace_existing: bool,
    /// Where per-file metadata comes from
    pub metadata_backend: MetadataBackend,
    /// ExifTool executable used by the exiftool backend
    pub exiftool_path: PathBuf,
    /// Template selection when scanning names for dates
    pub date_match: MatchStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            dest_dir: PathBuf::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            log_level: LogLevel::Normal,
            log_file: None,
            dry_run: false,
            move_files: false,
            replace_existing: false,
            metadata_backend: MetadataBackend::default(),
            exiftool_path: PathBuf::from("exiftool"),
            date_match: MatchStrategy::default(),
        }
    }
}

impl Config {
    /// Construct a Config with explicit directories; other fields use defaults.
    pub fn new(source_dir: impl Into<PathBuf>, dest_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            dest_dir: dest_dir.into(),
            ..Default::default()
        }
    }

    /// Log level actually used: a dry run is always at least verbose.
    pub fn effective_log_level(&self) -> LogLevel {
        if self.dry_run {
            self.log_level.max(LogLevel::Info)
        } else {
            self.log_level
        }
    }

    /// Human label for the configured action.
    pub fn action_label(&self) -> &'static str {
        if self.move_files { "move" } else { "copy" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dry_run_forces_verbose() {
        let mut cfg = Config::new("/src", "/dst");
        cfg.dry_run = true;
        assert_eq!(cfg.effective_log_level(), LogLevel::Info);
        cfg.log_level = LogLevel::Debug;
        assert_eq!(cfg.effective_log_level(), LogLevel::Debug);
        cfg.dry_run = false;
        cfg.log_level = LogLevel::Quiet;
        assert_eq!(cfg.effective_log_level(), LogLevel::Quiet);
    }

    #[test]
    fn defaults_copy_and_skip_existing() {
        let cfg = Config::new("/src", "/dst");
        assert_eq!(cfg.batch_size, DEFAULT_BATCH_SIZE);
        assert!(!cfg.move_files);
        assert!(!cfg.replace_existing);
        assert_eq!(cfg.action_label(), "copy");
    }
}
