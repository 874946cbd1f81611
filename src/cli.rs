//! CLI definition and parsing.
//! Defines Args and provides parse() for command-line handling.
//!
//! Notes:
//! - --debug wins over --verbose, which wins over --log-level.
//! - Unset flags leave config-file values alone.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use crate::config::types::{Config, LogLevel};
use crate::date::MatchStrategy;
use crate::metadata::MetadataBackend;

/// CLI flags override config values (which are loaded from XML if present).
#[derive(Parser, Debug, Clone, Default)]
#[command(
    author,
    version,
    about = "Sort photos and videos into a YYYY/MM/DD tree by capture date"
)]
pub struct Args {
    /// Tree of media files to sort.
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub source_dir: Option<PathBuf>,

    /// Root of the generated YYYY/MM/DD tree.
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub dest_dir: Option<PathBuf>,

    #[arg(
        long,
        help = "Show what would be done, but do not modify files/directories"
    )]
    pub dry_run: bool,

    #[arg(short = 'v', long, help = "Report every planned and executed action")]
    pub verbose: bool,

    #[arg(
        short = 'd',
        long,
        help = "Enable debug logging (shorthand for --log-level debug)"
    )]
    pub debug: bool,

    /// Move files instead of copying them.
    #[arg(long = "move")]
    pub move_files: bool,

    /// Overwrite files that already exist at the destination.
    #[arg(long = "replace-file")]
    pub replace_file: bool,

    /// Files per metadata call.
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    #[arg(long, value_name = "BACKEND", help = "Metadata backend: native or exiftool")]
    pub metadata_backend: Option<MetadataBackend>,

    /// ExifTool executable (implies nothing unless the exiftool backend is selected).
    #[arg(long = "exiftool", value_name = "PATH", value_hint = ValueHint::ExecutablePath)]
    pub exiftool_path: Option<PathBuf>,

    #[arg(long, value_name = "STRATEGY", help = "Date template choice in names: first or last")]
    pub date_match: Option<MatchStrategy>,

    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub log_file: Option<PathBuf>,

    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,

    #[arg(
        long,
        help = "Print the config file location used by exif_sorter and exit"
    )]
    pub print_config: bool,

    #[arg(long, help = "Write a commented template config file and exit")]
    pub init_config: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --verbose > --log-level value > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        if self.verbose {
            return Some(LogLevel::Info);
        }
        self.log_level.as_deref().and_then(LogLevel::parse)
    }

    /// Apply CLI overrides to a loaded Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(p) = &self.source_dir {
            cfg.source_dir = p.clone();
        }
        if let Some(p) = &self.dest_dir {
            cfg.dest_dir = p.clone();
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
        if let Some(p) = &self.log_file {
            cfg.log_file = Some(p.clone());
        }
        if let Some(n) = self.batch_size {
            cfg.batch_size = n;
        }
        if let Some(b) = self.metadata_backend {
            cfg.metadata_backend = b;
        }
        if let Some(p) = &self.exiftool_path {
            cfg.exiftool_path = p.clone();
        }
        if let Some(s) = self.date_match {
            cfg.date_match = s;
        }
        if self.dry_run {
            cfg.dry_run = true;
        }
        if self.move_files {
            cfg.move_files = true;
        }
        if self.replace_file {
            cfg.replace_existing = true;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}
