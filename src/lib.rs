//! Core library for `exif_sorter`.
//!
//! Sorts a tree of photos and videos into `dest/YYYY/MM/DD/` by capture date.
//! The run is a strictly sequential pipeline over fixed-size batches:
//! scan → metadata extraction → date resolution/planning → move or copy.
//!
//! Module overview:
//! - config: Config/LogLevel, XML loading, default paths, validation
//! - date: tiered date resolution and date-string parsing
//! - metadata: MetadataSource trait and the native / exiftool backends
//! - scan: depth-first file walker and the batching combinator
//! - plan: per-batch destination planning
//! - fs_ops: conflict policy, atomic move, metadata-preserving copy
//! - pipeline: batch loop and RunReport
//! - platform: OS helpers (secure log/config files, free space)
//! - errors: typed SorterError with stable codes
//! - output: colored console lines and the run summary
//! - shutdown: Ctrl-C flag

pub mod cli;
pub mod config;
pub mod date;
pub mod errors;
pub mod fs_ops;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod plan;
pub mod platform;
pub mod scan;
pub mod shutdown;

pub use config::{
    CONFIG_ENV, Config, DEFAULT_BATCH_SIZE, LogLevel, create_template_config,
    default_config_path, default_log_path, load_config_from_xml_path, load_default_config,
    nested_exclusion, path_has_symlink_ancestor,
};
pub use date::{DateResolver, MatchStrategy, Resolution, ResolvedDate, Tier};
pub use errors::SorterError;
pub use fs_ops::{ExecReport, Outcome, execute, execute_entry};
pub use metadata::{
    ExifToolSource, MetadataBackend, MetadataRecord, MetadataSource, NativeSource,
};
pub use pipeline::{RunReport, make_source, run};
pub use plan::{ActionEntry, Plan, plan_batch};
pub use scan::{Batch, Batches, FileRecord, scan, walk_files};
