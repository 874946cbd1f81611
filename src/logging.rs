//! Tracing initialization.
//! Builds a subscriber with EnvFilter, supports compact or JSON formats, and optional file logging.
//!
//! - Log level is driven by LogLevel (no RUST_LOG override here).
//! - File logging uses tracing_appender::non_blocking and is refused when any
//!   ancestor of the file path is a symlink.

use anyhow::Result;
use chrono::Local;
use exif_sorter::output as out;
use exif_sorter::platform::open_log_file_secure_append;
use exif_sorter::{LogLevel, default_log_path, path_has_symlink_ancestor};
use std::fmt as stdfmt;
use std::path::Path;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};
use tracing_subscriber::fmt as tsfmt;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;
use tracing_subscriber::util::SubscriberInitExt;

/// Human-friendly timestamp formatter (DD/MM/YY HH:MM:SS)
struct LocalHumanTime;
impl FormatTime for LocalHumanTime {
    fn format_time(&self, w: &mut tsfmt::format::Writer<'_>) -> stdfmt::Result {
        write!(w, "{}", Local::now().format("%d/%m/%y %H:%M:%S"))
    }
}

#[inline]
fn to_level_filter(lvl: LogLevel) -> LevelFilter {
    match lvl {
        LogLevel::Quiet => LevelFilter::ERROR,
        LogLevel::Normal => LevelFilter::WARN,
        LogLevel::Info => LevelFilter::INFO,
        LogLevel::Debug => LevelFilter::DEBUG,
    }
}

/// Open a non-blocking file writer, or explain on stderr why not.
fn maybe_open_non_blocking_writer(path: &Path) -> Option<(NonBlocking, WorkerGuard)> {
    match path_has_symlink_ancestor(path) {
        Ok(true) => {
            eprintln!(
                "Refusing to enable file logging: ancestor of {} is a symlink; proceeding without file logging.",
                path.display()
            );
            return None;
        }
        Err(e) => {
            eprintln!(
                "Error checking log path {} for symlinks: {e}; proceeding without file logging.",
                path.display()
            );
            return None;
        }
        Ok(false) => {}
    }

    match open_log_file_secure_append(path) {
        Ok(file) => Some(tracing_appender::non_blocking(file)),
        Err(e) => {
            eprintln!("Failed to open log file {}: {e}", path.display());
            None
        }
    }
}

/// Initialize tracing. Returns the file appender's WorkerGuard, if any; it must be
/// held until shutdown so buffered lines are flushed.
pub fn init_tracing(
    lvl: LogLevel,
    log_file: Option<&Path>,
    json: bool,
) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::new(to_level_filter(lvl).to_string());

    let file = log_file.and_then(|path| {
        let opened = maybe_open_non_blocking_writer(path);
        if opened.is_none() {
            out::print_warn(&format!(
                "Requested file logging to '{}' was not enabled; logs will continue to stdout.",
                path.display()
            ));
            if let Ok(def) = default_log_path() {
                out::print_info(&format!("The default log path is: {}", def.display()));
            }
        }
        opened
    });
    let (file_writer, guard) = match file {
        Some((w, g)) => (Some(w), Some(g)),
        None => (None, None),
    };

    // Option<Layer> is itself a Layer, so one registry covers every combination.
    let stdout_json = json.then(|| {
        tsfmt::layer()
            .json()
            .with_timer(LocalHumanTime)
            .with_target(true)
    });
    let stdout_compact = (!json).then(|| {
        tsfmt::layer()
            .compact()
            .with_timer(LocalHumanTime)
            .with_target(true)
    });
    let file_json = file_writer
        .clone()
        .filter(|_| json)
        .map(|w| tsfmt::layer().json().with_timer(LocalHumanTime).with_writer(w));
    let file_compact = file_writer.filter(|_| !json).map(|w| {
        tsfmt::layer()
            .compact()
            .with_ansi(false)
            .with_timer(LocalHumanTime)
            .with_writer(w)
    });

    registry()
        .with(env_filter)
        .with(stdout_json)
        .with(stdout_compact)
        .with(file_json)
        .with(file_compact)
        .try_init()?;
    Ok(guard)
}
