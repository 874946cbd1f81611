//! XML configuration support.
//! - Loads settings from config.xml (quick_xml + serde).
//! - Writes a commented template on request (`--init-config`).
//!
//! Notes:
//! - A missing file is not an error; the caller falls back to defaults + CLI flags.
//! - Unknown XML fields are rejected so typos surface instead of being ignored.

use anyhow::{Context, Result, bail};
use quick_xml::de::from_str as from_xml_str;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::paths::{default_config_path, path_has_symlink_ancestor};
use super::types::{Config, LogLevel};
use super::DEFAULT_BATCH_SIZE;
use crate::date::MatchStrategy;
use crate::metadata::MetadataBackend;
use crate::platform::{set_dir_mode_0700, set_file_mode_0600, write_config_secure_new_0600};

/// Struct mirroring the XML config for deserialization.
#[derive(Debug, Deserialize)]
#[serde(rename = "config")]
#[serde(deny_unknown_fields)]
struct XmlConfig {
    source_dir: Option<String>,
    dest_dir: Option<String>,
    batch_size: Option<String>,
    log_level: Option<String>,
    log_file: Option<String>,
    move_files: Option<bool>,
    replace_existing: Option<bool>,
    metadata_backend: Option<String>,
    exiftool_path: Option<String>,
    date_match: Option<String>,
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|t| !t.is_empty())
}

// Map XmlConfig -> Config, starting from defaults.
fn xml_to_config(parsed: XmlConfig) -> Result<Config> {
    let mut cfg = Config::default();

    if let Some(s) = non_empty(parsed.source_dir.as_deref()) {
        cfg.source_dir = PathBuf::from(s);
    }
    if let Some(s) = non_empty(parsed.dest_dir.as_deref()) {
        cfg.dest_dir = PathBuf::from(s);
    }
    if let Some(s) = non_empty(parsed.log_file.as_deref()) {
        cfg.log_file = Some(PathBuf::from(s));
    }
    if let Some(s) = non_empty(parsed.exiftool_path.as_deref()) {
        cfg.exiftool_path = PathBuf::from(s);
    }
    if let Some(s) = non_empty(parsed.batch_size.as_deref()) {
        cfg.batch_size = s
            .parse::<usize>()
            .with_context(|| format!("invalid batch_size: '{s}'"))?;
    }

    if let Some(s) = non_empty(parsed.log_level.as_deref()) {
        match s.parse::<LogLevel>() {
            Ok(level) => cfg.log_level = level,
            Err(e) => warn!("{e}; keeping log level '{}'", cfg.log_level),
        }
    }
    if let Some(s) = non_empty(parsed.metadata_backend.as_deref()) {
        cfg.metadata_backend = s.parse::<MetadataBackend>().map_err(anyhow::Error::msg)?;
    }
    if let Some(s) = non_empty(parsed.date_match.as_deref()) {
        cfg.date_match = s.parse::<MatchStrategy>().map_err(anyhow::Error::msg)?;
    }

    cfg.move_files = parsed.move_files.unwrap_or(false);
    cfg.replace_existing = parsed.replace_existing.unwrap_or(false);

    Ok(cfg)
}

/// Load a Config from a specific XML file path.
pub fn load_config_from_xml_path(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read config xml '{}'", path.display()))?;
    let parsed: XmlConfig = from_xml_str(&contents)
        .with_context(|| format!("parse config xml '{}'", path.display()))?;
    xml_to_config(parsed).with_context(|| format!("invalid value in config xml '{}'", path.display()))
}

/// Load the config file from `$EXIF_SORTER_CONFIG` or the default location.
/// Returns Ok(None) when the file does not exist.
pub fn load_default_config() -> Result<Option<Config>> {
    let path = default_config_path()?;
    if !path.exists() {
        debug!("no config file at {}", path.display());
        return Ok(None);
    }
    let cfg = load_config_from_xml_path(&path)?;
    info!("Loaded config from {}", path.display());
    Ok(Some(cfg))
}

/// Write a commented template to `path`. Refuses to overwrite or to follow a
/// symlinked ancestor.
pub fn create_template_config(path: &Path) -> Result<()> {
    if path.exists() {
        bail!("Config file already exists: {}", path.display());
    }
    if path_has_symlink_ancestor(path)? {
        bail!(
            "Refusing to create config: ancestor of {} is a symlink",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
        let _ = set_dir_mode_0700(parent);
    }

    let content = format!(
        "<!--\n  exif_sorter configuration (XML)\n\n  source_dir        -> tree of photos/videos to sort\n  dest_dir          -> root of the generated YYYY/MM/DD tree\n  batch_size        -> files per metadata call (default {DEFAULT_BATCH_SIZE})\n  log_level         -> quiet | normal | info | debug\n  log_file          -> optional log file (stdout is still used)\n  move_files        -> true = move, false = copy\n  replace_existing  -> true = overwrite files already at the destination\n  metadata_backend  -> native | exiftool\n  exiftool_path     -> exiftool executable for the exiftool backend\n  date_match        -> first | last (template choice for dates in names)\n\n  CLI flags override values set here.\n-->\n<config>\n  <source_dir></source_dir>\n  <dest_dir></dest_dir>\n  <batch_size>{DEFAULT_BATCH_SIZE}</batch_size>\n  <log_level>normal</log_level>\n  <move_files>false</move_files>\n  <replace_existing>false</replace_existing>\n  <metadata_backend>native</metadata_backend>\n  <exiftool_path>exiftool</exiftool_path>\n  <date_match>first</date_match>\n</config>\n"
    );

    write_config_secure_new_0600(path, content.as_bytes())?;
    let _ = set_file_mode_0600(path);

    info!("Created template config at {}", path.display());
    Ok(())
}
