//! Default path helpers and symlink checks.
//! Determines OS-appropriate config/log paths and detects symlinked ancestors for safety.

use anyhow::{Result, anyhow};
use dirs::{config_dir, data_dir};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::CONFIG_ENV;

/// Config file path: `$EXIF_SORTER_CONFIG` when set, else the OS config dir.
pub fn default_config_path() -> Result<PathBuf> {
    if let Some(p) = env::var_os(CONFIG_ENV) {
        return Ok(PathBuf::from(p));
    }
    if let Some(mut base) = config_dir() {
        base.push("exif_sorter");
        base.push("config.xml");
        return Ok(base);
    }
    env::var_os("HOME")
        .map(|h| {
            PathBuf::from(h)
                .join(".config")
                .join("exif_sorter")
                .join("config.xml")
        })
        .ok_or_else(|| anyhow!("cannot determine a config directory (no config dir and no HOME)"))
}

/// OS-appropriate default log file path (data dir). Does not create anything.
pub fn default_log_path() -> Result<PathBuf> {
    if let Some(mut base) = data_dir() {
        base.push("exif_sorter");
        base.push("exif_sorter.log");
        return Ok(base);
    }
    env::var_os("HOME")
        .map(|h| {
            PathBuf::from(h)
                .join(".local")
                .join("share")
                .join("exif_sorter")
                .join("exif_sorter.log")
        })
        .ok_or_else(|| anyhow!("cannot determine a data directory (no data dir and no HOME)"))
}

/// Return true if any existing ancestor of `path` is a symlink.
pub fn path_has_symlink_ancestor(path: &Path) -> io::Result<bool> {
    let mut p = path.parent();
    while let Some(anc) = p {
        if anc.exists() {
            let meta = fs::symlink_metadata(anc)?;
            if meta.file_type().is_symlink() {
                return Ok(true);
            }
        }
        p = anc.parent();
    }
    Ok(false)
}
