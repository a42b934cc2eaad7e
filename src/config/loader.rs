// src/config/loader.rs

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::model::{Config, RawConfig};
use crate::errors::{GrapeError, Result};
use crate::fs::{FileSystem, RealFileSystem};

/// Default path to the config file.
pub const DEFAULT_CONFIG_PATH: &str = "grape.json";

/// On-disk format of a config file, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// `.toml` selects TOML; anything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => ConfigFormat::Toml,
            _ => ConfigFormat::Json,
        }
    }
}

/// Load a configuration file from a given path and return the raw `RawConfig`.
///
/// This only performs deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfig> {
    load_with_fs(&RealFileSystem, path.as_ref())
}

/// Same as [`load_from_path`] but reading through the given filesystem.
pub fn load_with_fs(fs: &dyn FileSystem, path: &Path) -> Result<RawConfig> {
    let contents = fs
        .read_to_string(path)
        .with_context(|| format!("reading config file at {:?}", path))?;

    let config = match ConfigFormat::from_path(path) {
        ConfigFormat::Json => serde_json::from_str(&contents)?,
        ConfigFormat::Toml => toml::from_str(&contents)?,
    };

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<Config> {
    let raw_config = load_from_path(&path)?;
    Config::try_from(raw_config)
}

/// Write the starter config (`grape init`).
///
/// Refuses to overwrite an existing file.
pub fn write_default(path: impl AsRef<Path>) -> Result<PathBuf> {
    write_default_with_fs(&RealFileSystem, path.as_ref())
}

pub fn write_default_with_fs(fs: &dyn FileSystem, path: &Path) -> Result<PathBuf> {
    if fs.exists(path) {
        return Err(GrapeError::ConfigExists(path.to_path_buf()));
    }

    let mut contents = serde_json::to_string_pretty(&Config::starter())?;
    contents.push('\n');
    fs.write(path, contents.as_bytes())?;

    Ok(path.to_path_buf())
}
