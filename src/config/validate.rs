// src/config/validate.rs

use crate::config::model::{Config, RawConfig};
use crate::errors::{GrapeError, Result};
use crate::watch::patterns::{compile_glob, ExcludeRules};

impl TryFrom<RawConfig> for Config {
    type Error = GrapeError;

    fn try_from(raw: RawConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(Config::new_unchecked(raw.namespaces))
    }
}

fn validate_raw_config(cfg: &RawConfig) -> Result<()> {
    ensure_has_namespaces(cfg)?;
    validate_namespaces(cfg)?;
    Ok(())
}

fn ensure_has_namespaces(cfg: &RawConfig) -> Result<()> {
    if cfg.namespaces.is_empty() {
        return Err(GrapeError::ConfigError(
            "config must contain at least one namespace".to_string(),
        ));
    }
    Ok(())
}

fn validate_namespaces(cfg: &RawConfig) -> Result<()> {
    for (name, ns) in cfg.namespaces.iter() {
        if name.trim().is_empty() {
            return Err(GrapeError::ConfigError(
                "namespace names must not be empty".to_string(),
            ));
        }
        if ns.watch.include.is_empty() {
            return Err(GrapeError::ConfigError(format!(
                "namespace '{}' has no `watch.include` patterns",
                name
            )));
        }
        // Malformed patterns are a startup error, never a runtime one.
        for pattern in ns.watch.include.iter() {
            compile_glob(pattern)?;
        }
        ExcludeRules::new(&ns.watch.exclude)?;
    }
    Ok(())
}
