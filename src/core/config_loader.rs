//! # Config Loader
//!
//! Resolves a [`ProfilerConfig`] from three layers, lowest priority first:
//! built-in defaults, a `reqprobe.toml` file, and explicit overrides (usually
//! CLI flags). The file is either given explicitly, in which case it must
//! exist, or looked up in the platform config directory, where its absence
//! simply means defaults.
use crate::{
    core::paths,
    models::{ConfigFile, LogMode, ProfilerConfig},
};
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// Values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub log_mode: Option<LogMode>,
    pub annotate_location: Option<bool>,
    pub log_path: Option<String>,
}

/// Reads and parses a single config file.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let config: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
    log::debug!("Loaded config from '{}': {:?}", path.display(), config);
    Ok(config)
}

/// Finds the config file to use. An explicit path must exist; the default
/// location is optional.
pub fn find_config_file(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    match paths::get_config_file_path() {
        Ok(default_path) if default_path.is_file() => load_config_file(&default_path),
        Ok(default_path) => {
            log::debug!(
                "No config file at '{}', using defaults.",
                default_path.display()
            );
            Ok(ConfigFile::default())
        }
        Err(e) => {
            log::debug!("{} Using defaults.", e);
            Ok(ConfigFile::default())
        }
    }
}

/// Merges the file with the overrides and expands the log path.
pub fn resolve(file: ConfigFile, overrides: ConfigOverrides) -> Result<ProfilerConfig> {
    let log_path = match overrides.log_path.or(file.log_path) {
        Some(template) => paths::expand_path_template(&template)?,
        None => paths::get_default_log_path()?,
    };

    Ok(ProfilerConfig {
        log_mode: overrides.log_mode.unwrap_or(file.log_mode),
        annotate_location: overrides
            .annotate_location
            .unwrap_or(file.annotate_location),
        log_path,
    })
}

/// The main entry point: find, parse and resolve.
pub fn load(explicit: Option<&Path>, overrides: ConfigOverrides) -> Result<ProfilerConfig> {
    let file = find_config_file(explicit)?;
    resolve(file, overrides)
}
