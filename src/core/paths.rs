// src/core/paths.rs

use crate::constants::{APP_DIR, CONFIG_FILENAME, LOG_FILENAME};
use anyhow::{Result, anyhow};
use lazy_static::lazy_static;
use std::path::PathBuf;
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not find system data directory.")]
    DataDirNotFound,
}

/// Returns the path to the reqprobe configuration directory (`~/.config/reqprobe`).
///
/// This function is memoized: the first call computes and caches the path,
/// subsequent calls return the cached value instantly. The directory is not
/// created; a missing config file simply means defaults.
pub fn get_config_dir() -> Result<PathBuf, PathError> {
    let mut cached_path_guard = CONFIG_DIR.lock().unwrap_or_else(|e| e.into_inner());

    if let Some(path) = &*cached_path_guard {
        return Ok(path.clone());
    }

    let config_path = dirs::config_dir()
        .ok_or(PathError::ConfigDirNotFound)?
        .join(APP_DIR);

    *cached_path_guard = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path to the default `reqprobe.toml`.
pub fn get_config_file_path() -> Result<PathBuf, PathError> {
    get_config_dir().map(|dir| dir.join(CONFIG_FILENAME))
}

/// Returns the default log file location (`<data_local_dir>/reqprobe/error.log`).
pub fn get_default_log_path() -> Result<PathBuf, PathError> {
    dirs::data_local_dir()
        .map(|dir| dir.join(APP_DIR).join(LOG_FILENAME))
        .ok_or(PathError::DataDirNotFound)
}

/// Expands a path template string, resolving the home directory (`~`) and
/// environment variables (`$VAR` or `${VAR}`).
///
/// # Errors
/// Returns an error if the template is empty or references an undefined variable.
pub fn expand_path_template(template: &str) -> Result<PathBuf> {
    if template.trim().is_empty() {
        return Err(anyhow!("The 'log_path' template cannot be empty."));
    }

    let expanded_path_str = shellexpand::full(template)
        .map_err(|e| anyhow!("Failed to expand log path template '{}': {}", template, e))?;

    Ok(PathBuf::from(expanded_path_str.into_owned()))
}
