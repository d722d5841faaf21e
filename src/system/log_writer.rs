// src/system/log_writer.rs

use crate::constants::LOG_TIMESTAMP_FORMAT;
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogWriteError {
    #[error("Could not create log directory '{path}': {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not open log file '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not append to log file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Appends timestamped entries to a single log file.
///
/// Every entry is assembled in memory first and handed to the OS in one
/// `write_all` on a file opened in append mode, so entries from concurrent
/// processes never interleave and existing content is never rewritten.
#[derive(Debug, Clone)]
pub struct LogWriter {
    path: PathBuf,
}

impl LogWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `<timestamp> - <message>\n`.
    pub fn append(&self, at: SystemTime, message: &str) -> Result<(), LogWriteError> {
        let entry = format_entry(at, message);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| LogWriteError::CreateDir {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LogWriteError::Open {
                path: self.path.display().to_string(),
                source: e,
            })?;

        file.write_all(entry.as_bytes())
            .map_err(|e| LogWriteError::Write {
                path: self.path.display().to_string(),
                source: e,
            })?;

        log::trace!("Appended {} bytes to '{}'", entry.len(), self.path.display());
        Ok(())
    }
}

/// Renders the UTC timestamp prefix used by every entry.
pub fn format_timestamp(at: SystemTime) -> String {
    DateTime::<Utc>::from(at)
        .format(LOG_TIMESTAMP_FORMAT)
        .to_string()
}

fn format_entry(at: SystemTime, message: &str) -> String {
    format!("{} - {}\n", format_timestamp(at), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::{Duration, UNIX_EPOCH};
    use tempfile::tempdir;

    fn new_year_2024() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_704_067_200)
    }

    #[test]
    fn test_format_timestamp_is_utc() {
        let at = new_year_2024() + Duration::from_secs(3661);
        assert_eq!(format_timestamp(at), "2024-01-01 01:01:01");
    }

    #[test]
    fn test_append_never_overwrites() {
        let dir = tempdir().unwrap();
        let writer = LogWriter::new(dir.path().join("error.log"));

        writer.append(new_year_2024(), "first").unwrap();
        writer.append(new_year_2024(), "second").unwrap();

        let content = fs::read_to_string(writer.path()).unwrap();
        assert_eq!(
            content,
            "2024-01-01 00:00:00 - first\n2024-01-01 00:00:00 - second\n"
        );
    }

    #[test]
    fn test_append_creates_missing_directories() {
        let dir = tempdir().unwrap();
        let writer = LogWriter::new(dir.path().join("nested").join("deeper").join("error.log"));

        writer.append(new_year_2024(), "hello").unwrap();

        assert!(writer.path().exists());
    }

    #[test]
    fn test_append_to_directory_path_fails_with_open_error() {
        let dir = tempdir().unwrap();
        let writer = LogWriter::new(dir.path());

        let result = writer.append(new_year_2024(), "nope");

        assert!(matches!(result, Err(LogWriteError::Open { .. })));
    }

    #[test]
    fn test_concurrent_appends_produce_whole_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.log");
        let writers = 8;
        let per_writer = 50;

        let handles: Vec<_> = (0..writers)
            .map(|w| {
                let writer = LogWriter::new(path.clone());
                thread::spawn(move || {
                    for i in 0..per_writer {
                        let message = format!("writer-{w} entry-{i} {}", "x".repeat(200));
                        writer.append(new_year_2024(), &message).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), writers * per_writer);
        for line in lines {
            assert!(line.starts_with("2024-01-01 00:00:00 - writer-"));
            assert!(line.ends_with(&"x".repeat(200)));
        }
    }
}
