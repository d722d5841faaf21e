// src/cli/args.rs
use crate::{
    core::config_loader::{self, ConfigOverrides},
    models::{LogMode, ProfilerConfig},
};
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

/// Options shared by every command that builds a profiler.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Path to a `reqprobe.toml`. Defaults to the platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Where the event log goes at shutdown: none, file or page (or 0, 1, 2).
    #[arg(long, value_parser = parse_log_mode)]
    pub log_mode: Option<LogMode>,

    /// Append a `< L:.. F:.. >` call-site marker to dumps and log lines.
    #[arg(long)]
    pub annotate: bool,

    /// Log file path. `~` and environment variables are expanded.
    #[arg(long)]
    pub log_path: Option<String>,

    /// Value of the debug query parameter (e.g. `1`, `phpinfo`, `pagedata`).
    /// Omit it for a regular, non-debug request.
    #[arg(long)]
    pub debug: Option<String>,
}

impl ConfigArgs {
    /// Resolves the profiler configuration: flags over file over defaults.
    pub fn resolve(&self) -> Result<ProfilerConfig> {
        let overrides = ConfigOverrides {
            log_mode: self.log_mode,
            annotate_location: self.annotate.then_some(true),
            log_path: self.log_path.clone(),
        };
        config_loader::load(self.config.as_deref(), overrides)
    }
}

fn parse_log_mode(value: &str) -> Result<LogMode, String> {
    LogMode::parse(value).ok_or_else(|| {
        format!(
            "unknown log mode '{}', expected one of: none, file, page",
            value
        )
    })
}
