// src/core/report.rs

use crate::{
    core::format,
    models::ProfilerConfig,
    system::memory::MemoryProbe,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::{env, process, thread};

/// Decides whether the current actor may see the full system report.
///
/// The host owns this decision (sessions, roles, tokens); the profiler only
/// asks.
pub trait Authorizer {
    fn is_administrator(&self) -> bool;
}

impl<F> Authorizer for F
where
    F: Fn() -> bool,
{
    fn is_administrator(&self) -> bool {
        self()
    }
}

/// A snapshot of the process and its environment.
#[derive(Serialize, Debug, Clone)]
pub struct SystemReport {
    pub package: String,
    pub version: String,
    pub os: String,
    pub family: String,
    pub arch: String,
    pub pid: u32,
    pub executable: Option<String>,
    pub current_dir: Option<String>,
    pub parallelism: Option<usize>,
    pub resident_memory: String,
    pub profiler: ProfilerConfig,
    pub environment: BTreeMap<String, String>,
}

impl SystemReport {
    pub fn collect(config: &ProfilerConfig, memory: &dyn MemoryProbe) -> Self {
        Self {
            package: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            os: env::consts::OS.to_string(),
            family: env::consts::FAMILY.to_string(),
            arch: env::consts::ARCH.to_string(),
            pid: process::id(),
            executable: env::current_exe().ok().map(|p| p.display().to_string()),
            current_dir: env::current_dir().ok().map(|p| p.display().to_string()),
            parallelism: thread::available_parallelism().ok().map(|n| n.get()),
            resident_memory: format::humanize(memory.current_usage()),
            profiler: config.clone(),
            environment: env::vars_os()
                .map(|(k, v)| (k.to_string_lossy().into_owned(), v.to_string_lossy().into_owned()))
                .collect(),
        }
    }

    /// Renders the report as aligned `key => value` sections.
    pub fn render(&self) -> String {
        let mut out = String::from("== System ==\n");
        let rows = [
            ("package", format!("{} {}", self.package, self.version)),
            ("os", format!("{} ({})", self.os, self.family)),
            ("arch", self.arch.clone()),
            ("pid", self.pid.to_string()),
            ("executable", self.executable.clone().unwrap_or_default()),
            ("current_dir", self.current_dir.clone().unwrap_or_default()),
            (
                "parallelism",
                self.parallelism.map(|n| n.to_string()).unwrap_or_default(),
            ),
            ("resident_memory", self.resident_memory.clone()),
        ];
        push_rows(&mut out, rows.iter().map(|(k, v)| (*k, v.as_str())));

        out.push_str("\n== Profiler ==\n");
        let log_path = self.profiler.log_path.display().to_string();
        let profiler_rows = [
            ("log_mode", self.profiler.log_mode.to_string()),
            ("annotate_location", self.profiler.annotate_location.to_string()),
            ("log_path", log_path),
        ];
        push_rows(&mut out, profiler_rows.iter().map(|(k, v)| (*k, v.as_str())));

        out.push_str("\n== Environment ==\n");
        push_rows(
            &mut out,
            self.environment.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        out
    }
}

fn push_rows<'a>(out: &mut String, rows: impl Iterator<Item = (&'a str, &'a str)> + Clone) {
    let width = rows.clone().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in rows {
        out.push_str(&format!("{:<width$} => {}\n", key, value, width = width));
    }
}
