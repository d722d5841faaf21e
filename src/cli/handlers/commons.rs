// src/cli/handlers/commons.rs

// This module contains shared functions used by multiple handlers.

use anyhow::Result;
use colored::Colorize;
use serde_json::Value;

use crate::{
    cli::args::ConfigArgs,
    core::{format, profiler::Profiler},
    models::{DebugRequest, LifecycleEntry},
};

/// Builds a profiler from the shared flags, on the process clock and memory.
pub fn build_profiler(config_args: &ConfigArgs) -> Result<Profiler> {
    let config = config_args.resolve()?;
    let debug = DebugRequest::from_param(config_args.debug.as_deref());
    log::debug!("Resolved config: {:?}, debug request: {:?}", config, debug);
    Ok(Profiler::new(config, debug))
}

/// Interprets a CLI value: valid JSON is kept structured, anything else is a string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Prints the event log as an aligned table.
pub fn print_event_table(events: &[LifecycleEntry]) {
    if events.is_empty() {
        println!("{}", "No lifecycle events were recorded.".dimmed());
        return;
    }

    let width = events
        .iter()
        .map(|e| e.event.len())
        .max()
        .unwrap_or(0)
        .max("event".len());

    println!(
        "{}",
        format!(
            "{:<width$}  {:>10}  {:>10}  {:>12}",
            "event",
            "elapsed",
            "diff",
            "memory",
            width = width
        )
        .bold()
    );
    for entry in events {
        println!(
            "{:<width$}  {:>9.4}s  {:>9.4}s  {:>12}",
            entry.event.cyan(),
            entry.elapsed,
            entry.diff,
            entry.memory,
            width = width
        );
    }
}

/// A one-line summary of where the request ended.
pub fn summary_line(profiler: &Profiler) -> String {
    let elapsed = profiler
        .elapsed()
        .map(|d| format!("{:.4}s", d.as_secs_f64()))
        .unwrap_or_else(|| "n/a".to_string());
    let delta = profiler
        .memory_delta(crate::constants::INIT_CHECKPOINT)
        .map(format::humanize_signed)
        .unwrap_or_else(|| "n/a".to_string());
    format!("total {} | memory delta {}", elapsed, delta)
}
