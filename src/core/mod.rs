// src/core/mod.rs

pub mod config_loader;
pub mod format;
pub mod paths;
pub mod profiler;
pub mod report;
pub mod span;
