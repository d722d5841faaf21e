// src/cli/handlers/mod.rs

// This module contains the logic for each CLI command.

pub mod commons;
pub mod dump;
pub mod humanize;
pub mod log;
pub mod report;
pub mod simulate;
pub mod stages;
