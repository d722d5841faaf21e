pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;

pub use crate::core::format::{humanize, humanize_signed};
pub use crate::core::profiler::{DumpOutcome, Profiler, ProfilerBuilder, ProfilerError};
pub use crate::core::report::Authorizer;
pub use crate::models::{DebugMode, DebugRequest, LifecycleEntry, LogMode, ProfilerConfig, Stage};
