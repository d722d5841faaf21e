//! # System Interaction Layer
//!
//! This module holds the collaborators a profiler reads from and writes to.
//! It is the boundary between the profiling logic and the operating system.
//!
//! ## Modules
//!
//! - **`clock`**: The `Clock` trait, the real process clock and a manually
//!   driven clock for deterministic timing.
//! - **`memory`**: The `MemoryProbe` trait, the resident-set reader for the
//!   current process and a fixed reading for tests.
//! - **`log_writer`**: The append-only, timestamped log file writer.

pub mod clock;
pub mod log_writer;
pub mod memory;
