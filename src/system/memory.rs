// src/system/memory.rs

use std::fmt;
use std::fs;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Reads the current memory usage of the process, in bytes.
pub trait MemoryProbe: fmt::Debug {
    fn current_usage(&self) -> u64;
}

/// Resident set size of the current process.
///
/// On Linux this is `VmRSS` from `/proc/self/status`. Elsewhere, or if the file
/// cannot be parsed, the reading is `0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessMemory;

impl MemoryProbe for ProcessMemory {
    fn current_usage(&self) -> u64 {
        match fs::read_to_string("/proc/self/status") {
            Ok(status) => parse_vm_rss(&status).unwrap_or(0),
            Err(e) => {
                log::trace!("Could not read /proc/self/status: {}", e);
                0
            }
        }
    }
}

/// Extracts `VmRSS` (reported in kB) from a `/proc/<pid>/status` dump.
fn parse_vm_rss(status: &str) -> Option<u64> {
    let line = status.lines().find(|line| line.starts_with("VmRSS:"))?;
    // Format: "VmRSS:    123456 kB"
    let kb = line.split_whitespace().nth(1)?.parse::<u64>().ok()?;
    Some(kb * 1024)
}

/// A memory reading set by hand. Clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct FixedMemory {
    bytes: Arc<AtomicU64>,
}

impl FixedMemory {
    pub fn new(bytes: u64) -> Self {
        Self {
            bytes: Arc::new(AtomicU64::new(bytes)),
        }
    }

    pub fn set(&self, bytes: u64) {
        self.bytes.store(bytes, Ordering::Relaxed);
    }
}

impl MemoryProbe for FixedMemory {
    fn current_usage(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}
