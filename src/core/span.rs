// src/core/span.rs

use crate::core::profiler::Profiler;
use std::ops::{Deref, DerefMut};
use std::time::Instant;

/// A RAII scope over a profiler.
///
/// When created, it records the start instant. When it goes out of scope (is
/// dropped), it records a lifecycle event under its name and logs how long the
/// scope took. The profiler stays usable through the guard.
#[derive(Debug)]
pub struct Span<'a> {
    profiler: &'a mut Profiler,
    name: String,
    start: Instant,
}

impl<'a> Span<'a> {
    pub(crate) fn new(profiler: &'a mut Profiler, name: String) -> Self {
        Self {
            profiler,
            name,
            start: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Deref for Span<'_> {
    type Target = Profiler;

    fn deref(&self) -> &Self::Target {
        self.profiler
    }
}

impl DerefMut for Span<'_> {
    fn deref_mut(&mut self) -> &mut Profiler {
        self.profiler
    }
}

impl Drop for Span<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        log::debug!("SPAN [{}]: {} µs", self.name, elapsed.as_micros());
        let name = std::mem::take(&mut self.name);
        if let Err(e) = self.profiler.record_lifecycle_event(&name) {
            log::warn!("Span '{}' could not record its lifecycle event: {}", name, e);
        }
    }
}
