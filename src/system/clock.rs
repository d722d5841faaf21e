// src/system/clock.rs

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// The time source a profiler reads from.
///
/// `now` is monotonic and only meaningful relative to other readings of the
/// same clock. `wall_time` is used for display and log timestamps.
pub trait Clock: fmt::Debug {
    fn now(&self) -> Duration;
    fn wall_time(&self) -> SystemTime;
}

/// The process clock: monotonic readings are measured from the moment the
/// clock was created.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn wall_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// A clock that only moves when told to. Clones share the same reading, so a
/// test can keep one handle and give another to the profiler.
#[derive(Debug, Clone)]
pub struct ManualClock {
    state: Arc<Mutex<ManualState>>,
}

#[derive(Debug)]
struct ManualState {
    now: Duration,
    wall_origin: SystemTime,
}

impl ManualClock {
    /// Starts at zero, with wall time anchored to `wall_origin`.
    pub fn new(wall_origin: SystemTime) -> Self {
        Self {
            state: Arc::new(Mutex::new(ManualState {
                now: Duration::ZERO,
                wall_origin,
            })),
        }
    }

    /// Starts at zero, anchored to 2024-01-01 00:00:00 UTC.
    pub fn fixed() -> Self {
        Self::new(UNIX_EPOCH + Duration::from_secs(1_704_067_200))
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.now += by;
    }

    pub fn set(&self, to: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.now = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).now
    }

    fn wall_time(&self) -> SystemTime {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.wall_origin + state.now
    }
}

/// Converts a wall-clock reading to fractional unix seconds.
pub fn unix_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}
