// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The monotonic clock all frame-pacing math reads from.
//!
//! The clock is advanced explicitly, once per main-loop iteration, by the
//! owning thread. Readers on other threads observe the last advanced value,
//! which keeps every measurement within one iteration consistent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A source of monotonic time, measured from an arbitrary origin.
pub trait TimeSource: Send + Sync {
    /// Returns the time elapsed since the source's origin.
    fn now(&self) -> Duration;
}

/// Real monotonic time, measured from construction.
#[derive(Debug, Clone)]
pub struct MonotonicTime {
    origin: Instant,
}

impl MonotonicTime {
    /// Creates a source whose origin is "now".
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for MonotonicTime {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A manually driven time source for deterministic tests and replays.
#[derive(Debug, Default)]
pub struct ManualTime {
    micros: AtomicU64,
}

impl ManualTime {
    /// Creates a source at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.micros
            .fetch_add(delta.as_micros() as u64, Ordering::AcqRel);
    }

    /// Jumps to an absolute time. Going backwards is ignored.
    pub fn set(&self, at: Duration) {
        self.micros
            .fetch_max(at.as_micros() as u64, Ordering::AcqRel);
    }
}

impl TimeSource for ManualTime {
    fn now(&self) -> Duration {
        Duration::from_micros(self.micros.load(Ordering::Acquire))
    }
}

/// A cached monotonic clock.
pub struct Clock {
    source: Arc<dyn TimeSource>,
    current_us: AtomicU64,
}

impl Clock {
    /// Creates a clock backed by real monotonic time.
    pub fn new() -> Self {
        Self::with_source(Arc::new(MonotonicTime::new()))
    }

    /// Creates a clock backed by the given source.
    pub fn with_source(source: Arc<dyn TimeSource>) -> Self {
        let current_us = AtomicU64::new(source.now().as_micros() as u64);
        Self { source, current_us }
    }

    /// Advances the cached time to the source's current time and returns it.
    pub fn update(&self) -> Duration {
        let now = self.source.now().as_micros() as u64;
        let previous = self.current_us.fetch_max(now, Ordering::AcqRel);
        Duration::from_micros(previous.max(now))
    }

    /// The cached time as a `Duration`.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        Duration::from_micros(self.micros())
    }

    /// The cached time in microseconds.
    #[inline]
    pub fn micros(&self) -> u64 {
        self.current_us.load(Ordering::Acquire)
    }

    /// The cached time in milliseconds.
    #[inline]
    pub fn millis(&self) -> u64 {
        self.micros() / 1000
    }

    /// The cached time in seconds.
    #[inline]
    pub fn seconds(&self) -> f64 {
        self.micros() as f64 / 1_000_000.0
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("micros", &self.micros())
            .finish_non_exhaustive()
    }
}
