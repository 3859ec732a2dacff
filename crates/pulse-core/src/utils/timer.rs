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

use std::time::{Duration, Instant};

/// Measures wall time since it was started.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start_time: Instant,
}

impl Stopwatch {
    /// Creates a new Stopwatch, started immediately.
    #[inline]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Returns the elapsed time since the stopwatch was started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the elapsed time in microseconds.
    #[inline]
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed().as_micros() as u64
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const SMALL_DURATION_MS: u64 = 15;
    const SLEEP_DURATION_MS: u64 = 50;

    #[test]
    fn stopwatch_elapsed_time_near_zero_initially() {
        let watch = Stopwatch::new();
        let elapsed = watch.elapsed();
        assert!(
            elapsed < Duration::from_millis(SMALL_DURATION_MS),
            "Initial elapsed duration ({elapsed:?}) should be very small"
        );
    }

    #[test]
    fn stopwatch_elapsed_time_after_delay() {
        let watch = Stopwatch::new();
        thread::sleep(Duration::from_millis(SLEEP_DURATION_MS));

        let elapsed_us = watch.elapsed_us();
        assert!(
            elapsed_us >= SLEEP_DURATION_MS * 1000,
            "Elapsed us ({elapsed_us}) should be >= sleep duration ({SLEEP_DURATION_MS} ms)"
        );
        assert!(watch.elapsed() >= Duration::from_millis(SLEEP_DURATION_MS));
    }
}
