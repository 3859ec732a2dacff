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

//! A host scheduler driven by hand.

use pulse_core::{HostDriver, MainLoopCallback};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// A [`HostDriver`] whose scheduling slots are fired by calling
/// [`tick`](Self::tick), like a browser firing animation frames.
#[derive(Default)]
pub struct ManualHostDriver {
    callback: Mutex<Option<MainLoopCallback>>,
    generation: AtomicUsize,
    cancelled: AtomicBool,
    reloads: AtomicUsize,
}

impl ManualHostDriver {
    /// Creates a host with no registered callback.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires one scheduling slot. Returns `false` when nothing is registered.
    pub fn tick(&self) -> bool {
        let taken = self
            .callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(mut callback) = taken else {
            return false;
        };

        let generation = self.generation.load(Ordering::SeqCst);
        callback();

        // Restore unless the callback cancelled or replaced itself.
        if self.generation.load(Ordering::SeqCst) == generation
            && !self.cancelled.load(Ordering::SeqCst)
        {
            *self.callback.lock().unwrap_or_else(PoisonError::into_inner) = Some(callback);
        }
        true
    }

    /// Fires slots until the callback is released, at most `max_ticks` times.
    /// Returns the number of slots fired.
    pub fn run_until_released(&self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick() {
            ticks += 1;
        }
        ticks
    }

    /// Whether a callback is registered.
    pub fn is_registered(&self) -> bool {
        self.callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of reload requests received.
    pub fn reload_count(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

impl HostDriver for ManualHostDriver {
    fn set_main_loop(&self, callback: MainLoopCallback) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.cancelled.store(false, Ordering::SeqCst);
        *self.callback.lock().unwrap_or_else(PoisonError::into_inner) = Some(callback);
    }

    fn cancel_main_loop(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.callback
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
        log::info!("Host reload requested.");
    }
}

impl std::fmt::Debug for ManualHostDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualHostDriver")
            .field("registered", &self.is_registered())
            .field("reloads", &self.reload_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn tick_without_callback_is_a_no_op() {
        let host = ManualHostDriver::new();
        assert!(!host.tick());
    }

    #[test]
    fn callback_runs_every_tick_until_cancelled() {
        let host = Arc::new(ManualHostDriver::new());
        let runs = Arc::new(AtomicUsize::new(0));

        let (h, r) = (Arc::clone(&host), Arc::clone(&runs));
        host.set_main_loop(Box::new(move || {
            if r.fetch_add(1, Ordering::SeqCst) + 1 == 3 {
                h.cancel_main_loop();
                h.reload();
            }
        }));

        assert_eq!(host.run_until_released(10), 3);
        assert_eq!(runs.load(Ordering::SeqCst), 3);
        assert!(!host.is_registered());
        assert_eq!(host.reload_count(), 1);
    }
}
