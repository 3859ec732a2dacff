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

//! A subsystem with nothing behind it.

use pulse_core::{Subsystem, SubsystemError};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// A [`Subsystem`] that only tracks how it was driven.
///
/// Stands in for texture, sound, particle, input and overlay managers that
/// have no headless counterpart.
#[derive(Debug)]
pub struct NullSubsystem {
    name: String,
    active: AtomicBool,
    polls: AtomicU64,
    fail_init: bool,
}

impl NullSubsystem {
    /// Creates a subsystem reporting `name` in diagnostics.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            active: AtomicBool::new(false),
            polls: AtomicU64::new(0),
            fail_init: false,
        }
    }

    /// Makes `init` fail.
    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    /// Whether `init` ran and `terminate` has not.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Number of `poll` calls so far.
    pub fn poll_count(&self) -> u64 {
        self.polls.load(Ordering::SeqCst)
    }
}

impl Subsystem for NullSubsystem {
    fn name(&self) -> &str {
        &self.name
    }

    fn init(&self) -> Result<(), SubsystemError> {
        if self.fail_init {
            return Err(SubsystemError::init_failed(&*self.name, "init refused"));
        }
        self.active.store(true, Ordering::SeqCst);
        log::debug!("Subsystem '{}' initialised.", self.name);
        Ok(())
    }

    fn poll(&self) {
        self.polls.fetch_add(1, Ordering::Relaxed);
    }

    fn terminate(&self) {
        self.active.store(false, Ordering::SeqCst);
        log::debug!("Subsystem '{}' terminated.", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_lifecycle_and_polls() {
        let sounds = NullSubsystem::new("sounds");
        sounds.init().unwrap();
        sounds.poll();
        sounds.poll();
        assert!(sounds.is_active());
        assert_eq!(sounds.poll_count(), 2);
        sounds.terminate();
        assert!(!sounds.is_active());
    }

    #[test]
    fn failing_init_names_the_subsystem() {
        let audio = NullSubsystem::new("audio").failing_init();
        assert_eq!(audio.init().unwrap_err().subsystem(), "audio");
    }
}
