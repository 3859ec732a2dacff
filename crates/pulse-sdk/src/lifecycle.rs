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

//! Application state and flags.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

/// The lifecycle state machine.
///
/// `Initializing` covers everything from `init` until the frame loop starts.
/// `Stopping` is entered on a stop request and held until `terminate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ApplicationState {
    /// Nothing brought up yet.
    Uninitialized = 0,
    /// Subsystems brought up, loop not started.
    Initializing = 1,
    /// The frame loop is running.
    Running = 2,
    /// A stop was requested or the loop has ended.
    Stopping = 3,
    /// Everything torn down.
    Terminated = 4,
}

impl ApplicationState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Uninitialized,
            1 => Self::Initializing,
            2 => Self::Running,
            3 => Self::Stopping,
            _ => Self::Terminated,
        }
    }

    /// Lower-case name for logs and errors.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The lifecycle state plus the flags the frame loop reads every iteration.
///
/// Invariant: `running` and `terminated` are never both set.
#[derive(Debug)]
pub struct LifecycleFlags {
    state: AtomicU8,
    running: AtomicBool,
    stopping: AtomicBool,
    terminated: AtomicBool,
    on_input_event: AtomicBool,
}

impl LifecycleFlags {
    /// Flags for a fresh process.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ApplicationState::Uninitialized as u8),
            running: AtomicBool::new(false),
            stopping: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
            on_input_event: AtomicBool::new(false),
        }
    }

    /// The current state.
    pub fn state(&self) -> ApplicationState {
        ApplicationState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: ApplicationState) {
        let previous = ApplicationState::from_u8(self.state.swap(state as u8, Ordering::SeqCst));
        if previous != state {
            log::info!("Application state: {} -> {}.", previous, state);
        }
    }

    /// Moves `from` to `to`; returns the actual state on mismatch.
    pub fn transition(
        &self,
        from: ApplicationState,
        to: ApplicationState,
    ) -> Result<(), ApplicationState> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| log::info!("Application state: {} -> {}.", from, to))
            .map_err(ApplicationState::from_u8)
    }

    /// Whether the frame loop has started and not finished.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether a stop was requested and the loop has not finished.
    pub fn is_stopping(&self) -> bool {
        self.stopping.load(Ordering::SeqCst)
    }

    /// Whether teardown completed.
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    /// Whether UI input is being delivered right now.
    pub fn is_on_input_event(&self) -> bool {
        self.on_input_event.load(Ordering::SeqCst)
    }

    /// Marks the frame loop as started.
    pub fn start_running(&self) {
        self.running.store(true, Ordering::SeqCst);
        self.set_state(ApplicationState::Running);
    }

    /// Requests a cooperative stop. Returns `false` if one was already pending.
    pub fn request_stop(&self) -> bool {
        let first = !self.stopping.swap(true, Ordering::SeqCst);
        if self.state() == ApplicationState::Running {
            self.set_state(ApplicationState::Stopping);
        }
        first
    }

    /// Clears `running` and `stopping` once the loop has exited. Returns
    /// `false` if the loop was not running.
    pub fn finish_run(&self) -> bool {
        if !self.running.swap(false, Ordering::SeqCst) {
            return false;
        }
        self.stopping.store(false, Ordering::SeqCst);
        self.set_state(ApplicationState::Stopping);
        true
    }

    /// Records completed teardown.
    pub fn mark_terminated(&self) {
        self.terminated.store(true, Ordering::SeqCst);
        self.set_state(ApplicationState::Terminated);
    }

    /// Runs `f` with the input-dispatch guard set. The previous value is
    /// restored even if `f` unwinds.
    pub fn with_input_guard<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = InputGuard::set(&self.on_input_event);
        f()
    }
}

/// Restores the input-dispatch flag on drop.
struct InputGuard<'a>(&'a AtomicBool, bool);

impl<'a> InputGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        let previous = flag.swap(true, Ordering::SeqCst);
        Self(flag, previous)
    }
}

impl Drop for InputGuard<'_> {
    fn drop(&mut self) {
        self.0.store(self.1, Ordering::SeqCst);
    }
}

impl Default for LifecycleFlags {
    fn default() -> Self {
        Self::new()
    }
}
