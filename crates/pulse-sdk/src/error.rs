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

//! Lifecycle errors.

use crate::config::ConfigError;
use crate::lifecycle::ApplicationState;
use pulse_control::{PoolError, StrategyError};
use pulse_core::SubsystemError;
use thiserror::Error;

/// Errors returned by the application lifecycle entry points.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A subsystem failed to come up. Fatal: the caller should abort.
    #[error("initialisation failed: {0}")]
    Init(#[from] SubsystemError),
    /// The configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The task pool could not be started.
    #[error(transparent)]
    Pool(#[from] PoolError),
    /// The execution strategy could not be started.
    #[error(transparent)]
    Strategy(#[from] StrategyError),
    /// The entry point is not valid in the current state.
    #[error("cannot {operation} while the application is {state}")]
    InvalidState {
        /// The rejected entry point.
        operation: &'static str,
        /// The state at the time of the call.
        state: ApplicationState,
    },
    /// `terminate` was called while the frame loop was still running.
    #[error("cannot terminate while the frame loop is running")]
    StillRunning,
}

impl LifecycleError {
    /// Whether the process should abort.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Init(_) | Self::Pool(_) | Self::Strategy(_))
    }
}
