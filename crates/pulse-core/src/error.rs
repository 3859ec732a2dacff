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

//! Error types shared by the collaborator contracts.

use thiserror::Error;

/// A failure raised while bringing a subsystem up.
///
/// Bring-up failures are fatal for the application: a half-initialised render
/// context cannot run, so callers are expected to abort the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubsystemError {
    /// The named subsystem refused to initialise.
    #[error("subsystem '{subsystem}' failed to initialise: {reason}")]
    InitFailed {
        /// Name of the subsystem that failed.
        subsystem: String,
        /// Human readable reason reported by the subsystem.
        reason: String,
    },
}

impl SubsystemError {
    /// Shorthand for [`SubsystemError::InitFailed`].
    pub fn init_failed(subsystem: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InitFailed {
            subsystem: subsystem.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the subsystem that produced the error.
    pub fn subsystem(&self) -> &str {
        match self {
            Self::InitFailed { subsystem, .. } => subsystem,
        }
    }
}
