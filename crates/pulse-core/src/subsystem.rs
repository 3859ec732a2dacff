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

//! The generic `{init, poll, terminate}` capability.

use crate::error::SubsystemError;

/// A background subsystem driven by the application loop.
///
/// Texture, image, sound, particle and input managers all fit this shape. The
/// default implementations make it cheap to implement only what a subsystem
/// actually needs.
pub trait Subsystem: Send + Sync {
    /// A short, stable name used in diagnostics.
    fn name(&self) -> &str;

    /// One-time bring-up. Called once from `init`, in dependency order.
    fn init(&self) -> Result<(), SubsystemError> {
        Ok(())
    }

    /// Periodic work, called once per loop iteration by the thread that owns it.
    fn poll(&self) {}

    /// Releases everything acquired in [`init`](Self::init).
    fn terminate(&self) {}
}
