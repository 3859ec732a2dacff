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

//! The host-scheduler capability used by cooperative runtimes.

/// A callback the host invokes once per scheduling slot.
pub type MainLoopCallback = Box<dyn FnMut() + Send>;

/// A host environment that owns the scheduling loop (e.g. a browser tab).
///
/// The runtime cannot block inside such a host; it registers a callback and
/// returns. When the application stops, the callback is unregistered and the
/// host is asked to reload, since it may discard the execution environment.
pub trait HostDriver: Send + Sync {
    /// Registers the per-slot callback, replacing any previous one.
    fn set_main_loop(&self, callback: MainLoopCallback);

    /// Unregisters the per-slot callback. The host must not invoke it again.
    fn cancel_main_loop(&self);

    /// Asks the host to tear down and reload the execution environment.
    fn reload(&self);
}
