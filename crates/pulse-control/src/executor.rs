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

//! Where draw sub-passes run.

use crate::pool::{TaskHandle, TaskPool};
use pulse_core::Task;
use std::panic::{self, AssertUnwindSafe};

/// Runs draw sub-passes on behalf of the coordinator.
///
/// Every job yields a handle; the coordinator joins all of them before a
/// frame may be presented, whether the executor ran them in parallel or not.
pub trait PassExecutor: Send + Sync {
    /// Starts `job` and returns a handle to join it.
    fn spawn(&self, job: Task) -> TaskHandle<()>;

    /// Whether spawned jobs may run concurrently with the caller.
    fn is_parallel(&self) -> bool;
}

impl PassExecutor for TaskPool {
    fn spawn(&self, job: Task) -> TaskHandle<()> {
        self.submit(job)
    }

    fn is_parallel(&self) -> bool {
        true
    }
}

/// Runs every job immediately on the calling thread.
///
/// Used where no second thread may touch the render state, so sub-passes run
/// serially in submission order.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineExecutor;

impl PassExecutor for InlineExecutor {
    fn spawn(&self, job: Task) -> TaskHandle<()> {
        TaskHandle::from_result(panic::catch_unwind(AssertUnwindSafe(job)))
    }

    fn is_parallel(&self) -> bool {
        false
    }
}
