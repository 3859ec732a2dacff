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

//! Scheduling layer of the Pulse runtime.
//!
//! This crate decides what work runs on which thread: the [`TaskPool`] runs
//! short background jobs, the [`DrawPassCoordinator`] partitions a render
//! frame into parallel sub-passes joined before presentation, and the
//! [`ExecutionStrategy`] implementations shape the frame loop for each
//! deployment target.

#![warn(missing_docs)]

pub mod coordinator;
pub mod executor;
pub mod pool;
pub mod strategy;

pub use coordinator::{DrawPassCoordinator, FrameOutcome};
pub use executor::{InlineExecutor, PassExecutor};
pub use pool::{JoinAll, PoolError, TaskError, TaskHandle, TaskPool};
pub use strategy::{
    build_strategy, CooperativeSingleThreadStrategy, CooperativeYieldStrategy, ExecutionStrategy,
    FrameLoop, MultiThreadStrategy, RunOutcome, StepOutcome, StrategyError, StrategyKind,
};
