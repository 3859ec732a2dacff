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

//! A UI root with no widgets.

use pulse_core::{InputEvent, Size, Subsystem, UiHost};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// A [`UiHost`] that tracks the layout size and counts input.
#[derive(Debug, Default)]
pub struct HeadlessUi {
    size: Mutex<Size>,
    inputs: AtomicU64,
}

impl HeadlessUi {
    /// Creates an empty UI root.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last layout size.
    pub fn size(&self) -> Size {
        *self.size.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of input events received.
    pub fn input_count(&self) -> u64 {
        self.inputs.load(Ordering::SeqCst)
    }
}

impl Subsystem for HeadlessUi {
    fn name(&self) -> &str {
        "ui"
    }
}

impl UiHost for HeadlessUi {
    fn resize(&self, size: Size) {
        *self.size.lock().unwrap_or_else(PoisonError::into_inner) = size;
    }

    fn input_event(&self, event: &InputEvent) {
        self.inputs.fetch_add(1, Ordering::SeqCst);
        log::trace!("UI input: {:?}", event);
    }
}
