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

//! A scripting host that logs calls and answers from a reply table.

use pulse_core::{ScriptHost, ScriptValue};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// One recorded script call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptCall {
    /// The global table name, e.g. `g_app`.
    pub global: String,
    /// The field invoked on it, e.g. `onFps`.
    pub field: String,
    /// The arguments passed.
    pub args: Vec<ScriptValue>,
}

/// A [`ScriptHost`] with no interpreter behind it.
///
/// Every call is logged at debug level and recorded. Fields answer
/// [`ScriptValue::Nil`] unless a reply was registered with
/// [`with_reply`](Self::with_reply).
#[derive(Debug, Default)]
pub struct LoggingScriptHost {
    replies: Mutex<HashMap<(String, String), ScriptValue>>,
    calls: Mutex<Vec<ScriptCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LoggingScriptHost {
    /// Creates a host with no replies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the value `global.field` returns.
    pub fn with_reply(self, global: &str, field: &str, reply: ScriptValue) -> Self {
        self.set_reply(global, field, reply);
        self
    }

    /// Registers or replaces the value `global.field` returns.
    pub fn set_reply(&self, global: &str, field: &str, reply: ScriptValue) {
        lock(&self.replies).insert((global.to_string(), field.to_string()), reply);
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<ScriptCall> {
        lock(&self.calls).clone()
    }

    /// Calls received for one field.
    pub fn calls_to(&self, field: &str) -> Vec<ScriptCall> {
        lock(&self.calls)
            .iter()
            .filter(|call| call.field == field)
            .cloned()
            .collect()
    }
}

impl ScriptHost for LoggingScriptHost {
    fn call_global_field(&self, global: &str, field: &str, args: &[ScriptValue]) -> ScriptValue {
        let args_text: Vec<String> = args.iter().map(ToString::to_string).collect();
        log::debug!("{}.{}({})", global, field, args_text.join(", "));

        lock(&self.calls).push(ScriptCall {
            global: global.to_string(),
            field: field.to_string(),
            args: args.to_vec(),
        });

        lock(&self.replies)
            .get(&(global.to_string(), field.to_string()))
            .cloned()
            .unwrap_or_default()
    }
}
