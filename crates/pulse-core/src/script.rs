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

//! Fire-and-forget calls into the scripting subsystem.

use std::fmt;

/// A value crossing the scripting boundary.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScriptValue {
    /// No value / the field did not exist.
    #[default]
    Nil,
    /// A boolean.
    Bool(bool),
    /// An integer.
    Integer(i64),
    /// A floating point number.
    Number(f64),
    /// A string.
    String(String),
}

impl ScriptValue {
    /// Returns `true` only for `Bool(true)`.
    pub fn is_true(&self) -> bool {
        matches!(self, ScriptValue::Bool(true))
    }
}

impl fmt::Display for ScriptValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptValue::Nil => write!(f, "nil"),
            ScriptValue::Bool(v) => write!(f, "{v}"),
            ScriptValue::Integer(v) => write!(f, "{v}"),
            ScriptValue::Number(v) => write!(f, "{v}"),
            ScriptValue::String(v) => write!(f, "\"{v}\""),
        }
    }
}

/// The scripting host.
///
/// Calls are made only from the thread that drains the main dispatcher; the
/// host never sees concurrent invocations from the runtime.
pub trait ScriptHost: Send + Sync {
    /// Invokes `global.field(args...)` and returns its result, or
    /// [`ScriptValue::Nil`] if the field is not defined.
    fn call_global_field(&self, global: &str, field: &str, args: &[ScriptValue]) -> ScriptValue;
}
