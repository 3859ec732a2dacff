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

//! Application configuration.

use pulse_control::StrategyKind;
use pulse_telemetry::DEFAULT_FPS_CEILING;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading or validating an [`AppConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config file '{}': {source}", .path.display())]
    Io {
        /// The file that was read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The JSON was malformed or had wrongly typed fields.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    /// A value is out of range.
    #[error("invalid config value for '{field}': {reason}")]
    Invalid {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Runtime configuration. Every field has a default, so partial JSON is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Application name, used for the window title and logs.
    pub name: String,
    /// Sprite size handed to the draw pool.
    pub sprite_size: u32,
    /// Task pool size. `0` picks one less than the available cores, at least one.
    pub worker_threads: usize,
    /// Forces an execution strategy instead of the compile-time choice.
    pub strategy: Option<StrategyKind>,
    /// Requests vsync-limited presentation.
    pub vsync: bool,
    /// User max-FPS setting, `0` when unset.
    pub max_fps: u32,
    /// User target-FPS setting, `0` when unset.
    pub target_fps: u32,
    /// Cap applied to the map-processing loop when any FPS constraint is set.
    pub fps_ceiling: u32,
    /// Sleep between iterations while the window is hidden, in milliseconds.
    pub throttle_interval_ms: u64,
    /// Frame-rate measurement window, in milliseconds.
    pub measurement_window_ms: u64,
    /// Brings the audio subsystem up.
    pub audio: bool,
    /// Content is encrypted; async texture loading is then forced off.
    pub encrypted: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Pulse".to_string(),
            sprite_size: 32,
            worker_threads: 0,
            strategy: None,
            vsync: false,
            max_fps: 0,
            target_fps: 0,
            fps_ceiling: DEFAULT_FPS_CEILING,
            throttle_interval_ms: 10,
            measurement_window_ms: 1000,
            audio: false,
            encrypted: false,
        }
    }
}

impl AppConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded config from '{}'.", path.display());
        Ok(config)
    }

    /// Rejects out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sprite_size == 0 {
            return Err(invalid("sprite_size", "must be positive"));
        }
        if self.fps_ceiling == 0 {
            return Err(invalid("fps_ceiling", "must be positive"));
        }
        if !(1..=50).contains(&self.throttle_interval_ms) {
            return Err(invalid(
                "throttle_interval_ms",
                format!("{} is outside 1..=50", self.throttle_interval_ms),
            ));
        }
        if self.measurement_window_ms == 0 {
            return Err(invalid("measurement_window_ms", "must be positive"));
        }
        Ok(())
    }

    /// The task pool size after resolving `0` to an automatic value.
    pub fn resolved_worker_threads(&self) -> usize {
        if self.worker_threads > 0 {
            return self.worker_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get().saturating_sub(1))
            .unwrap_or(1)
            .max(1)
    }

    /// The execution strategy to use.
    pub fn strategy_kind(&self) -> StrategyKind {
        self.strategy.unwrap_or_else(StrategyKind::for_target)
    }

    /// Sleep between iterations while the window is hidden.
    pub fn throttle_interval(&self) -> Duration {
        Duration::from_millis(self.throttle_interval_ms)
    }

    /// Frame-rate measurement window.
    pub fn measurement_window(&self) -> Duration {
        Duration::from_millis(self.measurement_window_ms)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.fps_ceiling, 500);
        assert_eq!(config.throttle_interval(), Duration::from_millis(10));
        assert_eq!(config.measurement_window(), Duration::from_secs(1));
        assert!(config.resolved_worker_threads() >= 1);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            AppConfig::from_json_str(r#"{ "name": "demo", "strategy": "cooperative_single_thread" }"#)
                .unwrap();
        assert_eq!(config.name, "demo");
        assert_eq!(config.strategy_kind(), StrategyKind::CooperativeSingleThread);
        assert_eq!(config.sprite_size, 32);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for json in [
            r#"{ "throttle_interval_ms": 0 }"#,
            r#"{ "throttle_interval_ms": 51 }"#,
            r#"{ "measurement_window_ms": 0 }"#,
            r#"{ "sprite_size": 0 }"#,
            r#"{ "fps_ceiling": 0 }"#,
        ] {
            assert!(
                matches!(AppConfig::from_json_str(json), Err(ConfigError::Invalid { .. })),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        assert!(matches!(
            AppConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            AppConfig::from_json_str(r#"{ "strategy": "threads_everywhere" }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn explicit_worker_count_is_kept() {
        let config = AppConfig {
            worker_threads: 3,
            ..AppConfig::default()
        };
        assert_eq!(config.resolved_worker_threads(), 3);
    }

    #[test]
    fn load_reads_a_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_fps": 60, "encrypted": true }}"#).unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.max_fps, 60);
        assert!(config.encrypted);
    }

    #[test]
    fn load_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let err = AppConfig::load(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }
}
