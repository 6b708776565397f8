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

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use weft_telemetry::LogConfig;

/// Run parameters of the sandbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Number of producer threads.
    pub producers: usize,
    /// Samples each producer emits before stopping.
    pub samples_per_producer: usize,
    /// Sample values at or above this raise an incident.
    pub alert_threshold: f64,
    /// Logger settings.
    pub log: LogConfig,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            producers: 3,
            samples_per_producer: 40,
            alert_threshold: 0.9,
            log: LogConfig::default(),
        }
    }
}

impl SandboxConfig {
    /// Load sandbox configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load sandbox configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read sandbox config {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse sandbox config {}", path.display()))
    }

    /// Loads the file named by the first command-line argument, if any.
    pub fn from_args(mut args: impl Iterator<Item = String>) -> Result<Self> {
        let config = match args.nth(1) {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        ensure!(self.producers > 0, "at least one producer is required");
        ensure!(
            (0.0..=1.0).contains(&self.alert_threshold),
            "alert_threshold must lie in [0, 1], got {}",
            self.alert_threshold
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_argument() {
        let config = SandboxConfig::from_args(["sandbox".to_string()].into_iter()).unwrap();
        assert_eq!(config, SandboxConfig::default());
    }

    #[test]
    fn test_loads_file_named_on_command_line() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("sandbox.json");
        let config = SandboxConfig {
            producers: 2,
            samples_per_producer: 5,
            ..SandboxConfig::default()
        };
        std::fs::write(&path, serde_json::to_string_pretty(&config)?)?;

        let args = ["sandbox".to_string(), path.display().to_string()];
        assert_eq!(SandboxConfig::from_args(args.into_iter())?, config);
        Ok(())
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let config = SandboxConfig::from_json(r#"{ "alert_threshold": 1.5 }"#).unwrap();
        assert!(config.validate().is_err());
    }
}
