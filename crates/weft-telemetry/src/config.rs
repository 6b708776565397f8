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

//! Serializable logging configuration.

use anyhow::{bail, Context, Result};
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

/// How the logger should render its output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Default level for every module (e.g., "info", "debug").
    /// `RUST_LOG` still takes precedence when set.
    pub level: String,
    /// Per-module level overrides (e.g., "weft_core::event" -> "trace").
    pub filters: BTreeMap<String, String>,
    /// Prefix every record with a timestamp.
    pub timestamps: bool,
    /// Color policy: "auto", "always" or "never".
    pub write_style: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            filters: BTreeMap::new(),
            timestamps: true,
            write_style: "auto".to_string(),
        }
    }
}

impl LogConfig {
    /// Load logging configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load logging configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read log config {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("failed to parse log config {}", path.display()))
    }

    /// Save logging configuration to JSON file
    pub fn to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write log config {}", path.display()))?;
        Ok(())
    }

    /// The parsed default level.
    pub fn level_filter(&self) -> Result<LevelFilter> {
        parse_level(&self.level)
    }

    /// The parsed per-module overrides, in module-name order.
    pub fn module_filters(&self) -> Result<Vec<(&str, LevelFilter)>> {
        self.filters
            .iter()
            .map(|(module, level)| {
                parse_level(level)
                    .map(|filter| (module.as_str(), filter))
                    .with_context(|| format!("invalid filter for module '{module}'"))
            })
            .collect()
    }

    /// The parsed color policy.
    pub fn write_style(&self) -> Result<env_logger::WriteStyle> {
        match self.write_style.to_ascii_lowercase().as_str() {
            "auto" => Ok(env_logger::WriteStyle::Auto),
            "always" => Ok(env_logger::WriteStyle::Always),
            "never" => Ok(env_logger::WriteStyle::Never),
            other => bail!("unknown write style '{other}'"),
        }
    }
}

fn parse_level(level: &str) -> Result<LevelFilter> {
    LevelFilter::from_str(level).with_context(|| format!("unknown log level '{level}'"))
}
