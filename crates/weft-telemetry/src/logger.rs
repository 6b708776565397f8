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

//! Global logger installation backed by `env_logger`.

use crate::config::LogConfig;
use anyhow::{Context, Result};
use env_logger::{Builder, Env};

/// Builds an `env_logger` builder from `config`.
///
/// `RUST_LOG` overrides the configured default level, per-module filters are
/// applied on top.
pub(crate) fn builder(config: &LogConfig) -> Result<Builder> {
    // Validate before handing the string to env_logger, which ignores junk.
    config.level_filter()?;

    let mut builder = Builder::from_env(Env::default().default_filter_or(config.level.as_str()));
    for (module, level) in config.module_filters()? {
        builder.filter_module(module, level);
    }
    builder.write_style(config.write_style()?);
    if !config.timestamps {
        builder.format_timestamp(None);
    }
    Ok(builder)
}

/// Installs the global logger.
///
/// ## Errors
/// Fails if `config` is invalid or if a global logger is already installed.
pub fn try_init_logging(config: &LogConfig) -> Result<()> {
    builder(config)?
        .try_init()
        .context("a global logger is already installed")?;
    log::debug!("Logging initialized at level '{}'.", config.level);
    Ok(())
}

/// Installs the global logger, keeping the existing one if there is one.
///
/// ## Errors
/// Fails only if `config` is invalid.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let mut builder = builder(config)?;
    if builder.try_init().is_err() {
        log::warn!("A global logger is already installed; keeping it.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_rejects_invalid_config() {
        let config = LogConfig {
            write_style: "sometimes".to_string(),
            ..LogConfig::default()
        };
        assert!(builder(&config).is_err());

        let config = LogConfig {
            level: "chatty".to_string(),
            ..LogConfig::default()
        };
        assert!(init_logging(&config).is_err());
    }

    // The only test in this crate that installs the global logger.
    #[test]
    fn test_second_installation() {
        let mut config = LogConfig::default();
        config
            .filters
            .insert("weft_telemetry".to_string(), "trace".to_string());

        assert!(try_init_logging(&config).is_ok());
        assert!(try_init_logging(&config).is_err());
        assert!(init_logging(&config).is_ok());
    }
}
