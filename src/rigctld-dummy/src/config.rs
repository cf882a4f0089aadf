// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Daemon configuration, loaded from a TOML file with CLI overrides.

use std::net::{IpAddr, Ipv4Addr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use rigctl_core::mode::Mode;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DummyConfig {
    pub general: GeneralConfig,
    pub listen: ListenConfig,
    pub rig: RigConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListenConfig {
    pub address: IpAddr,
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        ListenConfig {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 4532,
        }
    }
}

/// Initial state of the emulated rig.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RigConfig {
    pub freq_hz: f64,
    pub mode: Mode,
    pub passband_hz: i32,
}

impl Default for RigConfig {
    fn default() -> Self {
        RigConfig {
            freq_hz: 14_074_000.0,
            mode: Mode::USB,
            passband_hz: 2400,
        }
    }
}

impl DummyConfig {
    pub fn load(path: &Path) -> Result<DummyConfig, String> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        toml::from_str(&text).map_err(|e| format!("cannot parse {}: {}", path.display(), e))
    }

    pub fn validate(&self) -> Result<(), String> {
        if !LOG_LEVELS.contains(&self.general.log_level.as_str()) {
            return Err(format!(
                "invalid log level '{}', expected one of {:?}",
                self.general.log_level, LOG_LEVELS
            ));
        }
        if self.listen.port == 0 {
            return Err("listen port must be non-zero".to_string());
        }
        if self.rig.freq_hz <= 0.0 {
            return Err("initial frequency must be positive".to_string());
        }
        if self.rig.mode == Mode::Invalid {
            return Err("initial mode must be a real mode".to_string());
        }
        if self.rig.passband_hz < 0 {
            return Err("initial passband must not be negative".to_string());
        }
        Ok(())
    }

    pub fn example_toml() -> String {
        toml::to_string_pretty(&DummyConfig::default())
            .unwrap_or_else(|e| format!("# config serialization failed: {}", e))
    }
}
