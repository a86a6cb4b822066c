// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Engine configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! device_index = 0
//! device_memory = "4G"
//!
//! [[models]]
//! id = "m1"
//! name = "mobilenet-v2"
//! path = "./models/mobilenet-v2.plan"
//!
//! [[models]]
//! id = "m2"
//! name = "yolo-v4"
//! path = "./models/yolo-v4.plan"
//! ```

use crate::{EngineError, ModelId};
use compute_device::DeviceCapacity;
use std::path::{Path, PathBuf};

/// Configuration for the execution engine.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Index of the compute device to open.
    #[serde(default)]
    pub device_index: usize,
    /// Device memory capacity (human-readable, e.g., `"4G"`).
    #[serde(default = "default_device_memory")]
    pub device_memory: String,
    /// Models to load at startup.
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

/// One model entry in the configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelConfig {
    /// Registry identifier; reloading the same id replaces the prior model.
    pub id: ModelId,
    /// Descriptor label.
    pub name: String,
    /// Path to the artifact directory.
    pub path: PathBuf,
}

fn default_device_memory() -> String {
    "4G".to_string()
}

impl EngineConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, EngineError> {
        toml::from_str(toml_str)
            .map_err(|e| EngineError::Config(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, EngineError> {
        toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("TOML serialise error: {e}")))
    }

    /// Parses the device memory string into a [`DeviceCapacity`].
    pub fn parse_capacity(&self) -> Result<DeviceCapacity, EngineError> {
        DeviceCapacity::parse(&self.device_memory)
            .map_err(|e| EngineError::Config(format!("invalid device_memory: {e}")))
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            device_memory: default_device_memory(),
            models: Vec::new(),
        }
    }
}
