// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings serialization and deserialization.
//!
//! This module reads and writes `Settings` in YAML and JSON formats, picked
//! by file extension.

use crate::models::settings::Settings;
use anyhow::{bail, Context, Result};
use std::path::Path;

/// Settings file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|s| s.to_str());
        match extension {
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            Some("json") => Ok(Format::Json),
            _ => bail!("Unsupported settings file extension: {:?}", extension),
        }
    }

    fn encode(self, settings: &Settings) -> Result<String> {
        Ok(match self {
            Format::Yaml => serde_yaml::to_string(settings)?,
            Format::Json => serde_json::to_string_pretty(settings)?,
        })
    }

    fn decode(self, text: &str) -> Result<Settings> {
        Ok(match self {
            Format::Yaml => serde_yaml::from_str(text)?,
            Format::Json => serde_json::from_str(text)?,
        })
    }
}

/// Load settings, choosing the format by extension.
pub fn load_settings(path: &Path) -> Result<Settings> {
    let format = Format::from_path(path)?;
    let settings = std::fs::read_to_string(path)
        .map_err(anyhow::Error::from)
        .and_then(|text| format.decode(&text))
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;

    log::info!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Save settings, choosing the format by extension.
pub fn save_settings(settings: &Settings, path: &Path) -> Result<()> {
    let text = Format::from_path(path)?.encode(settings)?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to save settings to {}", path.display()))?;

    log::info!("Saved settings to {}", path.display());
    Ok(())
}
