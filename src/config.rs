use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ExportError, Result};
use crate::exporter::ExportSettings;
use crate::pipeline::ExportOptions;

/// Contents of an export configuration file.
///
/// ```toml
/// [export]
/// include_children = true
/// center_vertical = false
///
/// [exporter]
/// axis_forward = "-Z"
/// axis_up = "Y"
/// shading = "flat"
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub export: ExportSection,
    pub exporter: ExportSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportSection {
    pub include_children: bool,
    pub center_vertical: bool,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            include_children: true,
            center_vertical: false,
        }
    }
}

impl ExportConfig {
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)
            .map_err(|e| ExportError::Config(format!("Failed to parse TOML: {e}")))?;
        config.exporter.validate()?;
        Ok(config)
    }

    pub fn options(&self) -> ExportOptions {
        ExportOptions {
            include_children: self.export.include_children,
            center_vertical: self.export.center_vertical,
            settings: self.exporter.clone(),
        }
    }
}

/// Loads and validates a configuration file.
pub fn load_config(path: impl AsRef<Path>) -> Result<ExportConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        ExportError::Config(format!(
            "Failed to read configuration file {}: {e}",
            path.display()
        ))
    })?;
    ExportConfig::from_toml(&contents)
}
