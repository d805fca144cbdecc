//! IDE type descriptors
//!
//! Each supported IDE type is described by a TOML file at
//! `<config_dir>/types/<name>.toml`. The descriptor names the artifact
//! to download and the base image to build on top of.

use crate::{ConfigError, GlobalConfig, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Descriptor for one IDE type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdeTypeConfig {
    /// IDE type name, matching the descriptor file stem
    pub name: String,
    /// URL of the IDE artifact to download into the build context
    pub download: String,
    /// Base image for the generated Dockerfile
    #[serde(default = "default_base_image")]
    pub base_image: String,
    /// Optional extra install command run during the image build
    #[serde(default)]
    pub install_command: Option<String>,
}

fn default_base_image() -> String {
    "ubuntu:22.04".to_string()
}

impl IdeTypeConfig {
    /// Load a descriptor by IDE type name from the default types directory
    pub fn load(name: &str) -> Result<Self> {
        let dir = GlobalConfig::types_dir()?;
        Self::load_from_dir(&dir, name)
    }

    /// Load a descriptor by IDE type name from a specific directory
    pub fn load_from_dir(dir: &Path, name: &str) -> Result<Self> {
        let path = dir.join(format!("{}.toml", name));
        if !path.exists() {
            return Err(ConfigError::UnknownIdeType(name.to_string()));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            path: path.clone(),
            source: e,
        })?;

        if config.name != name {
            return Err(ConfigError::Invalid(format!(
                "descriptor name '{}' does not match file '{}'",
                config.name, name
            )));
        }

        Ok(config)
    }

    /// List IDE type names with a descriptor in the given directory
    pub fn list_from_dir(dir: &Path) -> Result<Vec<String>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::ReadError {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::ReadError {
                path: dir.to_path_buf(),
                source: e,
            })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("toml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// List IDE type names from the default types directory
    pub fn list() -> Result<Vec<String>> {
        let dir = GlobalConfig::types_dir()?;
        Self::list_from_dir(&dir)
    }
}
