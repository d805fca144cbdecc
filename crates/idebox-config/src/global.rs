//! Global configuration for idebox
//!
//! Located at `~/.config/idebox/config.toml`

use crate::{ConfigError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global idebox configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    pub defaults: DefaultsConfig,
}

/// Default settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Default container provider ("docker" or "podman")
    pub provider: String,
    /// Root directory for per-IDE state (lock files, lineage, workspaces).
    /// Falls back to the platform data directory when unset.
    pub state_root: Option<PathBuf>,
    /// Root directory for downloaded IDE artifacts.
    /// Falls back to the platform cache directory when unset.
    pub cache_root: Option<PathBuf>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            provider: String::new(), // Empty means auto-detect on first run
            state_root: None,
            cache_root: None,
        }
    }
}

impl GlobalConfig {
    /// Load global configuration from the default path
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    /// Load global configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::TomlParseError {
            path: path.clone(),
            source: e,
        })?;

        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
                path: path.clone(),
                source: e,
            })?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))?;

        std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
            path: path.clone(),
            source: e,
        })
    }

    /// Get the default config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "idebox").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Directory holding IDE type descriptors (`<config_dir>/types/<name>.toml`)
    pub fn types_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "idebox").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("types"))
    }

    /// Root directory for per-IDE state, honoring `defaults.state_root`
    pub fn state_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.defaults.state_root {
            return Ok(root.clone());
        }
        let dirs = ProjectDirs::from("", "", "idebox").ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Root directory for the download cache, honoring `defaults.cache_root`
    pub fn cache_root(&self) -> Result<PathBuf> {
        if let Some(root) = &self.defaults.cache_root {
            return Ok(root.clone());
        }
        let dirs = ProjectDirs::from("", "", "idebox").ok_or(ConfigError::NoDataDir)?;
        Ok(dirs.cache_dir().to_path_buf())
    }

    /// State directory for a single IDE type
    pub fn ide_state_dir(&self, ide_type: &str) -> Result<PathBuf> {
        Ok(self.state_root()?.join(ide_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GlobalConfig::default();
        assert!(
            config.defaults.provider.is_empty(),
            "Provider should be empty for auto-detection"
        );
        assert!(config.defaults.state_root.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[defaults]
provider = "podman"
state_root = "/var/lib/idebox"
"#;

        let config: GlobalConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.defaults.provider, "podman");
        assert_eq!(
            config.defaults.state_root,
            Some(PathBuf::from("/var/lib/idebox"))
        );
    }

    #[test]
    fn test_state_root_override() {
        let mut config = GlobalConfig::default();
        config.defaults.state_root = Some(PathBuf::from("/tmp/idebox-state"));
        assert_eq!(
            config.ide_state_dir("sublime").unwrap(),
            PathBuf::from("/tmp/idebox-state/sublime")
        );
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = GlobalConfig::default();
        config.defaults.provider = "docker".to_string();
        config.save_to(&path).unwrap();

        let loaded = GlobalConfig::load_from(&path).unwrap();
        assert_eq!(loaded.defaults.provider, "docker");
    }
}
