//! Runtime configuration for starting a container
//!
//! Holds the port, password, and mount choices made on the command line.
//! Mount strings are validated here, before any container command runs.

use crate::{ConfigError, Result};
use serde::{Deserialize, Serialize};

/// Web (noVNC) port published on the host when none is given
pub const DEFAULT_WEB_PORT: u16 = 6080;

/// Options applied when starting a container
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Host port for the web (noVNC) endpoint
    pub web_port: u16,
    /// Host port for the raw VNC endpoint; unpublished when unset
    pub vnc_port: Option<u16>,
    /// Password for the web endpoint
    pub web_password: Option<String>,
    /// Password for the VNC endpoint
    pub vnc_password: Option<String>,
    /// Extra bind mounts, comma-separated `host:container[:mode]` entries
    pub mount: Option<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            web_port: DEFAULT_WEB_PORT,
            vnc_port: None,
            web_password: None,
            vnc_password: None,
            mount: None,
        }
    }
}

/// One validated bind mount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountEntry {
    pub source: String,
    pub target: String,
    pub mode: Option<String>,
}

impl MountEntry {
    /// Parse a `host:container[:mode]` string
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.split(':').collect();
        match parts.as_slice() {
            [source, target] if !source.is_empty() && !target.is_empty() => Ok(Self {
                source: source.to_string(),
                target: target.to_string(),
                mode: None,
            }),
            [source, target, mode]
                if !source.is_empty() && !target.is_empty() && !mode.is_empty() =>
            {
                Ok(Self {
                    source: source.to_string(),
                    target: target.to_string(),
                    mode: Some(mode.to_string()),
                })
            }
            _ => Err(ConfigError::InvalidMount(raw.to_string())),
        }
    }

    /// Render back to the `host:container[:mode]` form docker expects
    pub fn to_bind_string(&self) -> String {
        match &self.mode {
            Some(mode) => format!("{}:{}:{}", self.source, self.target, mode),
            None => format!("{}:{}", self.source, self.target),
        }
    }
}

impl RuntimeConfig {
    /// Validate and return the extra mounts, if any were given
    pub fn mount_entries(&self) -> Result<Vec<MountEntry>> {
        let Some(raw) = &self.mount else {
            return Ok(Vec::new());
        };

        raw.trim()
            .split(',')
            .filter(|item| !item.trim().is_empty())
            .map(|item| MountEntry::parse(item.trim()))
            .collect()
    }
}
