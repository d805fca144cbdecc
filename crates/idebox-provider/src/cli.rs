//! CLI-based container provider for Docker and Podman
//!
//! Uses direct CLI commands instead of API for:
//! - Simpler implementation
//! - Automatic credential handling (via ~/.docker/config.json)
//! - Works with Docker alternatives (Colima, Rancher, Lima, OrbStack)

use crate::{
    BuildConfig, ContainerId, ContainerProvider, ProviderError, ProviderInfo, ProviderType,
    Result, RunContainerConfig,
};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// CLI-based container provider for Docker and Podman
pub struct CliProvider {
    /// Command to use ("docker" or "podman")
    cmd: String,
    /// Provider type
    provider_type: ProviderType,
}

impl CliProvider {
    /// Create a new Docker provider
    pub async fn new_docker() -> Result<Self> {
        let provider = Self {
            cmd: "docker".to_string(),
            provider_type: ProviderType::Docker,
        };

        // Test connection
        provider.ping().await?;
        Ok(provider)
    }

    /// Create a new Podman provider
    pub async fn new_podman() -> Result<Self> {
        let provider = Self {
            cmd: "podman".to_string(),
            provider_type: ProviderType::Podman,
        };

        // Test connection
        provider.ping().await?;
        Ok(provider)
    }

    /// Run a command and get stdout
    async fn run_cmd(&self, args: &[&str]) -> Result<String> {
        tracing::debug!("{} {}", self.cmd, args.join(" "));

        let output = Command::new(&self.cmd)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| ProviderError::RuntimeError(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProviderError::RuntimeError(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Surface a missing image as `ImageNotFound` instead of a raw runtime error
fn map_rmi_error(image: &str, err: ProviderError) -> ProviderError {
    match err {
        ProviderError::RuntimeError(msg)
            if msg.contains("No such image") || msg.contains("image not known") =>
        {
            ProviderError::ImageNotFound(image.to_string())
        }
        other => other,
    }
}

#[async_trait]
impl ContainerProvider for CliProvider {
    async fn build(&self, config: &BuildConfig) -> Result<()> {
        let context = config.context.to_string_lossy().to_string();
        let args = vec![
            "build",
            "-t",
            &config.tag,
            "-f",
            &config.dockerfile,
            &context,
        ];

        // Stream build output through to the terminal
        let status = Command::new(&self.cmd)
            .args(&args)
            .current_dir(&config.context)
            .status()
            .await
            .map_err(|e| ProviderError::BuildError(e.to_string()))?;

        if !status.success() {
            return Err(ProviderError::BuildError(format!(
                "build of '{}' exited with {}",
                config.tag, status
            )));
        }

        Ok(())
    }

    async fn running_snapshot(&self, container: &str) -> Result<Option<String>> {
        // Inspect fails when the container does not exist; that simply means
        // nothing is running.
        let output = match self
            .run_cmd(&["inspect", "--format", "{{.Config.Image}}", container])
            .await
        {
            Ok(out) => out,
            Err(_) => return Ok(None),
        };

        let image = output.trim();
        if image.is_empty() {
            return Ok(None);
        }

        // The snapshot name is the tag after the last ':'
        match image.rsplit_once(':') {
            Some((_, tag)) => Ok(Some(tag.to_string())),
            None => Ok(Some(image.to_string())),
        }
    }

    async fn list_image_tags(&self, repository: &str) -> Result<Vec<String>> {
        let output = self
            .run_cmd(&["images", repository, "--format", "{{.Tag}}"])
            .await?;

        let tags = output
            .lines()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "<none>")
            .map(String::from)
            .collect();

        Ok(tags)
    }

    async fn commit(&self, container: &str, image: &str) -> Result<()> {
        self.run_cmd(&["commit", container, image]).await?;
        Ok(())
    }

    async fn remove_image(&self, image: &str) -> Result<()> {
        match self.run_cmd(&["rmi", "-f", image]).await {
            Ok(_) => Ok(()),
            Err(e) => Err(map_rmi_error(image, e)),
        }
    }

    async fn run(&self, config: &RunContainerConfig) -> Result<ContainerId> {
        let mut args: Vec<String> = vec![
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            config.name.clone(),
        ];

        for port in &config.ports {
            args.push("-p".to_string());
            args.push(format!("{}:{}", port.host, port.container));
        }

        let mut env: Vec<_> = config.env.iter().collect();
        env.sort();
        for (key, value) in env {
            args.push("-e".to_string());
            args.push(format!("{}={}", key, value));
        }

        for bind in &config.binds {
            args.push("-v".to_string());
            args.push(bind.to_bind_string());
        }

        args.push(config.image.clone());

        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let output = self.run_cmd(&arg_refs).await?;

        Ok(ContainerId::new(output.trim()))
    }

    async fn remove_container(&self, container: &str) -> Result<()> {
        self.run_cmd(&["rm", "-f", container]).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.run_cmd(&["version", "--format", "{{.Client.Version}}"])
            .await
            .map_err(|e| {
                ProviderError::ConnectionError(format!(
                    "{} is not available: {}",
                    self.cmd, e
                ))
            })?;
        Ok(())
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            provider_type: self.provider_type,
            version: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rmi_missing_image_maps_to_image_not_found() {
        let err = map_rmi_error(
            "idebox-foo:s1",
            ProviderError::RuntimeError("Error: No such image: idebox-foo:s1".to_string()),
        );
        assert!(matches!(err, ProviderError::ImageNotFound(image) if image == "idebox-foo:s1"));
    }

    #[test]
    fn rmi_other_errors_pass_through() {
        let err = map_rmi_error(
            "idebox-foo:s1",
            ProviderError::RuntimeError("daemon not reachable".to_string()),
        );
        assert!(matches!(err, ProviderError::RuntimeError(_)));
    }
}

