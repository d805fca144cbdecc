//! Container provider trait and implementations for idebox
//!
//! This crate provides an abstraction over container runtimes (Docker, Podman)
//! with the operations the snapshot lifecycle needs: image build, container
//! run/remove, commit, and image queries.

mod cli;
mod error;
mod types;

pub use cli::CliProvider;
pub use error::*;
pub use types::*;

use async_trait::async_trait;

/// Trait for container providers (Docker, Podman)
#[async_trait]
pub trait ContainerProvider: Send + Sync {
    /// Build an image from a Dockerfile
    async fn build(&self, config: &BuildConfig) -> Result<()>;

    /// Return the image tag a named container is running, or None when the
    /// container does not exist. Running state is always derived from the
    /// runtime, never cached.
    async fn running_snapshot(&self, container: &str) -> Result<Option<String>>;

    /// List the tags present for an image repository
    async fn list_image_tags(&self, repository: &str) -> Result<Vec<String>>;

    /// Commit a running container's filesystem to a new image
    async fn commit(&self, container: &str, image: &str) -> Result<()>;

    /// Remove an image
    async fn remove_image(&self, image: &str) -> Result<()>;

    /// Run a detached container
    async fn run(&self, config: &RunContainerConfig) -> Result<ContainerId>;

    /// Force-remove a container
    async fn remove_container(&self, container: &str) -> Result<()>;

    /// Check if the provider is available/connected
    async fn ping(&self) -> Result<()>;

    /// Get provider information
    fn info(&self) -> ProviderInfo;
}

/// Factory function to create a provider based on type
pub async fn create_provider(provider_type: ProviderType) -> Result<Box<dyn ContainerProvider>> {
    match provider_type {
        ProviderType::Docker => Ok(Box::new(CliProvider::new_docker().await?)),
        ProviderType::Podman => Ok(Box::new(CliProvider::new_podman().await?)),
    }
}

/// Test if a specific provider is available and responsive
pub async fn test_provider_connectivity(provider_type: ProviderType) -> bool {
    create_provider(provider_type).await.is_ok()
}

/// Detect which providers are available on the system
/// Returns a list of (ProviderType, is_available) pairs, Docker first
pub async fn detect_available_providers() -> Vec<(ProviderType, bool)> {
    let (docker, podman) = tokio::join!(
        test_provider_connectivity(ProviderType::Docker),
        test_provider_connectivity(ProviderType::Podman)
    );

    vec![
        (ProviderType::Docker, docker),
        (ProviderType::Podman, podman),
    ]
}

/// Create the default provider based on global config
/// If provider is not configured (empty), auto-detects by trying Docker first, then Podman
pub async fn create_default_provider(
    config: &idebox_config::GlobalConfig,
) -> Result<Box<dyn ContainerProvider>> {
    let provider_type = match config.defaults.provider.as_str() {
        "podman" => ProviderType::Podman,
        "docker" => ProviderType::Docker,
        "" => {
            tracing::info!("No provider configured, auto-detecting...");
            let available = detect_available_providers().await;
            let detected = available.iter().find(|(_, ok)| *ok);

            match detected {
                Some((provider_type, _)) => {
                    tracing::info!("Auto-detected provider: {}", provider_type);
                    *provider_type
                }
                None => {
                    // Neither available; default to Docker for better error messages
                    tracing::warn!("No providers detected, defaulting to Docker");
                    ProviderType::Docker
                }
            }
        }
        other => {
            return Err(ProviderError::ConnectionError(format!(
                "Unknown provider '{}' in config, expected 'docker' or 'podman'",
                other
            )))
        }
    };

    create_provider(provider_type).await
}
