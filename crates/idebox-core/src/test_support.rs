//! Test support utilities for idebox-core
//!
//! Provides MockProvider and helpers for unit testing the IdeManager
//! without requiring a real Docker/Podman runtime.

use async_trait::async_trait;
use idebox_provider::*;
use std::sync::{Arc, Mutex};

/// Records which methods were called on the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    Build { tag: String },
    RunningSnapshot { container: String },
    ListImageTags { repository: String },
    Commit { container: String, image: String },
    RemoveImage { image: String },
    Run { name: String, image: String },
    RemoveContainer { container: String },
    Ping,
}

/// Stateful mock container provider for testing.
///
/// Tracks the image tags of one repository and the image the single
/// container runs, so lifecycle sequences behave like a real runtime:
/// `run` sets the running image, `commit` adds a tag, `remove_container`
/// clears the running image.
pub struct MockProvider {
    pub provider_type: ProviderType,
    pub calls: Arc<Mutex<Vec<MockCall>>>,
    /// Tags present in the mocked repository
    pub tags: Arc<Mutex<Vec<String>>>,
    /// Image reference the mocked container is running, if any
    pub running_image: Arc<Mutex<Option<String>>>,
    /// Error injected into build calls
    pub build_error: Arc<Mutex<Option<ProviderError>>>,
    /// Error injected into commit calls
    pub commit_error: Arc<Mutex<Option<ProviderError>>>,
    /// Error injected into remove_image calls
    pub remove_image_error: Arc<Mutex<Option<ProviderError>>>,
    /// Error injected into run calls
    pub run_error: Arc<Mutex<Option<ProviderError>>>,
}

impl MockProvider {
    /// Create a mock with no images and nothing running
    pub fn new() -> Self {
        Self {
            provider_type: ProviderType::Docker,
            calls: Arc::new(Mutex::new(Vec::new())),
            tags: Arc::new(Mutex::new(Vec::new())),
            running_image: Arc::new(Mutex::new(None)),
            build_error: Arc::new(Mutex::new(None)),
            commit_error: Arc::new(Mutex::new(None)),
            remove_image_error: Arc::new(Mutex::new(None)),
            run_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Create a mock whose repository already holds the given tags
    pub fn with_tags(tags: &[&str]) -> Self {
        let mock = Self::new();
        *mock.tags.lock().unwrap() = tags.iter().map(|t| t.to_string()).collect();
        mock
    }

    /// Shared handles for asserting on state after the manager consumed
    /// the provider.
    pub fn handles(&self) -> MockHandles {
        MockHandles {
            calls: self.calls.clone(),
            tags: self.tags.clone(),
            running_image: self.running_image.clone(),
        }
    }

    /// Mark the container as running the given image reference
    pub fn set_running(&self, image: &str) {
        *self.running_image.lock().unwrap() = Some(image.to_string());
    }

    fn record(&self, call: MockCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn take_error(slot: &Arc<Mutex<Option<ProviderError>>>) -> Option<ProviderError> {
        slot.lock().unwrap().take()
    }

    fn tag_of(image: &str) -> String {
        image
            .rsplit_once(':')
            .map(|(_, tag)| tag.to_string())
            .unwrap_or_else(|| image.to_string())
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Cloneable view of the mock's shared state
#[derive(Clone)]
pub struct MockHandles {
    pub calls: Arc<Mutex<Vec<MockCall>>>,
    pub tags: Arc<Mutex<Vec<String>>>,
    pub running_image: Arc<Mutex<Option<String>>>,
}

impl MockHandles {
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn run_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockCall::Run { .. }))
            .count()
    }

    pub fn tags(&self) -> Vec<String> {
        self.tags.lock().unwrap().clone()
    }

    pub fn running_image(&self) -> Option<String> {
        self.running_image.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContainerProvider for MockProvider {
    async fn build(&self, config: &BuildConfig) -> Result<()> {
        self.record(MockCall::Build {
            tag: config.tag.clone(),
        });
        if let Some(err) = Self::take_error(&self.build_error) {
            return Err(err);
        }
        self.tags.lock().unwrap().push(Self::tag_of(&config.tag));
        Ok(())
    }

    async fn running_snapshot(&self, container: &str) -> Result<Option<String>> {
        self.record(MockCall::RunningSnapshot {
            container: container.to_string(),
        });
        Ok(self
            .running_image
            .lock()
            .unwrap()
            .as_deref()
            .map(Self::tag_of))
    }

    async fn list_image_tags(&self, repository: &str) -> Result<Vec<String>> {
        self.record(MockCall::ListImageTags {
            repository: repository.to_string(),
        });
        Ok(self.tags.lock().unwrap().clone())
    }

    async fn commit(&self, container: &str, image: &str) -> Result<()> {
        self.record(MockCall::Commit {
            container: container.to_string(),
            image: image.to_string(),
        });
        if let Some(err) = Self::take_error(&self.commit_error) {
            return Err(err);
        }
        self.tags.lock().unwrap().push(Self::tag_of(image));
        Ok(())
    }

    async fn remove_image(&self, image: &str) -> Result<()> {
        self.record(MockCall::RemoveImage {
            image: image.to_string(),
        });
        if let Some(err) = Self::take_error(&self.remove_image_error) {
            return Err(err);
        }
        let tag = Self::tag_of(image);
        self.tags.lock().unwrap().retain(|t| *t != tag);
        Ok(())
    }

    async fn run(&self, config: &RunContainerConfig) -> Result<ContainerId> {
        self.record(MockCall::Run {
            name: config.name.clone(),
            image: config.image.clone(),
        });
        if let Some(err) = Self::take_error(&self.run_error) {
            return Err(err);
        }
        *self.running_image.lock().unwrap() = Some(config.image.clone());
        Ok(ContainerId::new("mock-container-id"))
    }

    async fn remove_container(&self, container: &str) -> Result<()> {
        self.record(MockCall::RemoveContainer {
            container: container.to_string(),
        });
        *self.running_image.lock().unwrap() = None;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.record(MockCall::Ping);
        Ok(())
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            provider_type: self.provider_type,
            version: Some("mock".to_string()),
        }
    }
}
