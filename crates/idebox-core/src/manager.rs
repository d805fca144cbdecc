//! IDE lifecycle coordination
//!
//! `IdeManager` ties the container provider, the lineage store, and the
//! per-IDE-type lock together. Every mutating operation holds the lock for
//! its full duration, so the runtime call and the lineage update it implies
//! are never interleaved with another process. Queries never lock.

use crate::build::{BuildContext, CONTAINER_VNC_PORT, CONTAINER_WEB_PORT};
use crate::download::fetch_artifact;
use crate::lineage::LineageStore;
use crate::lock::IdeLock;
use crate::{CoreError, Result};
use idebox_config::{GlobalConfig, IdeTypeConfig, MountEntry, RuntimeConfig};
use idebox_provider::{BuildConfig, ContainerProvider, PortBinding, RunContainerConfig};
use std::collections::HashMap;
use std::path::PathBuf;

/// Name of the root snapshot created by `build`
pub const ROOT_SNAPSHOT: &str = "v0";

const LINEAGE_FILE: &str = "lineage.json";
const LOCK_FILE: &str = "lock";

/// Result of a build request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    Built,
    AlreadyBuilt,
}

/// Result of a start request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

/// Result of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

/// Coordinates the lifecycle of one-container-per-IDE-type
pub struct IdeManager {
    provider: Box<dyn ContainerProvider>,
    config: GlobalConfig,
}

/// Image repository holding an IDE type's snapshots
pub fn image_repo(ide_type: &str) -> String {
    format!("idebox-{}", ide_type)
}

/// Name of the single container an IDE type may run
pub fn container_name(ide_type: &str) -> String {
    format!("idebox-{}-container", ide_type)
}

fn image_ref(ide_type: &str, snapshot: &str) -> String {
    format!("{}:{}", image_repo(ide_type), snapshot)
}

/// Validate a snapshot name against docker tag rules before any external
/// command sees it.
pub fn validate_snapshot_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.starts_with('-')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));

    if valid {
        Ok(())
    } else {
        Err(CoreError::InvalidSnapshotName(name.to_string()))
    }
}

impl IdeManager {
    pub fn new(provider: Box<dyn ContainerProvider>, config: GlobalConfig) -> Self {
        Self { provider, config }
    }

    fn state_dir(&self, ide_type: &str) -> Result<PathBuf> {
        Ok(self.config.ide_state_dir(ide_type)?)
    }

    fn lineage_path(&self, ide_type: &str) -> Result<PathBuf> {
        Ok(self.state_dir(ide_type)?.join(LINEAGE_FILE))
    }

    fn lock(&self, ide_type: &str) -> Result<IdeLock> {
        IdeLock::acquire(&self.state_dir(ide_type)?.join(LOCK_FILE))
    }

    /// Build the base image for an IDE type.
    ///
    /// Idempotent: returns `AlreadyBuilt` when the root snapshot exists.
    pub async fn build(&self, ide: &IdeTypeConfig) -> Result<BuildOutcome> {
        let _lock = self.lock(&ide.name)?;

        let repo = image_repo(&ide.name);
        if self.provider.list_image_tags(&repo).await?.iter().any(|t| t == ROOT_SNAPSHOT) {
            tracing::debug!("Base image for '{}' already built", ide.name);
            return Ok(BuildOutcome::AlreadyBuilt);
        }

        let cache_root = self.config.cache_root()?;
        let artifact = fetch_artifact(&ide.download, &cache_root).await?;

        let context = BuildContext::prepare(ide, &artifact)?;
        self.provider
            .build(&BuildConfig {
                context: context.context_path().to_path_buf(),
                dockerfile: "Dockerfile".to_string(),
                tag: image_ref(&ide.name, ROOT_SNAPSHOT),
            })
            .await?;

        Ok(BuildOutcome::Built)
    }

    /// Start an IDE type's container on the given snapshot.
    ///
    /// Idempotent when that snapshot is already running; refuses to start
    /// over a different running snapshot.
    pub async fn start(
        &self,
        ide_type: &str,
        snapshot: &str,
        runtime: &RuntimeConfig,
    ) -> Result<StartOutcome> {
        validate_snapshot_name(snapshot)?;
        // Mount strings fail here, before any runtime command runs
        let extra_mounts = runtime.mount_entries()?;

        let _lock = self.lock(ide_type)?;

        let container = container_name(ide_type);
        match self.provider.running_snapshot(&container).await? {
            Some(running) if running == snapshot => {
                tracing::debug!("'{}' already running on snapshot '{}'", ide_type, snapshot);
                return Ok(StartOutcome::AlreadyRunning);
            }
            Some(running) => {
                return Err(CoreError::LifecycleConflict(format!(
                    "Ide is running on another snapshot [{}], stop the ide first",
                    running
                )));
            }
            None => {}
        }

        let repo = image_repo(ide_type);
        let tags = self.provider.list_image_tags(&repo).await?;
        if !tags.iter().any(|t| t == snapshot) {
            return Err(CoreError::UnknownSnapshot(snapshot.to_string()));
        }

        let mut ports = vec![PortBinding {
            host: runtime.web_port,
            container: CONTAINER_WEB_PORT,
        }];
        if let Some(vnc_port) = runtime.vnc_port {
            ports.push(PortBinding {
                host: vnc_port,
                container: CONTAINER_VNC_PORT,
            });
        }

        let mut env = HashMap::new();
        if let Some(password) = &runtime.web_password {
            env.insert("HTTP_PASSWORD".to_string(), password.clone());
        }
        if let Some(password) = &runtime.vnc_password {
            env.insert("VNC_PASSWORD".to_string(), password.clone());
        }

        let mut binds = vec![
            self.workspace_mount(ide_type)?,
            MountEntry {
                source: "/dev/shm".to_string(),
                target: "/dev/shm".to_string(),
                mode: None,
            },
        ];
        binds.extend(extra_mounts);

        self.provider
            .run(&RunContainerConfig {
                name: container,
                image: image_ref(ide_type, snapshot),
                ports,
                env,
                binds,
            })
            .await?;

        Ok(StartOutcome::Started)
    }

    /// Stop an IDE type's container. No-op when nothing runs.
    pub async fn stop(&self, ide_type: &str) -> Result<StopOutcome> {
        let _lock = self.lock(ide_type)?;

        let container = container_name(ide_type);
        if self.provider.running_snapshot(&container).await?.is_none() {
            return Ok(StopOutcome::NotRunning);
        }

        self.provider.remove_container(&container).await?;
        Ok(StopOutcome::Stopped)
    }

    /// Freeze the running container into a new immutable snapshot.
    ///
    /// Returns the parent snapshot name. The runtime commit and the lineage
    /// update happen under one lock acquisition.
    pub async fn take_snapshot(&self, ide_type: &str, name: &str) -> Result<String> {
        validate_snapshot_name(name)?;

        let _lock = self.lock(ide_type)?;

        let repo = image_repo(ide_type);
        if self.provider.list_image_tags(&repo).await?.iter().any(|t| t == name) {
            return Err(CoreError::SnapshotConflict(format!(
                "Snapshot name '{}' is already used",
                name
            )));
        }

        let container = container_name(ide_type);
        let parent = self
            .provider
            .running_snapshot(&container)
            .await?
            .ok_or_else(|| {
                CoreError::SnapshotConflict("No ide running, nothing to snapshot".to_string())
            })?;

        self.provider
            .commit(&container, &image_ref(ide_type, name))
            .await?;

        let path = self.lineage_path(ide_type)?;
        let mut lineage = LineageStore::load_from(&path)?;
        lineage.insert(name, &parent);
        lineage.save_to(&path)?;

        tracing::info!("Snapshot '{}' taken with parent '{}'", name, parent);
        Ok(parent)
    }

    /// Remove a snapshot's image and its lineage entry.
    ///
    /// Refused while the snapshot is running or recorded as any parent.
    pub async fn remove_snapshot(&self, ide_type: &str, name: &str) -> Result<()> {
        validate_snapshot_name(name)?;

        let _lock = self.lock(ide_type)?;

        let container = container_name(ide_type);
        if self.provider.running_snapshot(&container).await?.as_deref() == Some(name) {
            return Err(CoreError::SnapshotConflict(format!(
                "Ide is running on snapshot '{}', cannot remove it",
                name
            )));
        }

        let path = self.lineage_path(ide_type)?;
        let mut lineage = LineageStore::load_from(&path)?;
        if let Some(child) = lineage.referencing_child(name) {
            return Err(CoreError::SnapshotConflict(format!(
                "'{}' is referenced by '{}', cannot remove it",
                name, child
            )));
        }

        self.provider
            .remove_image(&image_ref(ide_type, name))
            .await?;

        // Root snapshots have no entry; removal tolerates that
        lineage.remove(name);
        lineage.save_to(&path)?;

        Ok(())
    }

    /// Snapshot names present for an IDE type, sorted. Pure query, no lock.
    pub async fn list(&self, ide_type: &str) -> Result<Vec<String>> {
        let mut tags = self.provider.list_image_tags(&image_repo(ide_type)).await?;
        tags.sort();
        Ok(tags)
    }

    /// Snapshot the container currently runs, if any. Pure query, no lock.
    pub async fn status(&self, ide_type: &str) -> Result<Option<String>> {
        self.provider
            .running_snapshot(&container_name(ide_type))
            .await
            .map_err(CoreError::from)
    }

    /// Parent of a snapshot per the persisted lineage
    pub fn parent_of(&self, ide_type: &str, snapshot: &str) -> Result<Option<String>> {
        let lineage = LineageStore::load_from(&self.lineage_path(ide_type)?)?;
        Ok(lineage.parent_of(snapshot).map(String::from))
    }

    fn workspace_mount(&self, ide_type: &str) -> Result<MountEntry> {
        let workspace = self.state_dir(ide_type)?.join("workspace");
        std::fs::create_dir_all(&workspace)?;
        Ok(MountEntry {
            source: workspace.to_string_lossy().to_string(),
            target: "/workspace".to_string(),
            mode: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn naming_contract() {
        assert_eq!(image_repo("foo"), "idebox-foo");
        assert_eq!(container_name("foo"), "idebox-foo-container");
        assert_eq!(image_ref("foo", "v0"), "idebox-foo:v0");
    }

    #[test]
    fn snapshot_name_validation() {
        assert!(validate_snapshot_name("v0").is_ok());
        assert!(validate_snapshot_name("feature_2.1-rc").is_ok());
        assert!(validate_snapshot_name("").is_err());
        assert!(validate_snapshot_name(".hidden").is_err());
        assert!(validate_snapshot_name("-flag").is_err());
        assert!(validate_snapshot_name("has space").is_err());
        assert!(validate_snapshot_name("repo:tag").is_err());
    }
}
