//! Lifecycle commands: build, start, stop, snapshot, rm

use anyhow::Result;
use idebox_config::{IdeTypeConfig, RuntimeConfig};
use idebox_core::{BuildOutcome, IdeManager, StartOutcome, StopOutcome};

/// Build the base image for an IDE type
pub async fn build(manager: &IdeManager, ide_type: &str) -> Result<()> {
    let ide = IdeTypeConfig::load(ide_type)?;

    println!("Building base image for '{}'...", ide_type);
    match manager.build(&ide).await? {
        BuildOutcome::Built => println!("Built '{}'", ide_type),
        BuildOutcome::AlreadyBuilt => println!("'{}' is already built", ide_type),
    }
    Ok(())
}

/// Start an IDE container on a snapshot
pub async fn start(
    manager: &IdeManager,
    ide_type: &str,
    snapshot: &str,
    runtime: &RuntimeConfig,
) -> Result<()> {
    println!("Starting '{}' on snapshot '{}'...", ide_type, snapshot);
    match manager.start(ide_type, snapshot, runtime).await? {
        StartOutcome::Started => {
            println!("Started '{}', web UI on port {}", ide_type, runtime.web_port);
        }
        StartOutcome::AlreadyRunning => {
            println!("'{}' is already running on snapshot '{}'", ide_type, snapshot)
        }
    }
    Ok(())
}

/// Stop an IDE container
pub async fn stop(manager: &IdeManager, ide_type: &str) -> Result<()> {
    println!("Stopping '{}'...", ide_type);
    match manager.stop(ide_type).await? {
        StopOutcome::Stopped => println!("Stopped '{}'", ide_type),
        StopOutcome::NotRunning => println!("'{}' is not running", ide_type),
    }
    Ok(())
}

/// Freeze the running container into a named snapshot
pub async fn snapshot(manager: &IdeManager, ide_type: &str, name: &str) -> Result<()> {
    println!("Taking snapshot '{}' of '{}'...", name, ide_type);
    let parent = manager.take_snapshot(ide_type, name).await?;
    println!("Snapshot '{}' taken (parent: '{}')", name, parent);
    Ok(())
}

/// Remove a snapshot
pub async fn remove(manager: &IdeManager, ide_type: &str, name: &str) -> Result<()> {
    println!("Removing snapshot '{}' of '{}'...", name, ide_type);
    manager.remove_snapshot(ide_type, name).await?;
    println!("Removed snapshot '{}'", name);
    Ok(())
}
