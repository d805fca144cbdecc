//! Query commands: ls, status, types

use anyhow::Result;
use idebox_config::IdeTypeConfig;
use idebox_core::IdeManager;

/// List snapshots of an IDE type
pub async fn list(manager: &IdeManager, ide_type: &str) -> Result<()> {
    let snapshots = manager.list(ide_type).await?;
    if snapshots.is_empty() {
        println!("No snapshots for '{}' (run 'idebox build {}')", ide_type, ide_type);
        return Ok(());
    }

    for name in snapshots {
        match manager.parent_of(ide_type, &name)? {
            Some(parent) => println!("{}  (parent: {})", name, parent),
            None => println!("{}", name),
        }
    }
    Ok(())
}

/// Show which snapshot an IDE type is running
pub async fn status(manager: &IdeManager, ide_type: &str) -> Result<()> {
    match manager.status(ide_type).await? {
        Some(snapshot) => println!("'{}' is running on snapshot '{}'", ide_type, snapshot),
        None => println!("'{}' is not running", ide_type),
    }
    Ok(())
}

/// List configured IDE types
pub fn types() -> Result<()> {
    let names = IdeTypeConfig::list()?;
    if names.is_empty() {
        println!("No IDE types configured");
        return Ok(());
    }
    for name in names {
        println!("{}", name);
    }
    Ok(())
}
