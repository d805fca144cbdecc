//! Configuration parsing for idebox
//!
//! This crate handles parsing of:
//! - Global configuration (`~/.config/idebox/config.toml`)
//! - IDE type descriptors (`~/.config/idebox/types/<name>.toml`)
//! - Runtime configuration for `start` (ports, passwords, mounts)

mod error;
mod global;
mod ide;
mod runtime;

pub use error::*;
pub use global::*;
pub use ide::*;
pub use runtime::*;
