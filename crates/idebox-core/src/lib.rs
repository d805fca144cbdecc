//! Core logic for idebox IDE container lifecycle management
//!
//! This crate provides:
//! - The lifecycle coordinator (build, start, stop, snapshot, revert)
//! - The persisted snapshot lineage store
//! - Per-IDE-type process exclusion
//! - Base image build contexts and IDE artifact download

mod build;
mod download;
mod error;
mod lineage;
mod lock;
mod manager;

pub use build::*;
pub use download::*;
pub use error::*;
pub use lineage::*;
pub use lock::*;
pub use manager::*;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
