//! CLI command implementations

mod lifecycle;
mod manage;

pub use lifecycle::*;
pub use manage::*;
