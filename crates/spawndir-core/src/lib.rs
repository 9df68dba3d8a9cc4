//! spawndir-core: shared types, errors, and capability detection for spawndir
//!
//! This crate provides the foundational pieces used by all spawndir
//! sub-crates:
//! - Error types and Result alias
//! - C-string marshalling for exec-style calls
//! - Runtime detection of the chdir-aware posix_spawn facility

pub mod capabilities;
pub mod error;
pub mod util;

pub use error::{Result, SpawnError};
