//! spawndir: working-directory-aware process spawning
//!
//! Launches a child process in a chosen working directory with its standard
//! streams redirected onto caller-owned pipes. Where the C library can
//! change directory as a posix_spawn file action the native path applies;
//! everywhere else the fork/exec fallback in [`execution`] emulates it,
//! keeping descriptor ownership straight across the fork boundary.
//!
//! # Example
//!
//! ```ignore
//! use spawndir::{launch, LaunchConfig, PipePair};
//!
//! let stdin_pipe = PipePair::new()?;
//! let stdout_pipe = PipePair::new()?;
//! let stderr_pipe = PipePair::new()?;
//!
//! let config = LaunchConfig {
//!     dir: "/srv/app".into(),
//!     program: "/bin/ls".into(),
//!     args: vec!["ls".into(), "-l".into()],
//!     env: std::env::vars().collect(),
//!     ..Default::default()
//! };
//!
//! let result = launch(&config, &stdin_pipe, &stdout_pipe, &stderr_pipe)?;
//! println!("child exited: {:?}", result.status);
//! ```

pub mod execution;

// Re-export sub-crate surfaces for convenience
pub use spawndir_core::{self as core, capabilities, Result, SpawnError};
pub use spawndir_posix::{spawn as native_spawn, FileActions};

pub use execution::{launch, wait_child, ExitStatus, LaunchConfig, LaunchResult, PipePair};
