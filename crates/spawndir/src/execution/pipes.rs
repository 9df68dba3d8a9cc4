//! Pipe pairs handed to the launcher
//!
//! The caller creates and owns both ends. The launcher only duplicates and
//! closes descriptors inside the child; the parent-side ends stay untouched
//! and must be closed by the caller once it is done communicating, or the
//! peer never observes end-of-stream.

use std::os::unix::io::{AsRawFd, OwnedFd, RawFd};

use spawndir_core::{Result, SpawnError};

/// A unidirectional pipe: read end plus write end.
#[derive(Debug)]
pub struct PipePair {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

impl PipePair {
    /// Create a fresh pipe.
    pub fn new() -> Result<Self> {
        let (read, write) = nix::unistd::pipe()
            .map_err(|e| SpawnError::Syscall(format!("pipe failed: {}", e)))?;
        Ok(Self { read, write })
    }

    pub fn read_fd(&self) -> RawFd {
        self.read.as_raw_fd()
    }

    pub fn write_fd(&self) -> RawFd {
        self.write.as_raw_fd()
    }

    /// Split into the owned ends, e.g. to drop one side and read the other.
    pub fn into_ends(self) -> (OwnedFd, OwnedFd) {
        (self.read, self.write)
    }
}
