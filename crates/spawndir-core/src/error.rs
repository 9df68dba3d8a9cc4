//! Error types for spawn operations

use std::io;
use thiserror::Error;

/// Result type for spawn operations
pub type Result<T> = std::result::Result<T, SpawnError>;

/// Errors that can occur while preparing or performing a spawn.
///
/// Only failures that happen before the fork boundary (or on the parent
/// side of it) surface here. Anything that goes wrong inside a forked
/// child is reported through its termination status instead, because no
/// shared call stack exists across the fork.
#[derive(Error, Debug)]
pub enum SpawnError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Syscall error: {0}")]
    Syscall(String),

    #[error("Operation not supported on this platform: {0}")]
    Unsupported(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SpawnError::Unsupported("addchdir file action".to_string());
        assert_eq!(
            err.to_string(),
            "Operation not supported on this platform: addchdir file action"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let spawn_err = SpawnError::from(io_err);
        assert!(spawn_err.to_string().contains("IO error"));
    }

    #[test]
    fn test_syscall_error_carries_detail() {
        let err = SpawnError::Syscall("fork failed: EAGAIN".to_string());
        assert!(err.to_string().contains("fork failed"));
    }
}
