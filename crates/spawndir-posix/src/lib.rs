//! spawndir-posix: safe wrappers over the posix_spawn facility
//!
//! Wraps the file-action list and the spawn call behind checked Rust
//! interfaces. The chdir file action reports an unsupported-operation
//! error on platforms whose C library lacks it instead of silently
//! skipping the directory change; callers take the fork/exec fallback
//! in that case.

pub mod file_actions;
pub mod spawn;

pub use file_actions::FileActions;
pub use spawn::spawn;
