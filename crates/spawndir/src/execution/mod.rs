//! Execution layer: pipe pairs and the fork/exec fallback launcher

pub mod pipes;
pub mod process;

pub use pipes::PipePair;
pub use process::{launch, wait_child, ExitStatus, LaunchConfig, LaunchResult};
