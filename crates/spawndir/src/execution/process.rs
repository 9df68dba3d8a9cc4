//! Fork/exec fallback for chdir-aware spawning
//!
//! Emulates "spawn with a working directory" where posix_spawn cannot:
//! fork, chdir in the child, rewire the standard streams onto the supplied
//! pipes, exec. Everything the child needs is marshalled before the fork;
//! the child branch runs only async-signal-safe libc calls and always
//! leaves through exec or `_exit`, never by returning into caller code.

use std::ffi::CString;
use std::path::PathBuf;

use log::debug;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{fork, ForkResult, Pid};

use spawndir_core::util::{arg_cstrings, env_cstrings, path_cstring, ptr_array};
use spawndir_core::{Result, SpawnError};

use crate::execution::pipes::PipePair;

/// Exit status a child takes when pre-exec setup (the directory change)
/// fails. Exec is never reached in that case.
pub const SETUP_FAILURE_CODE: i32 = 126;
/// Exit status a child takes when exec itself fails.
pub const EXEC_FAILURE_CODE: i32 = 127;

/// Launch configuration, consumed by one [`launch`] call
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Working directory the child runs in
    pub dir: PathBuf,
    /// Executable path, passed to exec exactly as given
    pub program: PathBuf,
    /// Argument vector; the first element is the program name by convention
    pub args: Vec<String>,
    /// Environment, marshalled in order as key=value
    pub env: Vec<(String, String)>,
    /// Rewire stdout/stderr onto the supplied pipes. When false the child
    /// inherits the parent's current output/error bindings and the
    /// output/error pipes are not touched.
    pub redirect_output: bool,
    /// Send stderr into the stdout pipe. Only meaningful when redirecting.
    pub merge_stderr: bool,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            program: PathBuf::new(),
            args: Vec::new(),
            env: Vec::new(),
            redirect_output: true,
            merge_stderr: false,
        }
    }
}

/// How the child terminated.
///
/// The raw bit-packed wait status never leaves this module; it is decoded
/// right at the waitpid boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Normal termination with an exit code
    Exited(i32),
    /// Terminated by a signal
    Signaled(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Exited(0))
    }
}

/// Outcome of a completed launch.
#[derive(Debug, Clone, Copy)]
pub struct LaunchResult {
    /// Pid the child ran under. Already reaped; informational only.
    pub pid: Pid,
    /// Decoded termination status
    pub status: ExitStatus,
}

/// Inherited pipe descriptors, captured before the fork so the child can
/// close every original end it was handed.
struct ChildFds {
    stdin_read: libc::c_int,
    stdin_write: libc::c_int,
    stdout_read: libc::c_int,
    stdout_write: libc::c_int,
    stderr_read: libc::c_int,
    stderr_write: libc::c_int,
}

/// Launch `config.program` in `config.dir`, blocking until it terminates.
///
/// The three pipe pairs must be open pipes created by the caller. The child
/// duplicates the ends named by the redirect flags onto fds 0/1/2 and closes
/// its copies of the originals; the parent-side ends are never touched here
/// and remain the caller's to close. A caller that forgets to close its
/// ends leaves the counterpart read blocked forever.
///
/// Failures inside the child (directory change, exec) are not distinct
/// errors at this boundary: the child exits with [`SETUP_FAILURE_CODE`] or
/// [`EXEC_FAILURE_CODE`] and the caller sees an abnormal [`ExitStatus`].
/// The raw status cannot tell "directory invalid" from "executable not
/// found" beyond those two codes.
pub fn launch(
    config: &LaunchConfig,
    stdin_pipe: &PipePair,
    stdout_pipe: &PipePair,
    stderr_pipe: &PipePair,
) -> Result<LaunchResult> {
    // Marshal up front: nul bytes are reported here, synchronously, and the
    // child branch is left with nothing but raw pointers and libc.
    let dir = path_cstring(&config.dir)?;
    let program = path_cstring(&config.program)?;
    let args = arg_cstrings(&config.args)?;
    let env = env_cstrings(&config.env)?;
    let argv = ptr_array(&args);
    let envp = ptr_array(&env);

    let fds = ChildFds {
        stdin_read: stdin_pipe.read_fd(),
        stdin_write: stdin_pipe.write_fd(),
        stdout_read: stdout_pipe.read_fd(),
        stdout_write: stdout_pipe.write_fd(),
        stderr_read: stderr_pipe.read_fd(),
        stderr_write: stderr_pipe.write_fd(),
    };

    // SAFETY: the child branch calls only async-signal-safe libc functions
    // on pre-marshalled data and leaves via exec or _exit.
    match unsafe { fork() } {
        Ok(ForkResult::Parent { child }) => {
            debug!("forked child {}", child);
            let status = wait_child(child)?;
            debug!("child {} terminated: {:?}", child, status);
            Ok(LaunchResult { pid: child, status })
        }
        Ok(ForkResult::Child) => child_branch(
            &dir,
            &program,
            &argv,
            &envp,
            &fds,
            config.redirect_output,
            config.merge_stderr,
        ),
        Err(e) => Err(SpawnError::Syscall(format!("fork failed: {}", e))),
    }
}

/// Child side of the fork. Diverges: exec replaces the image on success and
/// `_exit` ends the branch on any failure, so control never flows back into
/// code shared with the parent.
fn child_branch(
    dir: &CString,
    program: &CString,
    argv: &[*const libc::c_char],
    envp: &[*const libc::c_char],
    fds: &ChildFds,
    redirect_output: bool,
    merge_stderr: bool,
) -> ! {
    // SAFETY: forked child with a private descriptor table; every call below
    // is async-signal-safe and operates on descriptors inherited from the
    // parent or on pre-marshalled NUL-terminated data.
    unsafe {
        // The directory change comes first. If the requested directory is
        // unusable nothing else may happen, least of all exec.
        if libc::chdir(dir.as_ptr()) != 0 {
            libc::_exit(SETUP_FAILURE_CODE);
        }

        // stdin: read end onto fd 0, then both original ends go away.
        if libc::dup2(fds.stdin_read, 0) < 0 {
            libc::_exit(SETUP_FAILURE_CODE);
        }
        libc::close(fds.stdin_read);
        libc::close(fds.stdin_write);

        if redirect_output {
            if libc::dup2(fds.stdout_write, 1) < 0 {
                libc::_exit(SETUP_FAILURE_CODE);
            }
            libc::close(fds.stdout_read);
            libc::close(fds.stdout_write);

            if merge_stderr {
                // Both streams into the one pipe now sitting on fd 1.
                if libc::dup2(1, 2) < 0 {
                    libc::_exit(SETUP_FAILURE_CODE);
                }
            } else {
                if libc::dup2(fds.stderr_write, 2) < 0 {
                    libc::_exit(SETUP_FAILURE_CODE);
                }
                libc::close(fds.stderr_read);
                libc::close(fds.stderr_write);
            }
        }
        // Without redirection fds 1/2 keep whatever the parent had bound.

        libc::execve(program.as_ptr(), argv.as_ptr(), envp.as_ptr());

        // execve only returns on failure.
        libc::_exit(EXEC_FAILURE_CODE);
    }
}

/// Wait for `pid` and decode its termination status.
///
/// Loops past stop/continue events; only actual termination is reported.
/// Also used by callers of the native posix_spawn path, which hands back an
/// unreaped pid.
pub fn wait_child(pid: Pid) -> Result<ExitStatus> {
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(ExitStatus::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => {
                return Ok(ExitStatus::Signaled(signal as i32))
            }
            Ok(_) => continue,
            Err(e) => return Err(SpawnError::Syscall(format!("waitpid failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_config_default() {
        let config = LaunchConfig::default();
        assert_eq!(config.dir, PathBuf::from("."));
        assert!(config.program.as_os_str().is_empty());
        assert!(config.args.is_empty());
        assert!(config.redirect_output);
        assert!(!config.merge_stderr);
    }

    #[test]
    fn test_exit_status_success() {
        assert!(ExitStatus::Exited(0).success());
        assert!(!ExitStatus::Exited(1).success());
        assert!(!ExitStatus::Signaled(9).success());
    }

    #[test]
    fn wait_child_decodes_exit_code() {
        match unsafe { fork() }.unwrap() {
            ForkResult::Child => {
                // SAFETY: immediate exit from a forked test child.
                unsafe { libc::_exit(42) };
            }
            ForkResult::Parent { child } => {
                let status = wait_child(child).unwrap();
                assert_eq!(status, ExitStatus::Exited(42));
            }
        }
    }

    #[test]
    fn wait_child_decodes_signal() {
        match unsafe { fork() }.unwrap() {
            ForkResult::Child => {
                // SAFETY: the child kills itself with SIGKILL.
                unsafe {
                    libc::raise(libc::SIGKILL);
                    libc::_exit(1);
                }
            }
            ForkResult::Parent { child } => {
                let status = wait_child(child).unwrap();
                assert_eq!(status, ExitStatus::Signaled(libc::SIGKILL));
            }
        }
    }

    #[test]
    fn launch_rejects_nul_bytes_before_forking() {
        let stdin_pipe = PipePair::new().unwrap();
        let stdout_pipe = PipePair::new().unwrap();
        let stderr_pipe = PipePair::new().unwrap();

        let config = LaunchConfig {
            dir: "/tmp".into(),
            program: "/bin/echo".into(),
            args: vec!["echo".to_string(), "bad\0arg".to_string()],
            ..Default::default()
        };

        let err = launch(&config, &stdin_pipe, &stdout_pipe, &stderr_pipe).unwrap_err();
        assert!(matches!(err, SpawnError::InvalidConfig(_)));
    }
}
