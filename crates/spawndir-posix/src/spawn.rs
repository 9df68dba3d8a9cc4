//! Native posix_spawn invocation

use std::mem::MaybeUninit;
use std::path::Path;

use nix::unistd::Pid;

use spawndir_core::util::{arg_cstrings, env_cstrings, path_cstring, ptr_array};
use spawndir_core::{Result, SpawnError};

use crate::file_actions::{check, FileActions};

/// Spawn attributes: SIGPIPE back to default, signal mask cleared.
///
/// Without this the child inherits whatever mask and SIG_IGN dispositions
/// the parent runtime set up, which most exec'd programs do not expect.
struct SpawnAttrs {
    inner: libc::posix_spawnattr_t,
}

impl SpawnAttrs {
    fn new() -> Result<Self> {
        let mut inner = MaybeUninit::uninit();
        // SAFETY: init writes a valid attributes object into `inner`.
        check(
            unsafe { libc::posix_spawnattr_init(inner.as_mut_ptr()) },
            "posix_spawnattr_init",
        )?;
        // SAFETY: init succeeded.
        let mut attrs = Self {
            inner: unsafe { inner.assume_init() },
        };
        attrs.reset_signals()?;
        Ok(attrs)
    }

    fn reset_signals(&mut self) -> Result<()> {
        let mut set = MaybeUninit::<libc::sigset_t>::uninit();
        // SAFETY: sigemptyset/sigaddset initialize and extend the set in
        // place; the attribute calls copy it.
        unsafe {
            if libc::sigemptyset(set.as_mut_ptr()) != 0 {
                return Err(SpawnError::Io(std::io::Error::last_os_error()));
            }
            check(
                libc::posix_spawnattr_setsigmask(&mut self.inner, set.as_ptr()),
                "posix_spawnattr_setsigmask",
            )?;
            if libc::sigaddset(set.as_mut_ptr(), libc::SIGPIPE) != 0 {
                return Err(SpawnError::Io(std::io::Error::last_os_error()));
            }
            check(
                libc::posix_spawnattr_setsigdefault(&mut self.inner, set.as_ptr()),
                "posix_spawnattr_setsigdefault",
            )?;
        }
        let flags = libc::POSIX_SPAWN_SETSIGDEF | libc::POSIX_SPAWN_SETSIGMASK;
        // SAFETY: `inner` is an initialized attributes object.
        check(
            unsafe { libc::posix_spawnattr_setflags(&mut self.inner, flags as libc::c_short) },
            "posix_spawnattr_setflags",
        )
    }
}

impl Drop for SpawnAttrs {
    fn drop(&mut self) {
        // SAFETY: `inner` was initialized in `new` and not destroyed since.
        unsafe { libc::posix_spawnattr_destroy(&mut self.inner) };
    }
}

/// Spawn `program` with the given file actions and return the child's pid.
///
/// `args` is passed to exec exactly as given (the first element is the
/// program name by convention); `env` is marshalled in order as
/// `key=value`. Bare program names are resolved against `PATH` by
/// posix_spawnp itself. The caller is responsible for waiting on the
/// returned pid.
pub fn spawn(
    program: &Path,
    args: &[String],
    env: &[(String, String)],
    actions: &FileActions,
) -> Result<Pid> {
    let program = path_cstring(program)?;
    let args = arg_cstrings(args)?;
    let env = env_cstrings(env)?;
    let argv = ptr_array(&args);
    let envp = ptr_array(&env);

    let attrs = SpawnAttrs::new()?;

    let mut pid: libc::pid_t = 0;
    // SAFETY: all pointer arrays are NUL-terminated and borrow from
    // marshalled CStrings that outlive the call; `actions` and `attrs`
    // are initialized objects.
    check(
        unsafe {
            libc::posix_spawnp(
                &mut pid,
                program.as_ptr(),
                actions.as_ptr(),
                &attrs.inner,
                argv.as_ptr() as *const *mut libc::c_char,
                envp.as_ptr() as *const *mut libc::c_char,
            )
        },
        "posix_spawnp",
    )?;

    Ok(Pid::from_raw(pid))
}
