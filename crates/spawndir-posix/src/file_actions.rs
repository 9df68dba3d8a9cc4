//! RAII wrapper over `posix_spawn_file_actions_t`

use std::mem::MaybeUninit;
use std::os::unix::io::RawFd;
use std::path::Path;

use spawndir_core::capabilities;
use spawndir_core::util::path_cstring;
use spawndir_core::{Result, SpawnError};

/// File-action list applied in the child between spawn and exec.
///
/// Initialized on construction, destroyed on drop. Actions run in the order
/// they were added.
pub struct FileActions {
    inner: libc::posix_spawn_file_actions_t,
}

impl FileActions {
    pub fn new() -> Result<Self> {
        let mut inner = MaybeUninit::uninit();
        // SAFETY: init writes a valid file-actions object into `inner`.
        check(
            unsafe { libc::posix_spawn_file_actions_init(inner.as_mut_ptr()) },
            "posix_spawn_file_actions_init",
        )?;
        // SAFETY: init succeeded.
        Ok(Self {
            inner: unsafe { inner.assume_init() },
        })
    }

    /// Duplicate `fd` onto `target_fd` in the child.
    pub fn add_dup2(&mut self, fd: RawFd, target_fd: RawFd) -> Result<()> {
        // SAFETY: `inner` is an initialized file-actions object.
        check(
            unsafe { libc::posix_spawn_file_actions_adddup2(&mut self.inner, fd, target_fd) },
            "posix_spawn_file_actions_adddup2",
        )
    }

    /// Close `fd` in the child.
    pub fn add_close(&mut self, fd: RawFd) -> Result<()> {
        // SAFETY: `inner` is an initialized file-actions object.
        check(
            unsafe { libc::posix_spawn_file_actions_addclose(&mut self.inner, fd) },
            "posix_spawn_file_actions_addclose",
        )
    }

    /// Change the child's working directory before exec.
    ///
    /// Fails with [`SpawnError::Unsupported`] when the running C library
    /// carries neither addchdir spelling; it never silently skips the
    /// directory change. Callers getting that error should take the
    /// fork/exec fallback instead.
    pub fn add_chdir(&mut self, path: &Path) -> Result<()> {
        let addchdir = capabilities::addchdir_fn().ok_or_else(|| {
            SpawnError::Unsupported(
                "posix_spawn_file_actions_addchdir is not in this C library".to_string(),
            )
        })?;
        let cpath = path_cstring(path)?;
        // SAFETY: initialized file-actions object and a NUL-terminated path;
        // `addchdir` was resolved from the running C library.
        check(
            unsafe { addchdir(&mut self.inner, cpath.as_ptr()) },
            "posix_spawn_file_actions_addchdir",
        )
    }

    pub(crate) fn as_ptr(&self) -> *const libc::posix_spawn_file_actions_t {
        &self.inner
    }
}

impl Drop for FileActions {
    fn drop(&mut self) {
        // SAFETY: `inner` was initialized in `new` and not destroyed since.
        unsafe { libc::posix_spawn_file_actions_destroy(&mut self.inner) };
    }
}

/// posix_spawn interfaces return the error code directly instead of
/// setting errno.
pub(crate) fn check(ret: libc::c_int, what: &str) -> Result<()> {
    if ret == 0 {
        Ok(())
    } else {
        Err(SpawnError::Syscall(format!(
            "{} failed: {}",
            what,
            std::io::Error::from_raw_os_error(ret)
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spawndir_core::capabilities::native_chdir_spawn_supported;

    #[test]
    fn init_and_drop() {
        let actions = FileActions::new().unwrap();
        drop(actions);
    }

    #[test]
    fn dup2_and_close_actions_accepted() {
        let mut actions = FileActions::new().unwrap();
        actions.add_dup2(0, 3).unwrap();
        actions.add_close(3).unwrap();
    }

    #[test]
    fn add_chdir_matches_probe() {
        let mut actions = FileActions::new().unwrap();
        let res = actions.add_chdir(Path::new("/"));
        if native_chdir_spawn_supported() {
            res.unwrap();
        } else {
            assert!(matches!(res.unwrap_err(), SpawnError::Unsupported(_)));
        }
    }
}
