//! Runtime detection of the chdir-aware posix_spawn facility
//!
//! posix_spawn grew the ability to change the child's working directory as
//! a file action long after the base interface shipped, so whether the
//! running system has it depends on the C library generation:
//!
//! - Pre-standard `posix_spawn_file_actions_addchdir_np`: Solaris 11.3,
//!   glibc 2.29, macOS 10.15, musl 1.1.24, FreeBSD 13.1, Android 14
//!   (API level 34).
//! - Standardized `posix_spawn_file_actions_addchdir` (POSIX.1-2024):
//!   Solaris 11.4, NetBSD 10.0.
//! - Missing entirely as of OpenBSD 7.5 and QNX 8.
//!
//! On Linux and Android the gate is realized by resolving the symbol from
//! the running C library rather than parsing version strings: the installed
//! libc either carries the function or it does not. The lookup never spawns
//! a process and its answer is fixed for the process lifetime.

use std::sync::OnceLock;

/// Signature shared by both addchdir spellings.
pub type AddChdirFn = unsafe extern "C" fn(
    *mut libc::posix_spawn_file_actions_t,
    *const libc::c_char,
) -> libc::c_int;

/// Whether the running system can change the child's working directory as
/// a posix_spawn file action.
///
/// Never errors; repeated calls return the same boolean.
pub fn native_chdir_spawn_supported() -> bool {
    addchdir_fn().is_some()
}

/// The resolved addchdir file action, if the C library has one.
///
/// Prefers the pre-standard `_np` spelling over the POSIX.1-2024 one.
/// Memoized once per process; concurrent first calls resolve exactly once.
pub fn addchdir_fn() -> Option<AddChdirFn> {
    static RESOLVED: OnceLock<Option<AddChdirFn>> = OnceLock::new();
    *RESOLVED.get_or_init(resolve_addchdir)
}

// Missing as of OpenBSD 7.5 (April 2024) and QNX 8 (December 2023).
#[cfg(any(target_os = "openbsd", target_os = "nto"))]
fn resolve_addchdir() -> Option<AddChdirFn> {
    None
}

#[cfg(not(any(target_os = "openbsd", target_os = "nto")))]
fn resolve_addchdir() -> Option<AddChdirFn> {
    lookup(c"posix_spawn_file_actions_addchdir_np")
        .or_else(|| lookup(c"posix_spawn_file_actions_addchdir"))
}

#[cfg(not(any(target_os = "openbsd", target_os = "nto")))]
fn lookup(name: &std::ffi::CStr) -> Option<AddChdirFn> {
    // SAFETY: dlsym with a NUL-terminated name; every platform that exports
    // either symbol gives it the AddChdirFn signature.
    let sym = unsafe { libc::dlsym(libc::RTLD_DEFAULT, name.as_ptr()) };
    if sym.is_null() {
        None
    } else {
        // SAFETY: non-null result of a successful lookup of a function symbol.
        Some(unsafe { std::mem::transmute::<*mut libc::c_void, AddChdirFn>(sym) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_is_idempotent() {
        let first = native_chdir_spawn_supported();
        for _ in 0..8 {
            assert_eq!(native_chdir_spawn_supported(), first);
        }
    }

    #[test]
    fn probe_agrees_with_resolver() {
        assert_eq!(native_chdir_spawn_supported(), addchdir_fn().is_some());
    }

    // glibc has carried the _np variant since 2.29 (February 2019); any
    // toolchain recent enough to build this crate runs against a newer one.
    #[cfg(all(target_os = "linux", target_env = "gnu"))]
    #[test]
    fn glibc_carries_addchdir() {
        assert!(native_chdir_spawn_supported());
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn macos_carries_addchdir() {
        assert!(native_chdir_spawn_supported());
    }
}
