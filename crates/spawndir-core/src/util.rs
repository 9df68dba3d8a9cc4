//! C-string marshalling for exec-style interfaces
//!
//! Everything a child needs after fork has to be marshalled up front: the
//! child branch may only touch raw pointers, so nul-byte problems must be
//! caught here, on the parent side, where they can still be reported.

use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::ptr;

use crate::error::{Result, SpawnError};

/// Convert a string into a `CString`, rejecting interior nul bytes.
pub fn to_cstring(s: &str) -> Result<CString> {
    CString::new(s)
        .map_err(|_| SpawnError::InvalidConfig(format!("string contains nul byte: {:?}", s)))
}

/// Convert a path into a `CString`, rejecting interior nul bytes.
pub fn path_cstring(path: &Path) -> Result<CString> {
    CString::new(path.as_os_str().as_bytes())
        .map_err(|_| SpawnError::InvalidConfig(format!("path contains nul byte: {:?}", path)))
}

/// Marshal an argument vector in order.
pub fn arg_cstrings(args: &[String]) -> Result<Vec<CString>> {
    args.iter().map(|a| to_cstring(a)).collect()
}

/// Marshal an ordered environment as `key=value` strings.
pub fn env_cstrings(env: &[(String, String)]) -> Result<Vec<CString>> {
    env.iter()
        .map(|(k, v)| to_cstring(&format!("{}={}", k, v)))
        .collect()
}

/// Build a null-terminated pointer array over marshalled strings.
///
/// The returned pointers borrow from `strings`, which must stay alive (and
/// unmoved) for as long as the array is used.
pub fn ptr_array(strings: &[CString]) -> Vec<*const libc::c_char> {
    strings
        .iter()
        .map(|s| s.as_ptr())
        .chain(std::iter::once(ptr::null()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_cstring_rejects_nul() {
        assert!(to_cstring("ok").is_ok());
        let err = to_cstring("bad\0arg").unwrap_err();
        assert!(matches!(err, SpawnError::InvalidConfig(_)));
    }

    #[test]
    fn env_cstrings_preserves_order_and_shape() {
        let env = vec![
            ("PATH".to_string(), "/bin".to_string()),
            ("HOME".to_string(), "/root".to_string()),
        ];
        let marshalled = env_cstrings(&env).unwrap();
        assert_eq!(marshalled[0].to_str().unwrap(), "PATH=/bin");
        assert_eq!(marshalled[1].to_str().unwrap(), "HOME=/root");
    }

    #[test]
    fn ptr_array_is_null_terminated() {
        let strings = arg_cstrings(&["echo".to_string(), "hi".to_string()]).unwrap();
        let ptrs = ptr_array(&strings);
        assert_eq!(ptrs.len(), 3);
        assert!(!ptrs[0].is_null());
        assert!(!ptrs[1].is_null());
        assert!(ptrs[2].is_null());
    }

    #[test]
    fn path_cstring_roundtrips() {
        let c = path_cstring(Path::new("/tmp/some dir")).unwrap();
        assert_eq!(c.to_str().unwrap(), "/tmp/some dir");
    }
}
