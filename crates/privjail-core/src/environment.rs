//! Process environment reset.

use std::io;

/// Removes every environment variable and returns how many were present.
///
/// `clearenv(3)` drops the whole `environ` array, including entries that
/// have no valid variable name (such as `=x=1`).
#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
pub(crate) fn clear() -> io::Result<usize> {
    let present = count();
    // SAFETY: activation runs before any other thread is started, so
    // nothing reads or writes the environment concurrently.
    let rc = unsafe { libc::clearenv() };
    if rc == 0 {
        Ok(present)
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Removes every environment variable and returns how many were removed.
///
/// Keys that `std::env::remove_var` cannot express (empty, or containing
/// `=` or NUL) are left in place; the caller re-counts afterwards.
#[cfg(not(target_os = "linux"))]
#[cfg_attr(not(unix), allow(dead_code))]
#[allow(unsafe_code)]
pub(crate) fn clear() -> io::Result<usize> {
    use std::ffi::OsString;

    let keys: Vec<OsString> = std::env::vars_os()
        .map(|(key, _)| key)
        .filter(|key| is_removable(key))
        .collect();
    for key in &keys {
        // SAFETY: activation runs before any other thread is started, so
        // nothing reads or writes the environment concurrently.
        unsafe { std::env::remove_var(key) };
    }
    Ok(keys.len())
}

/// Number of environment variables currently visible to the process.
pub(crate) fn count() -> usize {
    std::env::vars_os().count()
}

#[cfg(not(target_os = "linux"))]
fn is_removable(key: &std::ffi::OsStr) -> bool {
    let bytes = key.as_encoded_bytes();
    !bytes.is_empty() && !bytes.contains(&b'=') && !bytes.contains(&0)
}
