//! Access to the process privilege state.
//!
//! Ids, supplementary groups, the filesystem root and the environment are
//! process-wide kernel state, not Rust values. [`Kernel`] is the seam over
//! that state; [`ProcessPrivileges`] is the only implementation that touches
//! the real process, and the sequencer is its only mutator.

use std::io;
use std::path::Path;

#[cfg(test)]
pub(crate) mod fake;
#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod unsupported;

#[cfg(unix)]
pub(crate) use unix::ProcessPrivileges;
#[cfg(not(unix))]
pub(crate) use unsupported::ProcessPrivileges;

/// Privilege-affecting operations used by the capability check and the
/// sequencer.
pub(crate) trait Kernel {
    /// Real user id.
    fn real_uid(&self) -> u32;
    /// Effective user id.
    fn effective_uid(&self) -> u32;
    /// Real group id.
    fn real_gid(&self) -> u32;
    /// Effective group id.
    fn effective_gid(&self) -> u32;
    /// Sets the core file size limit to zero, soft and hard.
    fn disable_core_dumps(&mut self) -> io::Result<()>;
    /// Changes the filesystem root.
    fn chroot(&mut self, path: &Path) -> io::Result<()>;
    /// Changes the working directory.
    fn chdir(&mut self, path: &Path) -> io::Result<()>;
    /// Replaces the supplementary group list.
    fn set_groups(&mut self, groups: &[u32]) -> io::Result<()>;
    /// Reads the supplementary group list.
    fn groups(&self) -> io::Result<Vec<u32>>;
    /// Sets real, effective and saved group id.
    fn set_gid(&mut self, gid: u32) -> io::Result<()>;
    /// Sets real, effective and saved user id.
    fn set_uid(&mut self, uid: u32) -> io::Result<()>;
    /// Removes every environment variable.
    fn clear_environment(&mut self) -> io::Result<()>;
    /// Number of environment variables currently set.
    fn environment_len(&self) -> usize;
}
