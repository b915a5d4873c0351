//! Stub for hosts without chroot, setgroups or setuid.

use std::io;
use std::path::Path;

use super::Kernel;

/// Placeholder handle; every mutation fails.
#[derive(Debug)]
pub(crate) struct ProcessPrivileges {
    _private: (),
}

impl ProcessPrivileges {
    pub(crate) const fn acquire() -> Self {
        Self { _private: () }
    }
}

fn unsupported() -> io::Error {
    io::Error::new(
        io::ErrorKind::Unsupported,
        "privilege revocation requires a Unix host",
    )
}

impl Kernel for ProcessPrivileges {
    fn real_uid(&self) -> u32 {
        u32::MAX
    }

    fn effective_uid(&self) -> u32 {
        u32::MAX
    }

    fn real_gid(&self) -> u32 {
        u32::MAX
    }

    fn effective_gid(&self) -> u32 {
        u32::MAX
    }

    fn disable_core_dumps(&mut self) -> io::Result<()> {
        Err(unsupported())
    }

    fn chroot(&mut self, _path: &Path) -> io::Result<()> {
        Err(unsupported())
    }

    fn chdir(&mut self, _path: &Path) -> io::Result<()> {
        Err(unsupported())
    }

    fn set_groups(&mut self, _groups: &[u32]) -> io::Result<()> {
        Err(unsupported())
    }

    fn groups(&self) -> io::Result<Vec<u32>> {
        Err(unsupported())
    }

    fn set_gid(&mut self, _gid: u32) -> io::Result<()> {
        Err(unsupported())
    }

    fn set_uid(&mut self, _uid: u32) -> io::Result<()> {
        Err(unsupported())
    }

    fn clear_environment(&mut self) -> io::Result<()> {
        Err(unsupported())
    }

    fn environment_len(&self) -> usize {
        crate::environment::count()
    }
}
