//! Unix implementation backed by `nix`.

use std::io;
use std::path::Path;

use nix::sys::resource::{Resource, setrlimit};
use nix::unistd::{self, Gid, Uid};

use super::Kernel;

/// Handle to the live privilege state of this process.
#[derive(Debug)]
pub(crate) struct ProcessPrivileges {
    _private: (),
}

impl ProcessPrivileges {
    pub(crate) const fn acquire() -> Self {
        Self { _private: () }
    }
}

impl Kernel for ProcessPrivileges {
    fn real_uid(&self) -> u32 {
        unistd::getuid().as_raw()
    }

    fn effective_uid(&self) -> u32 {
        unistd::geteuid().as_raw()
    }

    fn real_gid(&self) -> u32 {
        unistd::getgid().as_raw()
    }

    fn effective_gid(&self) -> u32 {
        unistd::getegid().as_raw()
    }

    fn disable_core_dumps(&mut self) -> io::Result<()> {
        setrlimit(Resource::RLIMIT_CORE, 0, 0).map_err(io::Error::from)
    }

    fn chroot(&mut self, path: &Path) -> io::Result<()> {
        unistd::chroot(path).map_err(io::Error::from)
    }

    fn chdir(&mut self, path: &Path) -> io::Result<()> {
        unistd::chdir(path).map_err(io::Error::from)
    }

    fn set_groups(&mut self, groups: &[u32]) -> io::Result<()> {
        set_groups(groups)
    }

    fn groups(&self) -> io::Result<Vec<u32>> {
        get_groups()
    }

    fn set_gid(&mut self, gid: u32) -> io::Result<()> {
        unistd::setgid(Gid::from_raw(gid)).map_err(io::Error::from)
    }

    fn set_uid(&mut self, uid: u32) -> io::Result<()> {
        unistd::setuid(Uid::from_raw(uid)).map_err(io::Error::from)
    }

    fn clear_environment(&mut self) -> io::Result<()> {
        let removed = crate::environment::clear()?;
        tracing::trace!(removed, "environment variables removed");
        Ok(())
    }

    fn environment_len(&self) -> usize {
        crate::environment::count()
    }
}

#[cfg(not(target_vendor = "apple"))]
fn set_groups(groups: &[u32]) -> io::Result<()> {
    let gids: Vec<Gid> = groups.iter().copied().map(Gid::from_raw).collect();
    unistd::setgroups(&gids).map_err(io::Error::from)
}

#[cfg(not(target_vendor = "apple"))]
fn get_groups() -> io::Result<Vec<u32>> {
    let gids = unistd::getgroups().map_err(io::Error::from)?;
    Ok(gids.into_iter().map(Gid::as_raw).collect())
}

// nix does not wrap setgroups/getgroups on Apple targets.
#[cfg(target_vendor = "apple")]
#[allow(unsafe_code)]
fn set_groups(groups: &[u32]) -> io::Result<()> {
    let len = libc::c_int::try_from(groups.len())
        .map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
    // SAFETY: the pointer and length describe the live `groups` slice and
    // `gid_t` is `u32` on Apple targets.
    let rc = unsafe { libc::setgroups(len, groups.as_ptr()) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(target_vendor = "apple")]
#[allow(unsafe_code)]
fn get_groups() -> io::Result<Vec<u32>> {
    // SAFETY: a zero count only queries the number of groups.
    let count = unsafe { libc::getgroups(0, std::ptr::null_mut()) };
    let len = usize::try_from(count).map_err(|_| io::Error::last_os_error())?;
    let mut groups = vec![0; len];
    // SAFETY: `groups` has room for `count` entries.
    let filled = unsafe { libc::getgroups(count, groups.as_mut_ptr()) };
    let filled = usize::try_from(filled).map_err(|_| io::Error::last_os_error())?;
    groups.truncate(filled);
    Ok(groups)
}
