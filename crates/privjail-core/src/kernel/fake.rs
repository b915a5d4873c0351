//! Recording in-memory kernel for unit tests.

use std::io;
use std::path::{Path, PathBuf};

use super::Kernel;

/// A privilege-affecting call, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    DisableCoreDumps,
    Chroot(PathBuf),
    Chdir(PathBuf),
    SetGroups(Vec<u32>),
    SetGid(u32),
    SetUid(u32),
    ClearEnvironment,
}

/// Operation that should fail with `EPERM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    DisableCoreDumps,
    Chroot,
    Chdir,
    SetGroups,
    GetGroups,
    SetGid,
    SetUid,
    ClearEnvironment,
}

/// Models a root process with POSIX `setuid` semantics.
#[derive(Debug)]
pub(crate) struct FakeKernel {
    pub real_uid: u32,
    pub effective_uid: u32,
    pub real_gid: u32,
    pub effective_gid: u32,
    pub groups: Vec<u32>,
    pub env_vars: usize,
    pub calls: Vec<Call>,
    pub fail_on: Option<Op>,
    /// Groups that survive `setgroups`.
    pub sticky_groups: Vec<u32>,
    /// `setgid` reports success without changing anything.
    pub ignore_setgid: bool,
    /// `setuid` reports success without changing anything.
    pub ignore_setuid: bool,
    /// Id changes are allowed even after leaving root.
    pub restorable: bool,
    /// Variables that survive clearing.
    pub sticky_env: usize,
}

impl FakeKernel {
    pub(crate) fn root() -> Self {
        Self {
            real_uid: 0,
            effective_uid: 0,
            real_gid: 0,
            effective_gid: 0,
            groups: vec![0, 4, 27],
            env_vars: 12,
            calls: Vec::new(),
            fail_on: None,
            sticky_groups: Vec::new(),
            ignore_setgid: false,
            ignore_setuid: false,
            restorable: false,
            sticky_env: 0,
        }
    }

    pub(crate) fn user(uid: u32, gid: u32) -> Self {
        Self {
            real_uid: uid,
            effective_uid: uid,
            real_gid: gid,
            effective_gid: gid,
            groups: Vec::new(),
            ..Self::root()
        }
    }

    /// Returns `true` if any identity-changing call was attempted.
    pub(crate) fn changed_identity(&self) -> bool {
        self.calls.iter().any(|call| {
            matches!(
                call,
                Call::SetGroups(_) | Call::SetGid(_) | Call::SetUid(_)
            )
        })
    }

    fn record(&mut self, call: Call, op: Op) -> io::Result<()> {
        self.calls.push(call);
        if self.fail_on == Some(op) {
            return Err(io::Error::from_raw_os_error(1));
        }
        Ok(())
    }

    fn privileged(&self) -> io::Result<()> {
        if self.effective_uid == 0 || self.restorable {
            Ok(())
        } else {
            Err(io::Error::from_raw_os_error(1))
        }
    }
}

impl Kernel for FakeKernel {
    fn real_uid(&self) -> u32 {
        self.real_uid
    }

    fn effective_uid(&self) -> u32 {
        self.effective_uid
    }

    fn real_gid(&self) -> u32 {
        self.real_gid
    }

    fn effective_gid(&self) -> u32 {
        self.effective_gid
    }

    fn disable_core_dumps(&mut self) -> io::Result<()> {
        self.record(Call::DisableCoreDumps, Op::DisableCoreDumps)
    }

    fn chroot(&mut self, path: &Path) -> io::Result<()> {
        self.record(Call::Chroot(path.to_path_buf()), Op::Chroot)
    }

    fn chdir(&mut self, path: &Path) -> io::Result<()> {
        self.record(Call::Chdir(path.to_path_buf()), Op::Chdir)
    }

    fn set_groups(&mut self, groups: &[u32]) -> io::Result<()> {
        self.record(Call::SetGroups(groups.to_vec()), Op::SetGroups)?;
        self.privileged()?;
        self.groups = groups.to_vec();
        self.groups.extend(&self.sticky_groups);
        Ok(())
    }

    fn groups(&self) -> io::Result<Vec<u32>> {
        if self.fail_on == Some(Op::GetGroups) {
            return Err(io::Error::from_raw_os_error(22));
        }
        Ok(self.groups.clone())
    }

    fn set_gid(&mut self, gid: u32) -> io::Result<()> {
        self.record(Call::SetGid(gid), Op::SetGid)?;
        self.privileged()?;
        if !self.ignore_setgid {
            self.real_gid = gid;
            self.effective_gid = gid;
        }
        Ok(())
    }

    fn set_uid(&mut self, uid: u32) -> io::Result<()> {
        self.record(Call::SetUid(uid), Op::SetUid)?;
        self.privileged()?;
        if !self.ignore_setuid {
            self.real_uid = uid;
            self.effective_uid = uid;
        }
        Ok(())
    }

    fn clear_environment(&mut self) -> io::Result<()> {
        self.record(Call::ClearEnvironment, Op::ClearEnvironment)?;
        self.env_vars = self.sticky_env;
        Ok(())
    }

    fn environment_len(&self) -> usize {
        self.env_vars
    }
}
