//! The mitigation sequencer.
//!
//! Runs a fixed, linear sequence against the process privilege state:
//!
//! 1. re-run the capability check and validate the target
//! 2. `chroot(2)` into the confinement path, with core dumps disabled first
//! 3. `chdir("/")`, immediately after the chroot
//! 4. drop all supplementary groups
//! 5. verify the group list against the target's [`GroupListPolicy`]
//! 6. `setgid(2)` to the target group
//! 7. verify real and effective gid
//! 8. `setuid(2)` to the target user, always after the group change
//! 9. verify real and effective uid, and that uid 0 / gid 0 cannot be
//!    regained
//! 10. clear the environment and verify it is empty
//!
//! Any failure aborts the process. There is no retry and no rollback.
//!
//! [`GroupListPolicy`]: privjail_common::types::GroupListPolicy

use std::io;
use std::path::Path;

use privjail_common::constants::{APP_NAME, CONFINED_ROOT, SUPERUSER_ID};
use privjail_common::error::{FailureCause, FatalError};
use privjail_common::types::{IdentityTarget, Step};

use crate::capability::{self, PLATFORM, PlatformSupport};
use crate::kernel::{Kernel, ProcessPrivileges};

/// Proof that the mitigation was fully applied.
///
/// From here on the process is confined to the target root, runs as the
/// target user and group, and has an empty environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Confined {
    uid: u32,
    gid: u32,
}

impl Confined {
    /// User id the process now runs as.
    pub const fn uid(&self) -> u32 {
        self.uid
    }

    /// Group id the process now runs as.
    pub const fn gid(&self) -> u32 {
        self.gid
    }
}

/// Drops to `uid`/`gid` and confines the process to `root`, using the
/// strict group-list policy. See [`activate_target`] for other policies.
///
/// Must be called once, before any other thread is started and after every
/// privileged resource (such as a listener on a low port) has been opened.
/// Returns only on full success; any failure terminates the process. A
/// second call fails at the capability re-check.
pub fn activate(uid: u32, gid: u32, root: impl AsRef<Path>) -> Confined {
    activate_target(&IdentityTarget::new(uid, gid, root.as_ref()))
}

/// Applies the mitigation for `target`.
///
/// Same contract as [`activate`]: returns only on full success, and any
/// failure reports the step once and aborts the process.
pub fn activate_target(target: &IdentityTarget) -> Confined {
    let mut privileges = ProcessPrivileges::acquire();
    match run(&mut privileges, PLATFORM, target) {
        Ok(confined) => confined,
        Err(err) => fail_fast(&err),
    }
}

/// Reports the failed step and aborts. Unwinding or `exit` handlers could
/// run code with a half-dropped identity, so neither is used.
#[allow(clippy::print_stderr)]
fn fail_fast(err: &FatalError) -> ! {
    let subscribed = tracing::dispatcher::get_default(|dispatch| {
        !dispatch.is::<tracing::subscriber::NoSubscriber>()
    });
    if subscribed {
        tracing::error!(step = %err.step, error = %err, "privilege mitigation failed, aborting");
    } else {
        eprintln!("{APP_NAME}: {err}");
    }
    std::process::abort()
}

pub(crate) fn run<K: Kernel>(
    kernel: &mut K,
    platform: PlatformSupport,
    target: &IdentityTarget,
) -> Result<Confined, FatalError> {
    let (uid, gid) = (target.uid(), target.gid());

    checked(Step::Precondition, precondition(kernel, platform, target))?;

    checked(Step::ConfineRoot, confine(kernel, target.root()))?;
    checked(Step::ChangeDirectory, kernel.chdir(Path::new(CONFINED_ROOT)))?;

    checked(Step::ClearGroups, kernel.set_groups(&[]))?;
    checked(Step::VerifyGroups, verify_groups(kernel, target))?;

    checked(Step::SetGroup, kernel.set_gid(gid))?;
    checked(
        Step::VerifyGroup,
        verify_id("group", gid, kernel.real_gid(), kernel.effective_gid()),
    )?;

    checked(Step::SetUser, kernel.set_uid(uid))?;
    checked(Step::VerifyUser, verify_user(kernel, uid))?;

    checked(Step::ClearEnvironment, clear_environment(kernel))?;

    tracing::info!(uid, gid, root = %target.root().display(), "privileges revoked");
    Ok(Confined { uid, gid })
}

fn checked<T, E: Into<FailureCause>>(step: Step, result: Result<T, E>) -> Result<T, FatalError> {
    let value = result.map_err(|e| FatalError::new(step, e))?;
    tracing::debug!(%step, "mitigation step verified");
    Ok(value)
}

fn precondition<K: Kernel>(
    kernel: &K,
    platform: PlatformSupport,
    target: &IdentityTarget,
) -> Result<(), FailureCause> {
    capability::evaluate(kernel, platform)?;
    if target.uid() == SUPERUSER_ID {
        return Err(FailureCause::PrivilegedTarget {
            kind: "user",
            id: target.uid(),
        });
    }
    if target.gid() == SUPERUSER_ID {
        return Err(FailureCause::PrivilegedTarget {
            kind: "group",
            id: target.gid(),
        });
    }
    Ok(())
}

fn confine<K: Kernel>(kernel: &mut K, root: &Path) -> Result<(), FailureCause> {
    let metadata = std::fs::metadata(root).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => FailureCause::MissingRoot {
            path: root.to_path_buf(),
        },
        _ => FailureCause::from(e),
    })?;
    if !metadata.is_dir() {
        return Err(FailureCause::NotADirectory {
            path: root.to_path_buf(),
        });
    }
    // An abort after this point runs as root inside `root`; it must not
    // leave a core file there.
    kernel.disable_core_dumps()?;
    kernel.chroot(root)?;
    Ok(())
}

fn verify_groups<K: Kernel>(kernel: &K, target: &IdentityTarget) -> Result<(), FailureCause> {
    let remaining = kernel.groups()?;
    if target.group_policy().accepts(&remaining, target.gid()) {
        Ok(())
    } else {
        Err(FailureCause::GroupsRemaining { remaining })
    }
}

fn verify_id(
    kind: &'static str,
    expected: u32,
    real: u32,
    effective: u32,
) -> Result<(), FailureCause> {
    if real == expected && effective == expected {
        Ok(())
    } else {
        Err(FailureCause::IdMismatch {
            kind,
            expected,
            real,
            effective,
        })
    }
}

fn verify_user<K: Kernel>(kernel: &mut K, uid: u32) -> Result<(), FailureCause> {
    verify_id("user", uid, kernel.real_uid(), kernel.effective_uid())?;
    if kernel.set_uid(SUPERUSER_ID).is_ok() {
        return Err(FailureCause::Restorable { kind: "user" });
    }
    if kernel.set_gid(SUPERUSER_ID).is_ok() {
        return Err(FailureCause::Restorable { kind: "group" });
    }
    Ok(())
}

fn clear_environment<K: Kernel>(kernel: &mut K) -> Result<(), FailureCause> {
    kernel.clear_environment()?;
    match kernel.environment_len() {
        0 => Ok(()),
        remaining => Err(FailureCause::EnvironmentRemaining { remaining }),
    }
}
