//! Capability check: can the mitigation be attempted here?
//!
//! The answer depends on the effective user id and on how the host applies
//! identity changes. [`PLATFORM`] is fixed at compile time so a host where
//! `setuid(2)` only affects the calling thread reports `false` up front
//! instead of leaving other threads running as root.

use std::fmt;

use privjail_common::constants::SUPERUSER_ID;
use privjail_common::error::CapabilityUnavailable;
use privjail_common::types::IdentityTarget;

use crate::kernel::{Kernel, ProcessPrivileges};
use crate::sequencer::{self, Confined};

/// How the host applies identity changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformSupport {
    /// `setuid`/`setgid`/`setgroups` take effect for every thread of the
    /// process. Activation is safe.
    ProcessWide,
    /// Identity changes only affect the calling kernel thread. Other
    /// threads would keep root, so activation is refused.
    ThreadLocal,
    /// No chroot, setgroups or setuid equivalents.
    Unsupported,
}

impl PlatformSupport {
    /// Returns `true` if the mitigation can be applied on this platform.
    #[must_use]
    pub const fn is_safe(self) -> bool {
        matches!(self, Self::ProcessWide)
    }
}

impl fmt::Display for PlatformSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProcessWide => write!(f, "process-wide"),
            Self::ThreadLocal => write!(f, "thread-local"),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// Identity change semantics of the compilation target.
///
/// glibc and musl broadcast `setuid`/`setgid`/`setgroups` to all threads on
/// Linux; the BSDs and macOS keep credentials per process. Other Unix C
/// libraries are treated as thread-local.
pub const PLATFORM: PlatformSupport = if cfg!(any(
    all(target_os = "linux", any(target_env = "gnu", target_env = "musl")),
    target_os = "macos",
    target_os = "freebsd",
    target_os = "openbsd",
    target_os = "netbsd",
    target_os = "dragonfly",
)) {
    PlatformSupport::ProcessWide
} else if cfg!(unix) {
    PlatformSupport::ThreadLocal
} else {
    PlatformSupport::Unsupported
};

/// Proof that the capability check passed.
///
/// Consumed by [`ActivationPermit::activate`], so one permit drives at most
/// one activation.
#[derive(Debug)]
#[must_use = "a permit does nothing until activated"]
pub struct ActivationPermit {
    _private: (),
}

impl ActivationPermit {
    /// Runs the mitigation sequence for `target`.
    ///
    /// The capability check is repeated as the first step. Returns only
    /// when every step succeeded and was verified; any failure terminates
    /// the process.
    pub fn activate(self, target: &IdentityTarget) -> Confined {
        sequencer::activate_target(target)
    }
}

/// Returns `true` if [`crate::activate`] can be attempted: the process runs
/// with effective uid 0 on a platform with process-wide identity changes.
///
/// Side-effect free; safe to call any number of times.
#[must_use]
pub fn can_activate() -> bool {
    check().is_ok()
}

/// Like [`can_activate`], but explains a negative answer.
///
/// # Errors
///
/// Returns the [`CapabilityUnavailable`] reason when the mitigation cannot
/// be attempted.
pub fn check() -> Result<ActivationPermit, CapabilityUnavailable> {
    evaluate(&ProcessPrivileges::acquire(), PLATFORM)?;
    Ok(ActivationPermit { _private: () })
}

/// Effective user id of the calling process.
#[must_use]
pub fn effective_uid() -> u32 {
    ProcessPrivileges::acquire().effective_uid()
}

pub(crate) fn evaluate<K: Kernel>(
    kernel: &K,
    platform: PlatformSupport,
) -> Result<(), CapabilityUnavailable> {
    match platform {
        PlatformSupport::Unsupported => Err(CapabilityUnavailable::UnsupportedPlatform),
        PlatformSupport::ThreadLocal => Err(CapabilityUnavailable::ThreadLocalIdentity),
        PlatformSupport::ProcessWide => {
            let euid = kernel.effective_uid();
            if euid == SUPERUSER_ID {
                Ok(())
            } else {
                Err(CapabilityUnavailable::NotSuperuser { euid })
            }
        }
    }
}
