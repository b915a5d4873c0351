//! Domain primitive types used across the privjail workspace.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// One step of the mitigation sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    /// Capability re-check and target validation.
    Precondition,
    /// `chroot(2)` into the confinement path.
    ConfineRoot,
    /// `chdir("/")` inside the new root.
    ChangeDirectory,
    /// `setgroups(2)` with an empty list.
    ClearGroups,
    /// Re-read of the supplementary group list.
    VerifyGroups,
    /// `setgid(2)` to the target group.
    SetGroup,
    /// Re-read of the real and effective group id.
    VerifyGroup,
    /// `setuid(2)` to the target user.
    SetUser,
    /// Re-read of the real and effective user id, plus a failed attempt to
    /// regain the superuser identity.
    VerifyUser,
    /// Removal of every environment variable.
    ClearEnvironment,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Precondition => "precondition",
            Self::ConfineRoot => "confine root",
            Self::ChangeDirectory => "change directory",
            Self::ClearGroups => "clear groups",
            Self::VerifyGroups => "verify groups",
            Self::SetGroup => "set group",
            Self::VerifyGroup => "verify group",
            Self::SetUser => "set user",
            Self::VerifyUser => "verify user",
            Self::ClearEnvironment => "clear environment",
        };
        f.write_str(name)
    }
}

/// Acceptance rule for the supplementary group list after it was cleared.
///
/// Some kernels report the effective group id as a member of the list even
/// after `setgroups(0, NULL)`. `AllowTargetGid` tolerates exactly one
/// remaining entry when it equals the group id about to be assigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupListPolicy {
    /// The list must be exactly empty.
    #[default]
    Strict,
    /// The list may contain the target group id and nothing else.
    AllowTargetGid,
}

impl GroupListPolicy {
    /// Returns `true` if `remaining` is an acceptable group list for a
    /// target group id of `gid`.
    #[must_use]
    pub fn accepts(self, remaining: &[u32], gid: u32) -> bool {
        match (self, remaining) {
            (_, []) => true,
            (Self::AllowTargetGid, [only]) => *only == gid,
            _ => false,
        }
    }
}

impl fmt::Display for GroupListPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::AllowTargetGid => write!(f, "allow-target-gid"),
        }
    }
}

/// The identity and confinement directory a process drops into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityTarget {
    uid: u32,
    gid: u32,
    root: PathBuf,
    group_policy: GroupListPolicy,
}

impl IdentityTarget {
    /// Creates a target with the strict group-list policy.
    #[must_use]
    pub fn new(uid: u32, gid: u32, root: impl Into<PathBuf>) -> Self {
        Self {
            uid,
            gid,
            root: root.into(),
            group_policy: GroupListPolicy::Strict,
        }
    }

    /// Replaces the group-list policy.
    #[must_use]
    pub const fn with_group_policy(mut self, policy: GroupListPolicy) -> Self {
        self.group_policy = policy;
        self
    }

    /// Target user id.
    #[must_use]
    pub const fn uid(&self) -> u32 {
        self.uid
    }

    /// Target group id.
    #[must_use]
    pub const fn gid(&self) -> u32 {
        self.gid
    }

    /// Directory that becomes the new filesystem root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Group-list policy applied after clearing supplementary groups.
    #[must_use]
    pub const fn group_policy(&self) -> GroupListPolicy {
        self.group_policy
    }
}

impl fmt::Display for IdentityTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "uid={} gid={} root={}",
            self.uid,
            self.gid,
            self.root.display()
        )
    }
}
