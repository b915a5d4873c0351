//! Error types for the privjail workspace.
//!
//! Three kinds are kept apart on purpose:
//! - [`PrivjailError`] for ordinary, recoverable failures of configuration
//!   and the collaborators around the mitigation.
//! - [`CapabilityUnavailable`], the only recoverable outcome of the
//!   mitigation itself.
//! - [`FatalError`], raised by a failed mitigation step. It never reaches a
//!   caller of the public activation functions: the process is terminated.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Step;

/// Top-level recoverable error type shared across the workspace.
#[derive(Debug, Error)]
pub enum PrivjailError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PrivjailError>;

/// Reason the mitigation cannot be attempted on this host or process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapabilityUnavailable {
    /// The process does not run with the superuser identity.
    #[error("effective uid is {euid}, superuser identity required")]
    NotSuperuser {
        /// Effective user id observed at check time.
        euid: u32,
    },

    /// Identity changes on this platform only affect the calling thread.
    #[error("identity changes are thread-local on this platform")]
    ThreadLocalIdentity,

    /// The platform lacks chroot, setgroups or setuid equivalents.
    #[error("privilege revocation is not supported on this platform")]
    UnsupportedPlatform,
}

/// Why a mitigation step failed.
#[derive(Debug, Error)]
pub enum FailureCause {
    /// The capability re-check reported the mitigation as unavailable.
    #[error("capability check failed: {0}")]
    Capability(#[from] CapabilityUnavailable),

    /// The target asks for a privileged user or group id.
    #[error("target {kind} id {id} is privileged")]
    PrivilegedTarget {
        /// `"user"` or `"group"`.
        kind: &'static str,
        /// The rejected id.
        id: u32,
    },

    /// The confinement path does not exist.
    #[error("confinement path {path} does not exist")]
    MissingRoot {
        /// Offending path.
        path: PathBuf,
    },

    /// The confinement path exists but is not a directory.
    #[error("confinement path {path} is not a directory")]
    NotADirectory {
        /// Offending path.
        path: PathBuf,
    },

    /// The underlying system call failed.
    #[error("system call failed: {source}")]
    Os {
        /// Underlying OS error.
        #[from]
        source: std::io::Error,
    },

    /// Supplementary groups are still present after clearing.
    #[error("supplementary groups not dropped: {remaining:?}")]
    GroupsRemaining {
        /// Group list observed after clearing.
        remaining: Vec<u32>,
    },

    /// A re-read id does not match the target.
    #[error("{kind} id mismatch: expected {expected}, got real={real} effective={effective}")]
    IdMismatch {
        /// `"user"` or `"group"`.
        kind: &'static str,
        /// Target id.
        expected: u32,
        /// Observed real id.
        real: u32,
        /// Observed effective id.
        effective: u32,
    },

    /// The superuser identity could be regained after the drop.
    #[error("{kind} id 0 could be restored after the drop")]
    Restorable {
        /// `"user"` or `"group"`.
        kind: &'static str,
    },

    /// Variables survived the environment clear.
    #[error("{remaining} environment variables survived clearing")]
    EnvironmentRemaining {
        /// Number of surviving variables.
        remaining: usize,
    },
}

/// A failed mitigation step. Continuing after one is never safe.
#[derive(Debug, Error)]
#[error("mitigation step `{step}` failed: {cause}")]
pub struct FatalError {
    /// Step that failed.
    pub step: Step,
    /// Underlying cause.
    #[source]
    pub cause: FailureCause,
}

impl FatalError {
    /// Creates a fatal error for `step`.
    pub fn new(step: Step, cause: impl Into<FailureCause>) -> Self {
        Self {
            step,
            cause: cause.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_error_names_step_and_cause() {
        let err = FatalError::new(
            Step::VerifyGroups,
            FailureCause::GroupsRemaining {
                remaining: vec![4, 27],
            },
        );
        assert_eq!(
            err.to_string(),
            "mitigation step `verify groups` failed: supplementary groups not dropped: [4, 27]"
        );
    }

    #[test]
    fn capability_cause_converts_from_unavailable() {
        let err = FatalError::new(
            Step::Precondition,
            CapabilityUnavailable::NotSuperuser { euid: 1000 },
        );
        assert!(matches!(
            err.cause,
            FailureCause::Capability(CapabilityUnavailable::NotSuperuser { euid: 1000 })
        ));
        assert!(err.to_string().contains("capability check failed"));
    }

    #[test]
    fn missing_root_names_the_path() {
        let err = FatalError::new(
            Step::ConfineRoot,
            FailureCause::MissingRoot {
                path: PathBuf::from("/nonexistent/jail"),
            },
        );
        assert_eq!(
            err.to_string(),
            "mitigation step `confine root` failed: confinement path /nonexistent/jail does not exist"
        );
    }
}
