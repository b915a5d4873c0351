//! Account lookup for building an [`IdentityTarget`].
//!
//! The account database lives outside any confinement directory, so
//! lookups must happen before activation.

use std::path::PathBuf;

use privjail_common::error::{PrivjailError, Result};
use privjail_common::types::IdentityTarget;

/// A host account resolved from the user database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Login name.
    pub name: String,
    /// User id.
    pub uid: u32,
    /// Primary group id.
    pub gid: u32,
}

impl Account {
    /// Builds a target that drops to this account and confines to `root`.
    #[must_use]
    pub fn target(&self, root: impl Into<PathBuf>) -> IdentityTarget {
        IdentityTarget::new(self.uid, self.gid, root)
    }
}

/// Looks up `name` in the host account database.
///
/// # Errors
///
/// Returns [`PrivjailError::NotFound`] if no such account exists, or
/// [`PrivjailError::Config`] if the lookup itself fails.
#[cfg(unix)]
pub fn resolve_account(name: &str) -> Result<Account> {
    use nix::unistd::User;

    let user = User::from_name(name)
        .map_err(|e| PrivjailError::Config {
            message: format!("account lookup for {name} failed: {e}"),
        })?
        .ok_or_else(|| PrivjailError::NotFound {
            kind: "account",
            id: name.to_string(),
        })?;
    tracing::debug!(name, uid = user.uid.as_raw(), gid = user.gid.as_raw(), "resolved account");
    Ok(Account {
        name: user.name,
        uid: user.uid.as_raw(),
        gid: user.gid.as_raw(),
    })
}

/// Stub for non-Unix platforms.
///
/// # Errors
///
/// Always returns an error: account lookup requires a Unix host.
#[cfg(not(unix))]
pub fn resolve_account(_name: &str) -> Result<Account> {
    Err(PrivjailError::Config {
        message: "Unix required for account lookup".into(),
    })
}
