//! Configuration model for the confined file server.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PrivjailError, Result};
use crate::types::GroupListPolicy;

/// Settings resolved before the privilege drop.
///
/// Everything here must be known before activation: afterwards the
/// configuration file is outside the confined root and the environment is
/// empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    /// Socket address to listen on, possibly a privileged port.
    pub listen: String,
    /// Account name to switch to.
    pub user: String,
    /// Directory to confine the process to and serve.
    pub root: PathBuf,
    /// Exit instead of serving unconfined when the mitigation is unavailable.
    pub require_mitigation: bool,
    /// Acceptance rule for the group list after clearing.
    pub group_policy: GroupListPolicy,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            listen: crate::constants::DEFAULT_LISTEN.into(),
            user: crate::constants::DEFAULT_USER.into(),
            root: PathBuf::from(crate::constants::DEFAULT_ROOT),
            require_mitigation: false,
            group_policy: GroupListPolicy::default(),
        }
    }
}

impl ServeConfig {
    /// Loads a configuration from a JSON file. Missing fields keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`ServeConfig::validate`].
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| PrivjailError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would only fail later, at bind or activation time.
    ///
    /// # Errors
    ///
    /// Returns [`PrivjailError::Config`] for an empty user name or listen
    /// address, or a relative root.
    pub fn validate(&self) -> Result<()> {
        if self.user.trim().is_empty() {
            return Err(PrivjailError::Config {
                message: "user must not be empty".into(),
            });
        }
        if self.listen.trim().is_empty() {
            return Err(PrivjailError::Config {
                message: "listen address must not be empty".into(),
            });
        }
        if !self.root.is_absolute() {
            return Err(PrivjailError::Config {
                message: format!("root must be an absolute path: {}", self.root.display()),
            });
        }
        Ok(())
    }
}
