//! `privjail serve`: bind, revoke privileges, then serve files.
//!
//! The order is fixed: every privileged resource is acquired first, the
//! mitigation runs on the only thread of the process, and the async runtime
//! with its worker threads is created afterwards.

use std::net::TcpListener;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use privjail_common::config::ServeConfig;
use privjail_common::constants::CONFINED_ROOT;
use privjail_common::error::Result;
use privjail_common::types::GroupListPolicy;
use privjail_core::account::resolve_account;

use crate::server;

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// JSON configuration file; flags override its values.
    #[arg(short, long, env = "PRIVJAIL_CONFIG")]
    pub config: Option<PathBuf>,

    /// [address]:port to serve HTTP on.
    #[arg(long, env = "PRIVJAIL_LISTEN")]
    pub listen: Option<String>,

    /// Unprivileged account to switch to.
    #[arg(long, env = "PRIVJAIL_USER")]
    pub user: Option<String>,

    /// Directory to confine the process to and serve.
    #[arg(long, env = "PRIVJAIL_ROOT")]
    pub root: Option<PathBuf>,

    /// Refuse to serve when privileges cannot be revoked.
    #[arg(long)]
    pub require_mitigation: bool,

    /// Accept the target group as the only group left after clearing.
    #[arg(long)]
    pub allow_target_gid: bool,
}

impl ServeArgs {
    /// Merges the optional configuration file with command-line overrides.
    fn resolve(&self) -> Result<ServeConfig> {
        let mut config = match &self.config {
            Some(path) => ServeConfig::load(path)?,
            None => ServeConfig::default(),
        };
        if let Some(listen) = &self.listen {
            config.listen.clone_from(listen);
        }
        if let Some(user) = &self.user {
            config.user.clone_from(user);
        }
        if let Some(root) = &self.root {
            config.root.clone_from(root);
        }
        config.require_mitigation |= self.require_mitigation;
        if self.allow_target_gid {
            config.group_policy = GroupListPolicy::AllowTargetGid;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Executes the `serve` command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the listener cannot be
/// bound, the account does not exist, or serving fails. A failed privilege
/// drop does not return: it terminates the process.
pub fn execute(args: ServeArgs) -> anyhow::Result<()> {
    let config = args.resolve()?;

    // May be a privileged port; impossible once privileges are gone.
    let listener = TcpListener::bind(&config.listen)
        .with_context(|| format!("failed to bind {}", config.listen))?;
    listener.set_nonblocking(true)?;
    tracing::info!(listen = %config.listen, "listener bound");

    let serve_root = revoke_privileges(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(server::serve(listener, serve_root))
}

/// Drops into the configured account and root when possible. Returns the
/// directory to serve from the process's point of view.
fn revoke_privileges(config: &ServeConfig) -> anyhow::Result<PathBuf> {
    match privjail_core::check() {
        Ok(permit) => {
            let account = resolve_account(&config.user)?;
            let target = account
                .target(&config.root)
                .with_group_policy(config.group_policy);
            let confined = permit.activate(&target);
            tracing::info!(
                user = %account.name,
                uid = confined.uid(),
                gid = confined.gid(),
                "confined to {}",
                config.root.display()
            );
            Ok(PathBuf::from(CONFINED_ROOT))
        }
        Err(reason) if config.require_mitigation => Err(anyhow::anyhow!(
            "privilege revocation required but unavailable: {reason}"
        )),
        Err(reason) => {
            tracing::warn!(%reason, "cannot revoke privileges, serving unconfined");
            Ok(unconfined_root(&config.root))
        }
    }
}

fn unconfined_root(root: &Path) -> PathBuf {
    root.canonicalize().unwrap_or_else(|_| root.to_path_buf())
}
