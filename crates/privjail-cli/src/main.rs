//! # privjail: confined file server
//!
//! Binds its listener as root, drops to an unprivileged account inside a
//! chroot, and only then starts serving.

mod commands;
mod server;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    // RUST_LOG is read here, before activation empties the environment.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
        )
        .init();

    let cli = Cli::parse();
    commands::execute(cli)
}
