//! CLI command definitions and dispatch.

pub mod check;
pub mod serve;

use clap::{Parser, Subcommand};

/// privjail: serve a directory from a chrooted, unprivileged process.
#[derive(Parser, Debug)]
#[command(name = "privjail", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Bind, drop privileges into the document root, and serve it over HTTP.
    Serve(serve::ServeArgs),
    /// Report whether privileges can be revoked on this host.
    Check(check::CheckArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => serve::execute(args),
        Command::Check(args) => check::execute(&args),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::check::CheckArgs;
    use super::*;

    #[test]
    fn parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "privjail",
            "serve",
            "--listen",
            "127.0.0.1:8080",
            "--user",
            "nobody",
            "--root",
            "/srv/htdocs",
            "--require-mitigation",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            unreachable!("parsed a different subcommand");
        };
        assert_eq!(args.listen.as_deref(), Some("127.0.0.1:8080"));
        assert_eq!(args.user.as_deref(), Some("nobody"));
        assert!(args.require_mitigation);
        assert!(!args.allow_target_gid);
    }

    #[test]
    fn parses_check_json() {
        let cli = Cli::try_parse_from(["privjail", "check", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::Check(CheckArgs { json: true })));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["privjail", "restore"]).is_err());
    }
}
