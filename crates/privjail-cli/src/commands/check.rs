//! `privjail check`: report whether the mitigation can be activated.

use clap::Args;
use serde::Serialize;

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Capability report printed by `check`.
#[derive(Debug, Serialize)]
struct Report {
    platform: String,
    euid: u32,
    can_activate: bool,
    reason: Option<String>,
}

impl Report {
    fn collect() -> Self {
        let reason = privjail_core::check().err().map(|e| e.to_string());
        Self {
            platform: privjail_core::PLATFORM.to_string(),
            euid: privjail_core::capability::effective_uid(),
            can_activate: reason.is_none(),
            reason,
        }
    }

    fn render(&self) -> String {
        let status = if self.can_activate { "yes" } else { "no" };
        let mut text = format!(
            "platform:     {}\neuid:         {}\ncan activate: {status}",
            self.platform, self.euid
        );
        if let Some(reason) = &self.reason {
            text.push_str("\nreason:       ");
            text.push_str(reason);
        }
        text
    }
}

/// Executes the `check` command.
///
/// # Errors
///
/// Returns an error if the mitigation cannot be activated, so the exit
/// status can drive scripts.
#[allow(clippy::print_stdout)]
pub fn execute(args: &CheckArgs) -> anyhow::Result<()> {
    let report = Report::collect();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.render());
    }
    if report.can_activate {
        Ok(())
    } else {
        Err(anyhow::anyhow!("privilege revocation unavailable"))
    }
}
