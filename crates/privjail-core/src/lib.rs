//! # privjail-core
//!
//! Irreversible privilege revocation for processes that start as root and
//! must handle untrusted input.
//!
//! The crate exposes two operations:
//! - [`can_activate`] / [`check`]: whether the mitigation can be attempted
//!   on this host and process.
//! - [`activate`] / [`activate_target`] / [`ActivationPermit::activate`]:
//!   confine the filesystem view, drop supplementary groups, change group
//!   and user identity and clear the environment, verifying each step.
//!
//! Activation either succeeds completely or terminates the process. A
//! partially applied drop is never returned to the caller.
//!
//! ## Threads
//!
//! Identity changes must cover the whole process. Activate before any other
//! thread or async runtime is started; see [`PlatformSupport`] for the hosts
//! where this holds.

pub mod account;
pub mod capability;
mod environment;
mod kernel;
pub mod sequencer;

pub use capability::{ActivationPermit, PLATFORM, PlatformSupport, can_activate, check};
pub use privjail_common::types::{GroupListPolicy, IdentityTarget};
pub use sequencer::{Confined, activate, activate_target};
