//! # privjail-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the privjail workspace.
//!
//! This crate is the leaf of the dependency graph. It performs no system
//! calls; the privilege-affecting operations live in `privjail-core`.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
