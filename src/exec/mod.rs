// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`command`] splits a run string into program + arguments.
//! - [`backend`] provides the `ProcessBackend` trait and the production
//!   `SystemProcessBackend`; tests replace it with a fake.
//! - [`platform`] holds the unix process-group / windows job-object code.
//! - [`controller`] owns the single managed process.

pub mod backend;
pub mod command;
pub mod controller;
pub mod platform;

pub use backend::{ManagedHandle, ManagedProcess, ProcessBackend, SystemProcessBackend};
pub use command::CommandLine;
pub use controller::ProcessController;
