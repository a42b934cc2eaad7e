// src/engine/mod.rs

//! Supervision engine for grape.
//!
//! This module ties together:
//! - the pure state machine deciding when to start / terminate / notify
//!   ([`core`], [`event_handlers`])
//! - the async shell that owns the managed process and reacts to:
//!   - file change events
//!   - watcher errors
//!   - shutdown signals
//!   ([`runtime`], [`signals`])

use crate::watch::ChangeEvent;

/// Lifecycle of a supervised namespace.
///
/// `Idle → Starting → Running → Restarting → Running … → ShuttingDown →
/// Terminated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    Idle,
    Starting,
    Running,
    Restarting,
    ShuttingDown,
    Terminated,
}

/// Events flowing into the supervisor.
#[derive(Debug, Clone)]
pub enum SupervisorEvent {
    /// A write/create notification from the watcher.
    FileChanged(ChangeEvent),
    /// The watcher reported an internal error.
    WatchFailed(String),
    /// Graceful shutdown requested (SIGINT / SIGTERM).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;
pub mod signals;

pub use self::core::CoreSupervisor;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Supervisor;
pub use signals::{spawn_signal_listener, OsSignals, ShutdownSignal};
