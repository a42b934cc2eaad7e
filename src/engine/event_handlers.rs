// src/engine/event_handlers.rs

//! Event handling logic for the core supervisor.

use tracing::{debug, warn};

use crate::engine::SupervisorState;
use crate::notice::Notice;
use crate::watch::{ChangeEvent, WatchProfile};

/// Command produced by the pure core, to be executed by the outer IO shell
/// in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Start the namespace's run command.
    StartProcess,
    /// Terminate the current process tree and wait for it.
    TerminateProcess,
    /// Emit a lifecycle notice.
    Notify(Notice),
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn nothing() -> Self {
        Self {
            commands: Vec::new(),
            keep_running: true,
        }
    }

    fn run(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

pub fn handle_boot(state: &mut SupervisorState) -> CoreStep {
    if *state != SupervisorState::Idle {
        return CoreStep::nothing();
    }
    *state = SupervisorState::Starting;
    CoreStep::run(vec![CoreCommand::StartProcess])
}

/// Handle a change notification.
///
/// Irrelevant paths are dropped. A relevant one restarts the process:
/// terminate first, then start, never the other way round.
pub fn handle_file_change(
    state: &mut SupervisorState,
    profile: &WatchProfile,
    event: ChangeEvent,
) -> CoreStep {
    match *state {
        SupervisorState::Starting | SupervisorState::Running | SupervisorState::Restarting => {}
        SupervisorState::Idle | SupervisorState::ShuttingDown | SupervisorState::Terminated => {
            debug!(path = %event.path, ?state, "ignoring change outside of running state");
            return CoreStep::nothing();
        }
    }

    if !profile.matches(&event.path) {
        debug!(path = %event.path, kind = %event.kind, "change not watched by namespace");
        return CoreStep::nothing();
    }

    *state = SupervisorState::Restarting;
    CoreStep::run(vec![
        CoreCommand::Notify(Notice::FileChanged(event.path)),
        CoreCommand::TerminateProcess,
        CoreCommand::StartProcess,
    ])
}

/// Watcher errors are informational; the loop keeps going.
pub fn handle_watch_error(message: &str) -> CoreStep {
    warn!(error = %message, "file watcher error");
    CoreStep::nothing()
}

/// Report the outcome of a `StartProcess` command.
pub fn handle_start_result(state: &mut SupervisorState, started: bool) -> CoreStep {
    match *state {
        SupervisorState::Starting | SupervisorState::Restarting => {
            // A failed start still counts as running: we keep watching and
            // the next change retries.
            *state = SupervisorState::Running;
            if started {
                CoreStep::run(vec![CoreCommand::Notify(Notice::Started)])
            } else {
                CoreStep::nothing()
            }
        }
        _ => CoreStep::nothing(),
    }
}

pub fn handle_shutdown(state: &mut SupervisorState) -> CoreStep {
    match *state {
        SupervisorState::ShuttingDown | SupervisorState::Terminated => CoreStep {
            commands: Vec::new(),
            keep_running: false,
        },
        _ => {
            *state = SupervisorState::ShuttingDown;
            CoreStep {
                commands: vec![
                    CoreCommand::Notify(Notice::Stopped),
                    CoreCommand::TerminateProcess,
                ],
                keep_running: false,
            }
        }
    }
}
