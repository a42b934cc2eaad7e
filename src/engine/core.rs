// src/engine/core.rs

//! Pure core supervisor state machine.
//!
//! This module contains a synchronous, deterministic "core" that consumes
//! [`SupervisorEvent`]s and produces:
//! - an updated [`SupervisorState`]
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Supervisor`) is responsible for:
//! - reading events and shutdown requests
//! - starting / terminating the managed process
//! - printing notices
//!
//! The core has no channels, no Tokio types, and does not perform any IO.

use crate::engine::event_handlers::{
    handle_boot, handle_file_change, handle_shutdown, handle_start_result, handle_watch_error,
    CoreCommand, CoreStep,
};
use crate::engine::{SupervisorEvent, SupervisorState};
use crate::watch::WatchProfile;

#[derive(Debug)]
pub struct CoreSupervisor {
    state: SupervisorState,
    profile: WatchProfile,
    restarts: u64,
}

impl CoreSupervisor {
    pub fn new(profile: WatchProfile) -> Self {
        Self {
            state: SupervisorState::Idle,
            profile,
            restarts: 0,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Number of restart cycles decided so far.
    pub fn restarts(&self) -> u64 {
        self.restarts
    }

    /// Leave `Idle` and start the first process.
    pub fn boot(&mut self) -> CoreStep {
        handle_boot(&mut self.state)
    }

    /// Handle a single event, updating state and returning the resulting
    /// commands for the IO shell.
    pub fn step(&mut self, event: SupervisorEvent) -> CoreStep {
        match event {
            SupervisorEvent::FileChanged(change) => {
                let step = handle_file_change(&mut self.state, &self.profile, change);
                if step.commands.contains(&CoreCommand::StartProcess) {
                    self.restarts += 1;
                }
                step
            }
            SupervisorEvent::WatchFailed(message) => handle_watch_error(&message),
            SupervisorEvent::ShutdownRequested => handle_shutdown(&mut self.state),
        }
    }

    /// Feed back whether the last `StartProcess` succeeded.
    pub fn process_started(&mut self, started: bool) -> CoreStep {
        handle_start_result(&mut self.state, started)
    }

    /// Shutdown commands have been executed.
    pub fn finish(&mut self) {
        self.state = SupervisorState::Terminated;
    }
}
