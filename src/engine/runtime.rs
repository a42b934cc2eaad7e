// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::{ProcessBackend, ProcessController};
use crate::notice::NoticeSink;
use crate::watch::ChangeStreams;

use super::core::CoreSupervisor;
use super::signals::ShutdownSignal;
use super::{CoreCommand, SupervisorEvent};

/// Drives the core supervisor in response to change events, watcher errors
/// and shutdown requests, and performs the resulting process operations.
///
/// This task is the only owner of the managed process: every start and
/// terminate goes through it, one at a time, so restarts can never overlap.
pub struct Supervisor<B: ProcessBackend> {
    core: CoreSupervisor,
    controller: ProcessController<B>,
    command: String,
    streams: ChangeStreams,
    shutdown: ShutdownSignal,
    notices: Box<dyn NoticeSink>,
}

impl<B: ProcessBackend> fmt::Debug for Supervisor<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("core", &self.core)
            .field("controller", &self.controller)
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> Supervisor<B> {
    pub fn new(
        core: CoreSupervisor,
        controller: ProcessController<B>,
        command: impl Into<String>,
        streams: ChangeStreams,
        shutdown: ShutdownSignal,
        notices: Box<dyn NoticeSink>,
    ) -> Self {
        Self {
            core,
            controller,
            command: command.into(),
            streams,
            shutdown,
            notices,
        }
    }

    /// Main loop.
    ///
    /// Starts the managed process, then restarts it on every relevant change
    /// until shutdown is requested. Returns once the process has been
    /// terminated, so awaiting this is waiting for shutdown to complete.
    pub async fn run(mut self) -> Result<()> {
        info!(command = %self.command, "supervisor started");

        let step = self.core.boot();
        self.execute(step.commands).await;

        let mut events_open = true;
        let mut errors_open = true;

        loop {
            // Shutdown is polled first so it wins over queued changes.
            let event = tokio::select! {
                biased;

                _ = self.shutdown.wait() => SupervisorEvent::ShutdownRequested,

                maybe = self.streams.events.recv(), if events_open => match maybe {
                    Some(change) => SupervisorEvent::FileChanged(change),
                    None => {
                        debug!("change stream closed");
                        events_open = false;
                        continue;
                    }
                },

                maybe = self.streams.errors.recv(), if errors_open => match maybe {
                    Some(err) => SupervisorEvent::WatchFailed(err.to_string()),
                    None => {
                        debug!("watcher error stream closed");
                        errors_open = false;
                        continue;
                    }
                },
            };

            debug!(?event, "supervisor received event");

            let step = self.core.step(event);
            self.execute(step.commands).await;

            if !step.keep_running {
                break;
            }
        }

        self.core.finish();
        info!(restarts = self.core.restarts(), "supervisor stopped");
        Ok(())
    }

    /// Execute commands from the core, in order.
    async fn execute(&mut self, commands: Vec<CoreCommand>) {
        let mut pending: VecDeque<CoreCommand> = commands.into();

        while let Some(command) = pending.pop_front() {
            match command {
                CoreCommand::Notify(notice) => self.notices.notice(&notice),
                CoreCommand::TerminateProcess => {
                    // Best effort: a failed kill must not wedge the loop.
                    if let Err(err) = self.controller.terminate().await {
                        warn!(error = %err, "failed to terminate managed process");
                    }
                }
                CoreCommand::StartProcess => {
                    // A signal that arrived while the old process was being
                    // terminated cancels the rest of the restart.
                    if self.shutdown.is_triggered() {
                        debug!(skipped = pending.len(), "shutdown requested; not starting");
                        return;
                    }
                    let started = match self.controller.start(&self.command) {
                        Ok(()) => true,
                        Err(err) => {
                            warn!(
                                command = %self.command,
                                error = %err,
                                "failed to start managed process; waiting for the next change"
                            );
                            false
                        }
                    };
                    let follow_up = self.core.process_started(started);
                    for command in follow_up.commands.into_iter().rev() {
                        pending.push_front(command);
                    }
                }
            }
        }
    }
}
