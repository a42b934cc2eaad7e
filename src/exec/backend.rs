// src/exec/backend.rs

//! Pluggable process backend abstraction.
//!
//! The supervisor talks to a `ProcessBackend` instead of spawning processes
//! itself. This makes it easy to swap in a fake backend in tests while
//! keeping the production implementation in [`SystemProcessBackend`].
//!
//! - `SystemProcessBackend` spawns real OS processes, each in its own
//!   process group (unix) or job object (windows), and terminates the whole
//!   tree.
//! - Tests can provide their own backend that, for example, records which
//!   commands were started and checks that two never overlap.

use std::future::Future;
use std::pin::Pin;
use std::process::Stdio;

use anyhow::Context;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::exec::command::CommandLine;
use crate::exec::platform::{self, ProcessGroup};

/// Something that identifies a started process.
pub trait ManagedHandle: Send {
    /// OS process id (or a fake id in tests).
    fn id(&self) -> u32;
}

/// Trait abstracting how the managed process is started and killed.
pub trait ProcessBackend: Send {
    type Handle: ManagedHandle;

    /// Launch `command` with the supervisor's stdio, in a fresh process
    /// group or equivalent.
    fn spawn(&mut self, command: &CommandLine) -> Result<Self::Handle>;

    /// Terminate the process **and everything it spawned**, then wait until
    /// the process has fully exited.
    fn terminate_tree(
        &mut self,
        handle: Self::Handle,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// The running child as owned by [`SystemProcessBackend`].
#[derive(Debug)]
pub struct ManagedProcess {
    child: Child,
    pid: u32,
    group: Option<ProcessGroup>,
    command: String,
}

impl ManagedHandle for ManagedProcess {
    fn id(&self) -> u32 {
        self.pid
    }
}

/// Real backend used in production.
#[derive(Debug, Clone, Default)]
pub struct SystemProcessBackend;

impl SystemProcessBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessBackend for SystemProcessBackend {
    type Handle = ManagedProcess;

    fn spawn(&mut self, command: &CommandLine) -> Result<ManagedProcess> {
        let mut cmd = Command::new(command.program());
        cmd.args(command.args())
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        platform::configure(&mut cmd);

        let child = cmd
            .spawn()
            .with_context(|| format!("starting '{command}'"))?;
        let pid = child.id().unwrap_or_default();

        let group = match ProcessGroup::attach(&child) {
            Ok(group) => Some(group),
            Err(err) => {
                warn!(
                    pid,
                    error = %err,
                    "could not isolate process tree; only the direct child will be killed"
                );
                None
            }
        };

        info!(pid, command = %command, "managed process started");

        Ok(ManagedProcess {
            child,
            pid,
            group,
            command: command.to_string(),
        })
    }

    fn terminate_tree(
        &mut self,
        handle: ManagedProcess,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let ManagedProcess {
                mut child,
                pid,
                group,
                command,
            } = handle;

            let signalled = match &group {
                Some(group) => match group.terminate() {
                    Ok(()) => true,
                    Err(err) => {
                        warn!(pid, error = %err, "failed to terminate process group");
                        false
                    }
                },
                None => false,
            };

            if !signalled {
                debug!(pid, "killing direct child");
                if let Err(err) = child.start_kill() {
                    warn!(pid, error = %err, "failed to kill managed process");
                }
            }

            // No timeout: a child that ignores termination keeps us here.
            let status = child
                .wait()
                .await
                .with_context(|| format!("waiting for '{command}' (pid {pid}) to exit"))?;

            info!(pid, command = %command, %status, "managed process exited");
            drop(group);
            Ok(())
        })
    }
}
