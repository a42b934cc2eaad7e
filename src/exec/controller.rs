// src/exec/controller.rs

use std::fmt;

use tracing::debug;

use crate::errors::{GrapeError, Result};
use crate::exec::backend::{ManagedHandle, ProcessBackend};
use crate::exec::command::CommandLine;

/// Owner of the (at most one) managed process.
///
/// `start` refuses to run while a handle is still held, so a second process
/// can only ever be started after `terminate` has been issued for the first.
pub struct ProcessController<B: ProcessBackend> {
    backend: B,
    current: Option<B::Handle>,
}

impl<B: ProcessBackend> fmt::Debug for ProcessController<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessController")
            .field("current", &self.current.as_ref().map(|h| h.id()))
            .finish_non_exhaustive()
    }
}

impl<B: ProcessBackend> ProcessController<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&B::Handle> {
        self.current.as_ref()
    }

    /// Start `command_line`. On error the controller stays empty (or keeps
    /// the process it already had).
    pub fn start(&mut self, command_line: &str) -> Result<()> {
        if let Some(handle) = &self.current {
            return Err(GrapeError::AlreadyRunning(handle.id()));
        }

        let command = CommandLine::parse(command_line)?;
        let handle = self.backend.spawn(&command)?;
        self.current = Some(handle);
        Ok(())
    }

    /// Terminate the current process tree and wait for it to exit.
    ///
    /// A no-op without a current process. The handle is released even if
    /// termination reports an error.
    pub async fn terminate(&mut self) -> Result<()> {
        let Some(handle) = self.current.take() else {
            debug!("terminate requested with no managed process");
            return Ok(());
        };
        self.backend.terminate_tree(handle).await
    }
}
