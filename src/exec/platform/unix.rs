// src/exec/platform/unix.rs

use std::io;

use tokio::process::{Child, Command};

/// Put the child in a new process group whose id equals its pid.
pub fn configure(cmd: &mut Command) {
    cmd.process_group(0);
}

/// The child's process group.
#[derive(Debug)]
pub struct ProcessGroup {
    pgid: libc::pid_t,
}

impl ProcessGroup {
    pub fn attach(child: &Child) -> io::Result<Self> {
        let pid = child
            .id()
            .ok_or_else(|| io::Error::other("child exited before its process group was read"))?;

        // SAFETY: getpgid has no memory-safety preconditions.
        let pgid = unsafe { libc::getpgid(pid as libc::pid_t) };
        if pgid < 0 {
            return Err(io::Error::last_os_error());
        }

        // Signalling our own group would take the supervisor down with it.
        // SAFETY: getpgrp cannot fail.
        if pgid == unsafe { libc::getpgrp() } {
            return Err(io::Error::other("child shares the supervisor's process group"));
        }

        Ok(Self { pgid })
    }

    /// Send SIGTERM to every process in the group.
    ///
    /// A group that is already gone counts as terminated.
    pub fn terminate(&self) -> io::Result<()> {
        // SAFETY: killpg has no memory-safety preconditions.
        if unsafe { libc::killpg(self.pgid, libc::SIGTERM) } == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            Ok(())
        } else {
            Err(err)
        }
    }
}
