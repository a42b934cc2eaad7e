// src/exec/platform/windows.rs

use std::io;
use std::ptr;

use tokio::process::{Child, Command};
use windows_sys::Win32::Foundation::{CloseHandle, HANDLE};
use windows_sys::Win32::System::JobObjects::{
    AssignProcessToJobObject, CreateJobObjectW, TerminateJobObject,
};

/// Windows has no process groups to opt into at spawn time; the job object
/// is attached right after spawning instead.
///
/// Known gap: between `spawn` and [`ProcessGroup::attach`] the child already
/// runs, so anything it launches in that window is not in the job and
/// survives `terminate`. Closing it needs `CREATE_SUSPENDED` plus a resume
/// of the primary thread, whose handle tokio's `Child` does not expose.
pub fn configure(_cmd: &mut Command) {}

/// A job object holding the child; processes it spawns join the job too.
#[derive(Debug)]
pub struct ProcessGroup {
    job: HANDLE,
}

impl ProcessGroup {
    pub fn attach(child: &Child) -> io::Result<Self> {
        let process = child
            .raw_handle()
            .ok_or_else(|| io::Error::other("child exited before it could be assigned a job"))?
            as HANDLE;

        // SAFETY: null attributes and name are documented as valid.
        let job = unsafe { CreateJobObjectW(ptr::null(), ptr::null()) };
        if job == 0 {
            return Err(io::Error::last_os_error());
        }
        let group = Self { job };

        // SAFETY: both handles are open for the duration of the call.
        if unsafe { AssignProcessToJobObject(group.job, process) } == 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(group)
    }

    /// Terminate every process in the job.
    pub fn terminate(&self) -> io::Result<()> {
        // SAFETY: `job` is a valid job handle until drop.
        if unsafe { TerminateJobObject(self.job, 1) } == 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        // SAFETY: closed exactly once.
        unsafe {
            CloseHandle(self.job);
        }
    }
}
