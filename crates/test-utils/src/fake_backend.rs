use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use grape::errors::{GrapeError, Result};
use grape::exec::{CommandLine, ManagedHandle, ProcessBackend};
use grape::notice::{Notice, NoticeSink};

/// What the fake backend was asked to do, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOp {
    Start { id: u32, command: String },
    Terminate { id: u32 },
}

#[derive(Debug, Default)]
struct Shared {
    ops: Vec<ProcessOp>,
    alive: usize,
    max_alive: usize,
    next_id: u32,
    failing_starts: usize,
}

/// A fake process backend that:
/// - records every start / terminate
/// - tracks how many fake processes are alive at once
/// - can make `terminate_tree` take a while, like waiting for a real exit
/// - can fail the next N starts
#[derive(Debug, Clone, Default)]
pub struct FakeProcessBackend {
    shared: Arc<Mutex<Shared>>,
    terminate_delay: Duration,
}

#[derive(Debug)]
pub struct FakeHandle {
    id: u32,
}

impl ManagedHandle for FakeHandle {
    fn id(&self) -> u32 {
        self.id
    }
}

impl FakeProcessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terminate_delay(delay: Duration) -> Self {
        Self {
            terminate_delay: delay,
            ..Self::default()
        }
    }

    pub fn fail_next_starts(&self, n: usize) {
        self.shared.lock().unwrap().failing_starts = n;
    }

    pub fn ops(&self) -> Vec<ProcessOp> {
        self.shared.lock().unwrap().ops.clone()
    }

    pub fn starts(&self) -> usize {
        self.count(|op| matches!(op, ProcessOp::Start { .. }))
    }

    pub fn terminates(&self) -> usize {
        self.count(|op| matches!(op, ProcessOp::Terminate { .. }))
    }

    pub fn alive(&self) -> usize {
        self.shared.lock().unwrap().alive
    }

    /// Highest number of simultaneously alive processes ever observed.
    pub fn max_alive(&self) -> usize {
        self.shared.lock().unwrap().max_alive
    }

    fn count(&self, pred: impl Fn(&ProcessOp) -> bool) -> usize {
        self.shared.lock().unwrap().ops.iter().filter(|op| pred(op)).count()
    }
}

impl ProcessBackend for FakeProcessBackend {
    type Handle = FakeHandle;

    fn spawn(&mut self, command: &CommandLine) -> Result<FakeHandle> {
        let mut shared = self.shared.lock().unwrap();
        if shared.failing_starts > 0 {
            shared.failing_starts -= 1;
            return Err(GrapeError::Other(anyhow::anyhow!(
                "simulated spawn failure for '{command}'"
            )));
        }

        shared.next_id += 1;
        let id = shared.next_id;
        shared.alive += 1;
        shared.max_alive = shared.max_alive.max(shared.alive);
        shared.ops.push(ProcessOp::Start {
            id,
            command: command.to_string(),
        });
        Ok(FakeHandle { id })
    }

    fn terminate_tree(
        &mut self,
        handle: FakeHandle,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let shared = Arc::clone(&self.shared);
        let delay = self.terminate_delay;

        Box::pin(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let mut shared = shared.lock().unwrap();
            shared.alive -= 1;
            shared.ops.push(ProcessOp::Terminate { id: handle.id });
            Ok(())
        })
    }
}

/// Notice sink that keeps everything it was given.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotices {
    notices: Arc<Mutex<Vec<Notice>>>,
}

impl RecordingNotices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn count(&self, notice: &Notice) -> usize {
        self.notices.lock().unwrap().iter().filter(|n| *n == notice).count()
    }
}

impl NoticeSink for RecordingNotices {
    fn notice(&mut self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}
