// src/engine/signals.rs

//! Shutdown requests: the OS signal subscription and the latch the
//! supervisor waits on.

use std::io;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Latched shutdown request.
///
/// Once triggered it stays triggered, so a request made before the
/// supervisor starts waiting is not lost. Clones share the latch.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once [`trigger`](Self::trigger) has been called.
    pub async fn wait(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

/// Process-wide subscription to termination requests: SIGINT and SIGTERM
/// on unix, Ctrl-C on windows.
///
/// Handlers are installed by [`OsSignals::subscribe`], not on first poll,
/// so a signal sent right after subscribing is never handled by the OS
/// default action.
#[derive(Debug)]
pub struct OsSignals {
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(windows)]
    ctrl_c: tokio::signal::windows::CtrlC,
}

impl OsSignals {
    /// Must be called from within a tokio runtime.
    pub fn subscribe() -> io::Result<Self> {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            Ok(Self {
                interrupt: signal(SignalKind::interrupt())?,
                terminate: signal(SignalKind::terminate())?,
            })
        }

        #[cfg(windows)]
        {
            Ok(Self {
                ctrl_c: tokio::signal::windows::ctrl_c()?,
            })
        }
    }

    /// Resolves on the next termination request.
    pub async fn recv(&mut self) {
        #[cfg(unix)]
        tokio::select! {
            _ = self.interrupt.recv() => debug!("SIGINT received"),
            _ = self.terminate.recv() => debug!("SIGTERM received"),
        }

        #[cfg(windows)]
        self.ctrl_c.recv().await;
    }
}

/// Subscribe to OS termination signals for the rest of the process
/// lifetime and trigger `shutdown` on the first one.
pub fn spawn_signal_listener(shutdown: ShutdownSignal) -> io::Result<JoinHandle<()>> {
    let mut signals = OsSignals::subscribe()?;
    Ok(tokio::spawn(async move {
        signals.recv().await;
        info!("termination signal received");
        shutdown.trigger();
    }))
}
