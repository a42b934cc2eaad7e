// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod notice;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{error, info};

use crate::cli::{CliArgs, Command};
use crate::config::loader::{load_and_validate, write_default};
use crate::config::Config;
use crate::engine::{spawn_signal_listener, CoreSupervisor, ShutdownSignal, Supervisor};
use crate::errors::{GrapeError, Result};
use crate::exec::{ProcessBackend, ProcessController, SystemProcessBackend};
use crate::fs::{FileSystem, RealFileSystem};
use crate::notice::{ConsoleNotices, NoticeSink};
use crate::watch::{register_patterns, ChangeWatcher, PathResolver, WatchProfile};

/// High-level entry point used by `main.rs`.
///
/// Dispatches the subcommand; `run` and `on` end up in [`supervise`].
pub async fn run(args: CliArgs) -> Result<()> {
    match args.command {
        Command::Run { namespace, config } => {
            let cfg = load_and_validate(&config)?;
            supervise(&cfg, &namespace, current_dir()).await
        }
        Command::On { run, ext, exclude } => {
            let cfg = Config::from_flags(run, ext, exclude)?;
            supervise(&cfg, config::DEFAULT_NAMESPACE, current_dir()).await
        }
        Command::Init { config } => {
            let path = write_default(&config)?;
            println!("🍇 created {} ✨", path.display());
            Ok(())
        }
    }
}

/// Watch `namespace` of `cfg` below `root` and keep its command running
/// until SIGINT / SIGTERM.
///
/// Returns after the managed process has been cleaned up.
pub async fn supervise(cfg: &Config, namespace: &str, root: impl AsRef<Path>) -> Result<()> {
    let shutdown = ShutdownSignal::new();
    let _signals = spawn_signal_listener(shutdown.clone())?;

    supervise_with(
        cfg,
        namespace,
        root.as_ref(),
        Arc::new(RealFileSystem),
        SystemProcessBackend::new(),
        Box::new(ConsoleNotices),
        shutdown,
    )
    .await
}

/// [`supervise`] with every outside dependency passed in.
///
/// This wires together:
/// - the namespace's compiled watch profile
/// - the file watcher and one registration task per include pattern
/// - the supervisor loop owning the managed process
///
/// Startup failures (bad pattern, watcher creation, registration) are
/// returned as errors; a registration failure also shuts the already-running
/// loop down first, so no managed process is left behind.
pub async fn supervise_with<B>(
    cfg: &Config,
    namespace: &str,
    root: &Path,
    fs: Arc<dyn FileSystem>,
    backend: B,
    notices: Box<dyn NoticeSink>,
    shutdown: ShutdownSignal,
) -> Result<()>
where
    B: ProcessBackend + 'static,
    B::Handle: 'static,
{
    let ns = cfg.namespace(namespace)?;
    let root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    let profile = WatchProfile::new(&ns.watch)?;
    let resolver = PathResolver::new(root.clone(), fs, profile.exclude_rules().clone());
    let (watcher, streams) = ChangeWatcher::new(&root)?;

    let supervisor = Supervisor::new(
        CoreSupervisor::new(profile),
        ProcessController::new(backend),
        ns.run.clone(),
        streams,
        shutdown.clone(),
        notices,
    );
    let supervisor = tokio::spawn(supervisor.run());

    info!(namespace, root = ?root, "registering watch patterns");
    if let Err(err) = register_patterns(&watcher, &resolver, &ns.watch.include).await {
        error!(error = %err, "failed to register watch paths; shutting down");
        shutdown.trigger();
        join_supervisor(supervisor).await?;
        return Err(err);
    }

    let result = join_supervisor(supervisor).await;
    drop(watcher);
    result
}

async fn join_supervisor(handle: tokio::task::JoinHandle<Result<()>>) -> Result<()> {
    handle
        .await
        .map_err(|e| GrapeError::Other(anyhow!("supervisor task failed: {e}")))?
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
