// src/watch/watcher.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

use crate::errors::{GrapeError, Result};
use crate::watch::event::{changed_paths, ChangeEvent, ChangeKind};
use crate::watch::path_utils::{relative_str, slash_path};
use crate::watch::resolver::PathResolver;

/// Receiving half of the watcher: change notifications and watcher errors.
///
/// Both streams end only when every clone of the [`ChangeWatcher`] has been
/// dropped.
#[derive(Debug)]
pub struct ChangeStreams {
    pub events: mpsc::UnboundedReceiver<ChangeEvent>,
    pub errors: mpsc::UnboundedReceiver<notify::Error>,
}

/// Sending half matching [`ChangeStreams`]; lets tests feed the supervisor
/// without a real watcher.
#[derive(Debug, Clone)]
pub struct ChangeSenders {
    pub events: mpsc::UnboundedSender<ChangeEvent>,
    pub errors: mpsc::UnboundedSender<notify::Error>,
}

impl ChangeStreams {
    pub fn channel() -> (ChangeSenders, ChangeStreams) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();
        (
            ChangeSenders {
                events: event_tx,
                errors: error_tx,
            },
            ChangeStreams {
                events: event_rx,
                errors: error_rx,
            },
        )
    }
}

/// OS file-change subscription.
///
/// Cloning is cheap and every clone registers into the same underlying
/// watcher, so registration tasks can call [`ChangeWatcher::add`] while the
/// supervisor is already consuming events. Dropping the last clone stops
/// watching.
#[derive(Clone)]
pub struct ChangeWatcher {
    root: PathBuf,
    inner: Arc<Mutex<RecommendedWatcher>>,
    registered: Arc<Mutex<BTreeSet<PathBuf>>>,
}

impl std::fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeWatcher")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl ChangeWatcher {
    /// Create the notification subscription. Nothing is watched until
    /// [`add`](Self::add) is called.
    ///
    /// Event paths are reported relative to `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<(Self, ChangeStreams)> {
        let root = root.into();
        let root = root.canonicalize().unwrap_or(root);

        let (senders, streams) = ChangeStreams::channel();

        // Called synchronously on notify's own thread.
        let handler_root = root.clone();
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| forward(&handler_root, &senders, res),
            Config::default(),
        )?;

        info!(root = ?root, "file watcher created");

        Ok((
            Self {
                root,
                inner: Arc::new(Mutex::new(watcher)),
                registered: Arc::new(Mutex::new(BTreeSet::new())),
            },
            streams,
        ))
    }

    /// Subscribe to changes of `path` (non-recursively for directories).
    ///
    /// Returns `false` if the path was already registered.
    pub fn add(&self, path: &Path) -> Result<bool> {
        let mut registered = lock(&self.registered, "registered paths")?;
        if registered.contains(path) {
            return Ok(false);
        }

        lock(&self.inner, "watcher")?.watch(path, RecursiveMode::NonRecursive)?;
        registered.insert(path.to_path_buf());

        debug!(path = ?path, "watching path");
        Ok(true)
    }

    /// Snapshot of every registered path.
    pub fn watched(&self) -> Vec<PathBuf> {
        self.registered
            .lock()
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| GrapeError::Other(anyhow!("{what} mutex poisoned")))
}

fn forward(root: &Path, senders: &ChangeSenders, res: notify::Result<Event>) {
    match res {
        Ok(event) => {
            let Some(kind) = ChangeKind::from_notify(&event.kind) else {
                trace!(?event, "ignoring notify event");
                return;
            };
            for path in changed_paths(&event) {
                let rel = relative_str(root, path).unwrap_or_else(|| slash_path(path));
                if senders.events.send(ChangeEvent::new(rel, kind)).is_err() {
                    trace!("change stream closed; dropping event");
                    return;
                }
            }
        }
        Err(err) => {
            if senders.errors.send(err).is_err() {
                trace!("error stream closed; dropping watcher error");
            }
        }
    }
}

/// Resolve one include pattern and register its watch targets.
///
/// Returns how many new paths were registered.
pub fn register_pattern(
    watcher: &ChangeWatcher,
    resolver: &PathResolver,
    pattern: &str,
) -> Result<usize> {
    let matches = resolver.resolve(pattern)?;
    if matches.is_empty() {
        warn!(pattern, "watch pattern matches nothing yet");
    }

    let mut added = 0;
    for target in resolver.watch_targets(pattern)? {
        if watcher.add(&target)? {
            added += 1;
        }
    }

    info!(pattern, matches = matches.len(), registered = added, "watch pattern registered");
    Ok(added)
}

/// Register every include pattern concurrently, one blocking task per
/// pattern.
///
/// The first failure is returned; an unwatched required path would make
/// the tool silently useless.
pub async fn register_patterns(
    watcher: &ChangeWatcher,
    resolver: &PathResolver,
    patterns: &[String],
) -> Result<usize> {
    let mut tasks = JoinSet::new();
    for pattern in patterns.iter().cloned() {
        let watcher = watcher.clone();
        let resolver = resolver.clone();
        tasks.spawn_blocking(move || register_pattern(&watcher, &resolver, &pattern));
    }

    let mut total = 0;
    while let Some(joined) = tasks.join_next().await {
        total += joined
            .map_err(|e| GrapeError::Other(anyhow!("registration task failed: {e}")))??;
    }

    Ok(total)
}
