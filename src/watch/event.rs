// src/watch/event.rs

//! Change events as seen by the supervisor.

use std::fmt;
use std::path::PathBuf;

use notify::Event;
use notify::event::{EventKind, ModifyKind, RenameMode};

/// The two kinds of notification that can trigger a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Write,
    Create,
}

impl ChangeKind {
    /// Map a `notify` event kind; `None` for everything grape ignores
    /// (access, metadata, remove, and the source side of a rename).
    ///
    /// A file renamed onto a path counts as created there, which is how
    /// editors that save through a temporary file show up.
    pub fn from_notify(kind: &EventKind) -> Option<Self> {
        match kind {
            EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both)) => {
                Some(ChangeKind::Create)
            }
            EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
                Some(ChangeKind::Write)
            }
            _ => None,
        }
    }
}

/// Paths of `event` that a change should be reported for.
///
/// A rename reported with both ends carries `[from, to]`; only the
/// destination changed.
pub fn changed_paths(event: &Event) -> &[PathBuf] {
    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            let start = event.paths.len().saturating_sub(1);
            &event.paths[start..]
        }
        _ => &event.paths,
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Write => f.write_str("write"),
            ChangeKind::Create => f.write_str("create"),
        }
    }
}

/// A single relevant-kind notification.
///
/// `path` is relative to the project root with `/` separators when the
/// changed file lives under the root, and absolute otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub path: String,
    pub kind: ChangeKind,
}

impl ChangeEvent {
    pub fn new(path: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    pub fn write(path: impl Into<String>) -> Self {
        Self::new(path, ChangeKind::Write)
    }

    pub fn create(path: impl Into<String>) -> Self {
        Self::new(path, ChangeKind::Create)
    }
}
