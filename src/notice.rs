// src/notice.rs

//! User-visible lifecycle notices.

use std::fmt;

pub const RUN_NOTICE: &str = "🍇 now watching for changes ✨";
pub const STOP_NOTICE: &str = "🍇 stopped watching for changes, cleaning up... ✨";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The managed process was (re)started.
    Started,
    /// A relevant file changed; a restart follows.
    FileChanged(String),
    /// Shutdown began; the managed process is being cleaned up.
    Stopped,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Started => f.write_str(RUN_NOTICE),
            Notice::FileChanged(path) => write!(f, "🍇 changed: {path}"),
            Notice::Stopped => f.write_str(STOP_NOTICE),
        }
    }
}

/// Where notices go. Formatting is up to the sink.
pub trait NoticeSink: Send {
    fn notice(&mut self, notice: &Notice);
}

/// Prints notices on stdout, interleaved with the child's own output.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotices;

impl NoticeSink for ConsoleNotices {
    fn notice(&mut self, notice: &Notice) {
        println!("{notice}");
    }
}
