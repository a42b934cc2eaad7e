// src/exec/platform/mod.rs

//! Process-tree isolation, selected at compile time.
//!
//! Both variants expose the same surface:
//! - `configure(&mut Command)` before spawning,
//! - `ProcessGroup::attach(&Child)` right after spawning,
//! - `ProcessGroup::terminate()` to kill the child and its descendants.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::{configure, ProcessGroup};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::{configure, ProcessGroup};
