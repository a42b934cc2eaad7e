// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Compiling a namespace's `include` / `exclude` patterns (`patterns`).
//! - Expanding patterns into concrete paths to subscribe to (`resolver`).
//! - Wiring up a cross-platform filesystem watcher (`notify`) that turns OS
//!   notifications into [`ChangeEvent`]s (`watcher`).
//!
//! It does **not** know about processes; deciding what a change means is
//! the supervisor's job.

pub mod event;
pub mod path_utils;
pub mod patterns;
pub mod resolver;
pub mod watcher;

pub use event::{ChangeEvent, ChangeKind};
pub use patterns::{ExcludeRules, WatchProfile};
pub use resolver::PathResolver;
pub use watcher::{
    register_pattern, register_patterns, ChangeSenders, ChangeStreams, ChangeWatcher,
};
