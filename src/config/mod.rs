// src/config/mod.rs

//! Configuration loading and validation for grape.
//!
//! Responsibilities:
//! - Define the serde-backed data model (`model.rs`).
//! - Load a config file from disk, or build one from CLI flags (`loader.rs`).
//! - Validate basic invariants like compilable patterns (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, write_default};
pub use model::{Config, Namespace, RawConfig, WatchSpec, DEFAULT_NAMESPACE};
