// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{GrapeError, Result};

/// Namespace used by `grape on` and the starter config written by `grape init`.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Configuration exactly as read from disk, before validation.
///
/// The file is a flat map from namespace name to [`Namespace`]:
///
/// ```json
/// {
///   "api": {
///     "run": "go run ./cmd/api",
///     "watch": { "include": ["*.go", "internal/**/*.go"], "exclude": ["vendor"] }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawConfig {
    pub namespaces: BTreeMap<String, Namespace>,
}

/// A named bundle of run command + watch rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Namespace {
    /// Command line of the managed process. Split on whitespace; no shell
    /// quoting is applied.
    pub run: String,

    #[serde(default)]
    pub watch: WatchSpec,
}

/// Which paths a namespace watches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSpec {
    /// Glob patterns relative to the project root, e.g. `"*.go"` or
    /// `"src/**/*.rs"`. Order only determines registration order.
    #[serde(default)]
    pub include: Vec<String>,

    /// Directory names (or globs) dropped from matches wherever they appear
    /// as a path component, e.g. `"vendor"` or `"node_modules"`.
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Validated configuration. Immutable for the lifetime of the process.
///
/// Construct via `Config::try_from(raw)` (see `validate.rs`) or
/// [`Config::from_flags`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    namespaces: BTreeMap<String, Namespace>,
}

impl Config {
    pub(crate) fn new_unchecked(namespaces: BTreeMap<String, Namespace>) -> Self {
        Self { namespaces }
    }

    /// Build a single-namespace config from `grape on` flags.
    pub fn from_flags(
        run: impl Into<String>,
        include: Vec<String>,
        exclude: Vec<String>,
    ) -> Result<Self> {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(
            DEFAULT_NAMESPACE.to_string(),
            Namespace {
                run: run.into(),
                watch: WatchSpec { include, exclude },
            },
        );
        Config::try_from(RawConfig { namespaces })
    }

    /// The starter config written by `grape init`.
    pub fn starter() -> RawConfig {
        let mut namespaces = BTreeMap::new();
        namespaces.insert(
            DEFAULT_NAMESPACE.to_string(),
            Namespace {
                run: "go run main.go".to_string(),
                watch: WatchSpec {
                    include: vec!["*.go".to_string()],
                    exclude: vec!["vendor".to_string()],
                },
            },
        );
        RawConfig { namespaces }
    }

    pub fn namespace(&self, name: &str) -> Result<&Namespace> {
        self.namespaces
            .get(name)
            .ok_or_else(|| GrapeError::NamespaceNotFound(name.to_string()))
    }

    pub fn namespaces(&self) -> &BTreeMap<String, Namespace> {
        &self.namespaces
    }
}
