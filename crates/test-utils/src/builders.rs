#![allow(dead_code)]

use std::collections::BTreeMap;

use grape::config::{Config, Namespace, RawConfig, WatchSpec};

/// Builder for `Config` to simplify test setup.
pub struct ConfigBuilder {
    config: RawConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfig {
                namespaces: BTreeMap::new(),
            },
        }
    }

    pub fn with_namespace(mut self, name: &str, namespace: Namespace) -> Self {
        self.config.namespaces.insert(name.to_string(), namespace);
        self
    }

    pub fn raw(self) -> RawConfig {
        self.config
    }

    pub fn build(self) -> Config {
        Config::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `Namespace`.
pub struct NamespaceBuilder {
    namespace: Namespace,
}

impl NamespaceBuilder {
    pub fn new(run: &str) -> Self {
        Self {
            namespace: Namespace {
                run: run.to_string(),
                watch: WatchSpec::default(),
            },
        }
    }

    pub fn include(mut self, pattern: &str) -> Self {
        self.namespace.watch.include.push(pattern.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.namespace.watch.exclude.push(pattern.to_string());
        self
    }

    pub fn watch_spec(&self) -> WatchSpec {
        self.namespace.watch.clone()
    }

    pub fn build(self) -> Namespace {
        self.namespace
    }
}
