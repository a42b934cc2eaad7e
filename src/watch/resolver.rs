// src/watch/resolver.rs

//! Glob expansion against the project tree.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{compile_glob, literal_base, parent_pattern, ExcludeRules};

/// Expands watch patterns into concrete paths below `root`.
///
/// Excluded directories are never descended into.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    exclude: ExcludeRules,
}

impl PathResolver {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>, exclude: ExcludeRules) -> Self {
        Self {
            root: root.into(),
            fs,
            exclude,
        }
    }

    /// Every file or directory matching `pattern`.
    ///
    /// No matches is an empty set, not an error. A malformed pattern is.
    pub fn resolve(&self, pattern: &str) -> Result<BTreeSet<PathBuf>> {
        let matcher = compile_glob(pattern)?;
        let mut found = BTreeSet::new();

        self.walk(&literal_base(pattern), |rel, path, _is_dir| {
            if matcher.is_match(rel) {
                found.insert(path.to_path_buf());
            }
        })?;

        debug!(pattern, matches = found.len(), "resolved watch pattern");
        Ok(found)
    }

    /// Directories to subscribe to so that changes to `pattern` are seen,
    /// including files created after startup.
    ///
    /// That is: the pattern's literal base directory, every directory
    /// matching the pattern's directory part, every matched directory, and
    /// the parent of every matched file.
    pub fn watch_targets(&self, pattern: &str) -> Result<BTreeSet<PathBuf>> {
        let matcher = compile_glob(pattern)?;
        let parent_matcher = parent_pattern(pattern).map(compile_glob).transpose()?;
        let base = literal_base(pattern);

        let mut targets = BTreeSet::new();
        let base_dir = self.join(&base);
        if self.fs.is_dir(&base_dir) && (base.is_empty() || !self.exclude.excludes(&base)) {
            targets.insert(base_dir);
        }

        self.walk(&base, |rel, path, is_dir| {
            if is_dir {
                let parent_match = parent_matcher.as_ref().is_some_and(|m| m.is_match(rel));
                if parent_match || matcher.is_match(rel) {
                    targets.insert(path.to_path_buf());
                }
            } else if matcher.is_match(rel) {
                if let Some(parent) = path.parent() {
                    targets.insert(parent.to_path_buf());
                }
            }
        })?;

        Ok(targets)
    }

    fn join(&self, rel: &str) -> PathBuf {
        if rel.is_empty() {
            self.root.clone()
        } else {
            self.root.join(rel)
        }
    }

    /// Depth-first walk starting at `start` (relative to root), calling
    /// `visit(rel_path, path, is_dir)` for every non-excluded entry.
    fn walk(&self, start: &str, mut visit: impl FnMut(&str, &Path, bool)) -> Result<()> {
        let start_dir = self.join(start);
        if !start.is_empty() && (self.exclude.excludes(start) || !self.fs.is_dir(&start_dir)) {
            return Ok(());
        }

        let mut stack = vec![start_dir.clone()];
        while let Some(dir) = stack.pop() {
            let entries = match self.fs.read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) if dir != start_dir => {
                    warn!(dir = ?dir, error = %err, "skipping unreadable directory");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            for path in entries {
                let Some(rel) = relative_str(&self.root, &path) else {
                    continue;
                };
                if self.exclude.excludes(&rel) {
                    continue;
                }
                let is_dir = self.fs.is_dir(&path);
                if is_dir {
                    stack.push(path.clone());
                } else if !self.fs.is_file(&path) {
                    continue;
                }
                visit(&rel, &path, is_dir);
            }
        }

        Ok(())
    }
}
