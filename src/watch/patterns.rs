// src/watch/patterns.rs

use std::fmt;

use globset::{Glob, GlobBuilder, GlobMatcher, GlobSet, GlobSetBuilder};

use crate::config::model::WatchSpec;
use crate::errors::{GrapeError, Result};

/// Strip a leading `./` so `"./src/*.go"` and `"src/*.go"` mean the same.
pub fn normalize_pattern(pattern: &str) -> &str {
    let mut p = pattern.trim();
    while let Some(rest) = p.strip_prefix("./") {
        p = rest;
    }
    p
}

fn build_glob(pattern: &str) -> Result<Glob> {
    // `*` and `?` stay within one path component; only `**` crosses `/`.
    GlobBuilder::new(normalize_pattern(pattern))
        .literal_separator(true)
        .build()
        .map_err(|source| GrapeError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}

/// Compile a single watch pattern into a matcher for root-relative,
/// `/`-separated paths.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    Ok(build_glob(pattern)?.compile_matcher())
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        builder.add(build_glob(pat)?);
    }
    builder.build().map_err(|source| GrapeError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

/// `exclude` entries of a namespace.
///
/// A path is excluded when any of its components equals or matches an
/// entry, or when the whole relative path matches one (for entries such as
/// `"gen/**"`).
#[derive(Clone, Default)]
pub struct ExcludeRules {
    entries: Vec<(String, GlobMatcher)>,
}

impl fmt::Debug for ExcludeRules {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.entries.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_tuple("ExcludeRules").field(&names).finish()
    }
}

impl ExcludeRules {
    pub fn new(entries: &[String]) -> Result<Self> {
        let mut compiled = Vec::with_capacity(entries.len());
        for entry in entries {
            let name = normalize_pattern(entry).trim_end_matches('/').to_string();
            if name.is_empty() {
                continue;
            }
            let matcher = compile_glob(&name)?;
            compiled.push((name, matcher));
        }
        Ok(Self { entries: compiled })
    }

    pub fn excludes(&self, rel_path: &str) -> bool {
        self.entries.iter().any(|(name, matcher)| {
            matcher.is_match(rel_path)
                || rel_path
                    .split('/')
                    .any(|component| component == name || matcher.is_match(component))
        })
    }
}

/// Compiled include/exclude rules of one namespace.
///
/// Paths passed to [`WatchProfile::matches`] are relative to the project
/// root, e.g. `"src/foo/bar.go"`.
#[derive(Clone)]
pub struct WatchProfile {
    include: GlobSet,
    exclude: ExcludeRules,
}

impl fmt::Debug for WatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchProfile")
            .field("include", &self.include.len())
            .field("exclude", &self.exclude)
            .finish()
    }
}

impl WatchProfile {
    pub fn new(spec: &WatchSpec) -> Result<Self> {
        Ok(Self {
            include: build_globset(&spec.include)?,
            exclude: ExcludeRules::new(&spec.exclude)?,
        })
    }

    pub fn exclude_rules(&self) -> &ExcludeRules {
        &self.exclude
    }

    /// Whether a change at `rel_path` is relevant to this namespace.
    ///
    /// A path is relevant when it matches an include pattern itself, or when
    /// its directory does (a pattern naming a directory watches the files
    /// directly inside it).
    pub fn matches(&self, rel_path: &str) -> bool {
        let rel_path = normalize_pattern(rel_path);
        if rel_path.is_empty() || self.exclude.excludes(rel_path) {
            return false;
        }
        if self.include.is_match(rel_path) {
            return true;
        }
        match rel_path.rsplit_once('/') {
            Some((parent, _)) => self.include.is_match(parent),
            None => false,
        }
    }
}

/// The directory part of a pattern (`"src/**/*.rs"` -> `"src/**"`), or
/// `None` for patterns that live directly in the root.
pub fn parent_pattern(pattern: &str) -> Option<&str> {
    normalize_pattern(pattern)
        .rsplit_once('/')
        .map(|(parent, _)| parent)
        .filter(|parent| !parent.is_empty())
}

/// Leading components of `pattern` that contain no glob syntax.
///
/// `"src/**/*.rs"` -> `"src"`, `"*.txt"` -> `""`.
pub fn literal_base(pattern: &str) -> String {
    let Some(parent) = parent_pattern(pattern) else {
        return String::new();
    };
    parent
        .split('/')
        .take_while(|component| !component.contains(['*', '?', '[', '{']))
        .collect::<Vec<_>>()
        .join("/")
}
