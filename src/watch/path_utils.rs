// src/watch/path_utils.rs

//! Path normalisation shared by the resolver and the watcher.

use std::path::Path;

/// Render a relative path with `/` separators on every platform.
pub fn slash_path(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// Convert `path` into a `/`-separated string relative to `root`.
///
/// Tries a plain `strip_prefix` first, then again on canonicalized paths
/// (macOS reports `/private/var/...` for `/var/...`, for instance). The root
/// itself maps to `""`.
///
/// Returns `None` if the path does not live under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(slash_path(rel));
    }

    // A deleted file can't be canonicalized, but its directory usually can.
    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok().or_else(|| {
        let parent = path.parent()?.canonicalize().ok()?;
        Some(parent.join(path.file_name()?))
    })?;

    path_canon.strip_prefix(&root_canon).ok().map(slash_path)
}
