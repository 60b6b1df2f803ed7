//! Extension and index-file fallback for extensionless specifiers.

use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Try a path as-is, then with each configured extension appended.
pub fn try_extensions(
    runtime: &dyn Runtime,
    base: &Path,
    extensions: &[String],
) -> Option<PathBuf> {
    if runtime.is_file(base) {
        return Some(base.to_path_buf());
    }

    for ext in extensions {
        // Append rather than replace so `./config.test` can match
        // `config.test.ts`.
        let candidate = PathBuf::from(format!("{}.{ext}", base.display()));
        if runtime.is_file(&candidate) {
            return Some(candidate);
        }
    }

    None
}

/// Try a directory's index files (`index.ts`, `index.js`, ...).
pub fn try_index_files(
    runtime: &dyn Runtime,
    dir: &Path,
    extensions: &[String],
) -> Option<PathBuf> {
    if !runtime.is_dir(dir) {
        return None;
    }

    for ext in extensions {
        let index = dir.join(format!("index.{ext}"));
        if runtime.is_file(&index) {
            return Some(index);
        }
    }

    None
}

/// Resolve a filesystem candidate with extension and index fallbacks.
pub fn resolve_file(
    runtime: &dyn Runtime,
    candidate: &Path,
    extensions: &[String],
) -> Option<PathBuf> {
    if let Some(found) = try_extensions(runtime, candidate, extensions) {
        return Some(found);
    }
    try_index_files(runtime, candidate, extensions)
}
