//! `node_modules` package resolution via manifest fields.
//!
//! Walks `node_modules` directories up from the importing file, then picks the
//! package entry point from `package.json`: the `exports` field first (`.`
//! subpath, `import`/`default`/`require` conditions), then `module`, then
//! `main`, then an `index` file.

use std::path::{Path, PathBuf};

use path_clean::PathClean;
use serde_json::Value;
use tracing::debug;

use crate::runtime::Runtime;

use super::extensions;

/// Split a bare specifier into package name and optional subpath.
///
/// Scoped packages keep both segments: `@scope/pkg/sub` splits into
/// `@scope/pkg` and `sub`.
pub fn split_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    let boundary = if specifier.starts_with('@') {
        // Second slash ends the scoped package name.
        specifier
            .char_indices()
            .filter(|&(_, c)| c == '/')
            .nth(1)
            .map(|(i, _)| i)
    } else {
        specifier.find('/')
    };

    match boundary {
        Some(i) => (&specifier[..i], Some(&specifier[i + 1..])),
        None => (specifier, None),
    }
}

/// Resolve a bare specifier against `node_modules` directories.
pub async fn resolve_package(
    runtime: &dyn Runtime,
    from_dir: &Path,
    specifier: &str,
    extensions: &[String],
) -> Option<PathBuf> {
    let (package, subpath) = split_package_specifier(specifier);

    for dir in from_dir.ancestors() {
        let package_root = dir.join("node_modules").join(package);
        if !runtime.is_dir(&package_root) {
            continue;
        }

        let resolved = match subpath {
            Some(sub) => extensions::resolve_file(runtime, &package_root.join(sub), extensions),
            None => resolve_entry_point(runtime, &package_root, extensions).await,
        };

        if resolved.is_some() {
            return resolved.map(|p| p.clean());
        }

        debug!(
            package,
            root = %package_root.display(),
            "package directory found but no entry point resolved"
        );
    }

    None
}

/// Pick a package's entry point from its manifest.
async fn resolve_entry_point(
    runtime: &dyn Runtime,
    package_root: &Path,
    extensions: &[String],
) -> Option<PathBuf> {
    let manifest_path = package_root.join("package.json");

    if let Ok(bytes) = runtime.read_file(&manifest_path).await {
        if let Ok(manifest) = serde_json::from_slice::<Value>(&bytes) {
            for field in [manifest.get("exports"), manifest.get("module"), manifest.get("main")]
                .into_iter()
                .flatten()
            {
                if let Some(rel) = entry_from_field(field) {
                    if let Some(found) =
                        extensions::resolve_file(runtime, &package_root.join(rel), extensions)
                    {
                        return Some(found);
                    }
                }
            }
        }
    }

    extensions::try_index_files(runtime, package_root, extensions)
}

/// Extract a relative entry path from a manifest field value.
///
/// Handles the common `exports` shapes: a plain string, a conditions object,
/// and a subpath map keyed by `"."`. Nested conditions resolve through
/// `import`, `default`, and `require` in that order.
fn entry_from_field(value: &Value) -> Option<&str> {
    match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => {
            if let Some(dot) = map.get(".") {
                return entry_from_field(dot);
            }
            for condition in ["import", "default", "require"] {
                if let Some(v) = map.get(condition) {
                    if let Some(entry) = entry_from_field(v) {
                        return Some(entry);
                    }
                }
            }
            None
        }
        _ => None,
    }
}
