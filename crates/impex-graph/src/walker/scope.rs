//! Workspace scope collection.
//!
//! Walks the configured root directories through the [`Runtime`] and selects
//! the files that participate in cross-file analysis. Include and exclude
//! globs match workspace-relative paths; an empty include list falls back to
//! "any file with a configured resolver extension".

use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use path_clean::PathClean;
use tracing::warn;

use impex_config::ScopeConfig;

use crate::module_id::ModuleId;
use crate::runtime::Runtime;

use super::WalkerError;

fn build_glob_set(patterns: &[String]) -> Result<GlobSet, WalkerError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|source| WalkerError::InvalidPattern {
            pattern: pattern.clone(),
            source,
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|source| WalkerError::InvalidPattern {
            pattern: patterns.join(", "),
            source,
        })
}

/// Collect all in-scope files under the configured roots.
///
/// Returns files in sorted order so downstream traversal is deterministic.
pub async fn collect_scope_files(
    runtime: &dyn Runtime,
    scope: &ScopeConfig,
    extensions: &[String],
    workspace_root: &Path,
) -> Result<Vec<ModuleId>, WalkerError> {
    let include = build_glob_set(&scope.include)?;
    let exclude = build_glob_set(&scope.exclude)?;

    let mut files = Vec::new();

    for root in &scope.roots {
        let root_dir = if root.is_absolute() {
            root.clone().clean()
        } else {
            workspace_root.join(root).clean()
        };

        if !runtime.is_dir(&root_dir) {
            warn!(root = %root_dir.display(), "scope root is not a directory, skipping");
            continue;
        }

        let mut pending = vec![root_dir];
        while let Some(dir) = pending.pop() {
            let names = match runtime.read_dir(&dir).await {
                Ok(names) => names,
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "failed to list directory");
                    continue;
                }
            };

            for name in names {
                let full = dir.join(&name);
                let relative = full
                    .strip_prefix(workspace_root)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| full.clone());

                if exclude.is_match(&relative) {
                    continue;
                }

                if runtime.is_dir(&full) {
                    pending.push(full);
                } else if in_scope(&relative, &include, scope, extensions) {
                    files.push(ModuleId::from_resolved_path(full));
                }
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn in_scope(relative: &Path, include: &GlobSet, scope: &ScopeConfig, extensions: &[String]) -> bool {
    if scope.include.is_empty() {
        relative
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e == ext))
    } else {
        include.is_match(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::test_utils::TestRuntime;

    fn exts() -> Vec<String> {
        vec!["ts".to_string(), "tsx".to_string()]
    }

    #[tokio::test]
    async fn collects_by_extension_when_include_is_empty() {
        let runtime = TestRuntime::new();
        runtime.add_file("/workspace/src/a.ts", "");
        runtime.add_file("/workspace/src/deep/b.tsx", "");
        runtime.add_file("/workspace/src/style.css", "");

        let scope = ScopeConfig::default();
        let files =
            collect_scope_files(&runtime, &scope, &exts(), Path::new("/workspace"))
                .await
                .unwrap();

        let paths: Vec<_> = files.iter().map(|m| m.path_string().into_owned()).collect();
        assert_eq!(paths, vec!["/workspace/src/a.ts", "/workspace/src/deep/b.tsx"]);
    }

    #[tokio::test]
    async fn default_excludes_skip_node_modules() {
        let runtime = TestRuntime::new();
        runtime.add_file("/workspace/src/a.ts", "");
        runtime.add_file("/workspace/node_modules/lib/index.ts", "");
        runtime.add_file("/workspace/dist/bundle.ts", "");

        let scope = ScopeConfig::default();
        let files =
            collect_scope_files(&runtime, &scope, &exts(), Path::new("/workspace"))
                .await
                .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].as_path(), Path::new("/workspace/src/a.ts"));
    }

    #[tokio::test]
    async fn include_globs_narrow_the_scope() {
        let runtime = TestRuntime::new();
        runtime.add_file("/workspace/src/a.ts", "");
        runtime.add_file("/workspace/tools/b.ts", "");

        let mut scope = ScopeConfig::default();
        scope.include = vec!["src/**/*.ts".to_string()];
        let files =
            collect_scope_files(&runtime, &scope, &exts(), Path::new("/workspace"))
                .await
                .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].as_path(), Path::new("/workspace/src/a.ts"));
    }

    #[tokio::test]
    async fn invalid_pattern_is_an_error() {
        let runtime = TestRuntime::new();
        let mut scope = ScopeConfig::default();
        scope.include = vec!["src/[".to_string()];

        let err = collect_scope_files(&runtime, &scope, &exts(), Path::new("/workspace"))
            .await
            .unwrap_err();
        assert!(matches!(err, WalkerError::InvalidPattern { .. }));
    }
}
