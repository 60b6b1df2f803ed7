//! Specifier resolution.
//!
//! Maps the specifier strings found in import/export declarations onto
//! modules, using a configurable pipeline of strategies (builtins, path
//! aliases, relative paths, `node_modules` packages). Resolution never fails
//! the analysis: a specifier that no strategy can place is classified
//! [`ModuleKind::Unresolved`] and reported by rules, not by the resolver.

mod aliases;
mod builtins;
mod extensions;
mod package;

pub use aliases::resolve_path_alias;
pub use builtins::{is_builtin, NODE_BUILTINS};
pub use extensions::{resolve_file, try_extensions, try_index_files};
pub use package::{resolve_package, split_package_specifier};

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use path_clean::PathClean;
use serde::{Deserialize, Serialize};
use tracing::trace;

use impex_config::{ResolutionStrategy, ResolverConfig};

use crate::module_id::ModuleId;
use crate::runtime::Runtime;

/// Classification of a resolution target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModuleKind {
    /// Platform builtin (`node:fs`, `path`). Never has a file.
    Builtin,
    /// Third-party package, either declared external or living under
    /// `node_modules`.
    External,
    /// Workspace file that participates in cross-file analysis.
    Internal,
    /// No strategy produced a target.
    Unresolved,
}

/// Outcome of resolving one specifier from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedModule {
    /// The specifier as written in source.
    pub specifier: String,
    pub kind: ModuleKind,
    /// The resolved file, present for `Internal` and for `External` packages
    /// resolved to a file on disk.
    pub path: Option<ModuleId>,
}

impl ResolvedModule {
    pub fn builtin(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            kind: ModuleKind::Builtin,
            path: None,
        }
    }

    pub fn external(specifier: impl Into<String>, path: Option<ModuleId>) -> Self {
        Self {
            specifier: specifier.into(),
            kind: ModuleKind::External,
            path,
        }
    }

    pub fn internal(specifier: impl Into<String>, module: ModuleId) -> Self {
        Self {
            specifier: specifier.into(),
            kind: ModuleKind::Internal,
            path: Some(module),
        }
    }

    pub fn unresolved(specifier: impl Into<String>) -> Self {
        Self {
            specifier: specifier.into(),
            kind: ModuleKind::Unresolved,
            path: None,
        }
    }

    /// Returns true for targets the walker should traverse into.
    pub fn is_traversable(&self) -> bool {
        self.kind == ModuleKind::Internal && self.path.is_some()
    }

    pub fn is_unresolved(&self) -> bool {
        self.kind == ModuleKind::Unresolved
    }
}

/// Check whether a specifier is declared external by configuration.
///
/// Matches the whole specifier or the package prefix, so `react` also covers
/// `react/jsx-runtime`.
pub fn is_external(specifier: &str, external: &[String]) -> bool {
    external
        .iter()
        .any(|e| specifier == e || specifier.strip_prefix(e.as_str()).is_some_and(|r| r.starts_with('/')))
}

/// Resolves specifiers to modules, memoizing per `(specifier, directory)`.
///
/// Resolution outcomes only depend on the importing file's directory, so the
/// memo key uses the directory rather than the file to share hits between
/// siblings.
pub struct SpecifierResolver {
    runtime: Arc<dyn Runtime>,
    config: ResolverConfig,
    /// Base directory for alias targets and relative entry paths.
    root: PathBuf,
    memo: DashMap<(String, PathBuf), ResolvedModule>,
}

impl SpecifierResolver {
    pub fn new(runtime: Arc<dyn Runtime>, config: ResolverConfig, root: PathBuf) -> Self {
        Self {
            runtime,
            config,
            root,
            memo: DashMap::new(),
        }
    }

    /// Base directory the resolver anchors alias targets to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a specifier as written in `from`.
    pub async fn resolve(&self, specifier: &str, from: &Path) -> ResolvedModule {
        let from_dir = from.parent().unwrap_or(&self.root).to_path_buf();
        let key = (specifier.to_string(), from_dir.clone());

        if let Some(hit) = self.memo.get(&key) {
            return hit.clone();
        }

        let resolved = self.resolve_uncached(specifier, &from_dir).await;
        trace!(specifier, from = %from.display(), kind = ?resolved.kind, "resolved specifier");

        self.memo.insert(key, resolved.clone());
        resolved
    }

    /// Drop all memoized outcomes. Called when files change between runs.
    pub fn clear(&self) {
        self.memo.clear();
    }

    async fn resolve_uncached(&self, specifier: &str, from_dir: &Path) -> ResolvedModule {
        for strategy in &self.config.strategies {
            match strategy {
                ResolutionStrategy::Builtin => {
                    if builtins::is_builtin(specifier, &self.config.builtins) {
                        return ResolvedModule::builtin(specifier);
                    }
                }
                ResolutionStrategy::Alias => {
                    if let Some(rewritten) =
                        aliases::resolve_path_alias(specifier, &self.config.path_aliases)
                    {
                        // Alias targets are anchored at the workspace root.
                        let candidate = self.root.join(rewritten.trim_start_matches("./")).clean();
                        return match extensions::resolve_file(
                            self.runtime.as_ref(),
                            &candidate,
                            &self.config.extensions,
                        ) {
                            Some(path) => self.classify_file(specifier, path),
                            None => ResolvedModule::unresolved(specifier),
                        };
                    }
                }
                ResolutionStrategy::Relative => {
                    if specifier.starts_with('.') || specifier.starts_with('/') {
                        let candidate = if specifier.starts_with('/') {
                            PathBuf::from(specifier)
                        } else {
                            from_dir.join(specifier)
                        }
                        .clean();

                        return match extensions::resolve_file(
                            self.runtime.as_ref(),
                            &candidate,
                            &self.config.extensions,
                        ) {
                            Some(path) => self.classify_file(specifier, path),
                            None => ResolvedModule::unresolved(specifier),
                        };
                    }
                }
                ResolutionStrategy::Package => {
                    if specifier.starts_with('.') || specifier.starts_with('/') {
                        continue;
                    }

                    if is_external(specifier, &self.config.external) {
                        return ResolvedModule::external(specifier, None);
                    }

                    if let Some(path) = package::resolve_package(
                        self.runtime.as_ref(),
                        from_dir,
                        specifier,
                        &self.config.extensions,
                    )
                    .await
                    {
                        return self.classify_file(specifier, path);
                    }
                }
            }
        }

        ResolvedModule::unresolved(specifier)
    }

    fn classify_file(&self, specifier: &str, path: PathBuf) -> ResolvedModule {
        let module = ModuleId::from_resolved_path(path);
        if module.is_in_node_modules() {
            ResolvedModule::external(specifier, Some(module))
        } else {
            ResolvedModule::internal(specifier, module)
        }
    }
}

impl std::fmt::Debug for SpecifierResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecifierResolver")
            .field("root", &self.root)
            .field("memoized", &self.memo.len())
            .finish()
    }
}
