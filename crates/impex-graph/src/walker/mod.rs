//! Graph traversal.
//!
//! Seeds from the configured entry points and the in-scope file set, then
//! walks import and re-export edges breadth-first, parsing and resolving each
//! newly discovered module and publishing its facts into the shared cache.
//! This is the only phase that performs I/O; everything downstream (export
//! maps, usage queries) runs synchronously over the populated cache.

mod scope;

pub use scope::collect_scope_files;

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, warn};

use impex_config::EngineConfig;

use crate::cache::ModuleGraphCache;
use crate::import::ImportKind;
use crate::module_id::{ModuleId, ModuleIdError};
use crate::parser::{parse_module_facts, ModuleFacts};
use crate::resolver::SpecifierResolver;
use crate::runtime::{Runtime, RuntimeError};

/// Traversal failures that abort the walk.
#[derive(Debug, Error)]
pub enum WalkerError {
    /// A configured entry point does not exist as a file.
    #[error("entry point not found: {0}")]
    EntryNotFound(PathBuf),

    /// A scope glob failed to compile.
    #[error("invalid scope pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    /// More modules discovered than `max_modules` allows.
    #[error("module limit exceeded ({limit} modules)")]
    ModuleLimitExceeded { limit: usize },

    /// Filesystem failure outside per-file isolation.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// A path could not become a module identity.
    #[error(transparent)]
    ModuleId(#[from] ModuleIdError),
}

/// Summary of one walk.
#[derive(Debug, Default)]
pub struct WalkReport {
    /// Every module visited, in traversal order.
    pub modules: Vec<ModuleId>,
    /// Modules whose facts carry a parse diagnostic.
    pub parse_failed: Vec<ModuleId>,
}

/// Breadth-first module graph walker.
pub struct GraphWalker {
    runtime: Arc<dyn Runtime>,
    resolver: Arc<SpecifierResolver>,
    cache: Arc<ModuleGraphCache>,
}

impl GraphWalker {
    pub fn new(
        runtime: Arc<dyn Runtime>,
        resolver: Arc<SpecifierResolver>,
        cache: Arc<ModuleGraphCache>,
    ) -> Self {
        Self {
            runtime,
            resolver,
            cache,
        }
    }

    /// Walk the graph reachable from the configured entries and scope.
    pub async fn walk(
        &self,
        config: &EngineConfig,
        workspace_root: &Path,
    ) -> Result<WalkReport, WalkerError> {
        let mut queue: VecDeque<(ModuleId, usize)> = VecDeque::new();

        for entry in &config.entries {
            let module = ModuleId::with_base(workspace_root, entry)?;
            if !self.runtime.is_file(module.as_path()) {
                return Err(WalkerError::EntryNotFound(module.into_path()));
            }
            queue.push_back((module, 0));
        }

        let scope_files = scope::collect_scope_files(
            self.runtime.as_ref(),
            &config.scope,
            &config.resolver.extensions,
            workspace_root,
        )
        .await?;
        for file in scope_files {
            queue.push_back((file, 0));
        }

        let max_depth = config.max_depth.unwrap_or(usize::MAX);
        let max_modules = config.max_modules.unwrap_or(usize::MAX);

        let mut visited: FxHashSet<ModuleId> = FxHashSet::default();
        let mut report = WalkReport::default();

        while let Some((module, depth)) = queue.pop_front() {
            if !visited.insert(module.clone()) {
                continue;
            }
            if visited.len() > max_modules {
                return Err(WalkerError::ModuleLimitExceeded { limit: max_modules });
            }

            if let Some(limit) = config.max_file_size {
                if let Ok(meta) = self.runtime.metadata(module.as_path()).await {
                    if meta.size > limit {
                        warn!(
                            module = %module,
                            size = meta.size,
                            limit,
                            "file exceeds size limit, skipping"
                        );
                        continue;
                    }
                }
            }

            let facts = match self.load(&module).await {
                Ok(facts) => facts,
                Err(RuntimeError::FileNotFound(path)) => {
                    // Resolved earlier but gone now; rules will report the
                    // dangling edge as unresolved.
                    warn!(module = %path.display(), "module disappeared during walk");
                    continue;
                }
                Err(err) => return Err(err.into()),
            };

            if facts.is_parse_failed() {
                report.parse_failed.push(module.clone());
            }
            report.modules.push(module);

            if depth >= max_depth {
                warn!(depth, "max traversal depth reached, not descending further");
                continue;
            }

            for target in dependency_targets(&facts, config) {
                if !visited.contains(&target) {
                    queue.push_back((target, depth + 1));
                }
            }
        }

        debug!(
            modules = report.modules.len(),
            parse_failed = report.parse_failed.len(),
            "walk complete"
        );
        Ok(report)
    }

    /// Load one module's facts: cache hit by content fingerprint, or parse
    /// and resolve fresh. Concurrent loads of the same module coalesce.
    async fn load(&self, module: &ModuleId) -> Result<Arc<ModuleFacts>, RuntimeError> {
        let bytes = self.runtime.read_file(module.as_path()).await?;
        let fingerprint = ModuleGraphCache::fingerprint(&bytes);

        let lock = self.cache.parse_lock(module);
        let _guard = lock.lock().await;
        if let Some(hit) = self.cache.get(module, fingerprint) {
            return Ok(self.revalidate(module, hit, fingerprint).await);
        }

        let source = String::from_utf8_lossy(&bytes);
        let mut facts = parse_module_facts(module, &source);

        // Resolve every edge now, while I/O is allowed; the query phase
        // reads these outcomes without touching the filesystem.
        for import in &mut facts.imports {
            import.resolved = Some(self.resolver.resolve(&import.source, module.as_path()).await);
        }
        for export in &mut facts.exports {
            if let Some(source) = export.source.clone() {
                export.resolved_source =
                    Some(self.resolver.resolve(&source, module.as_path()).await);
            }
        }

        Ok(self.cache.insert(fingerprint, facts))
    }

    /// A fingerprint hit proves the source is unchanged, not that the
    /// filesystem around it is: a target created or deleted since the facts
    /// were cached changes resolution outcomes. Re-resolving goes through
    /// the resolver memo, so an unchanged world costs one map lookup per
    /// edge; a changed outcome republishes the facts.
    async fn revalidate(
        &self,
        module: &ModuleId,
        hit: Arc<ModuleFacts>,
        fingerprint: u64,
    ) -> Arc<ModuleFacts> {
        let mut facts = (*hit).clone();
        let mut changed = false;

        for import in &mut facts.imports {
            let fresh = self.resolver.resolve(&import.source, module.as_path()).await;
            if import.resolved.as_ref() != Some(&fresh) {
                import.resolved = Some(fresh);
                changed = true;
            }
        }
        for export in &mut facts.exports {
            let Some(source) = export.source.clone() else {
                continue;
            };
            let fresh = self.resolver.resolve(&source, module.as_path()).await;
            if export.resolved_source.as_ref() != Some(&fresh) {
                export.resolved_source = Some(fresh);
                changed = true;
            }
        }

        if changed {
            debug!(module = %module, "resolution outcomes changed under cached facts");
            // Export maps derived from the old outcomes are stale too.
            self.cache.clear_export_maps();
            self.cache.insert(fingerprint, facts)
        } else {
            hit
        }
    }
}

/// Modules to traverse into from one file's facts.
fn dependency_targets(facts: &ModuleFacts, config: &EngineConfig) -> Vec<ModuleId> {
    let mut targets = Vec::new();

    for import in &facts.imports {
        match import.kind {
            ImportKind::Dynamic if !config.follow_dynamic_imports => continue,
            ImportKind::TypeOnly if !config.include_type_imports => continue,
            _ => {}
        }
        if let Some(resolved) = &import.resolved {
            if resolved.is_traversable() {
                if let Some(path) = &resolved.path {
                    targets.push(path.clone());
                }
            }
        }
    }

    // Re-export sources always traverse: export maps need them even when the
    // re-exporting file imports nothing at runtime.
    for export in &facts.exports {
        if let Some(resolved) = &export.resolved_source {
            if resolved.is_traversable() {
                if let Some(path) = &resolved.path {
                    targets.push(path.clone());
                }
            }
        }
    }

    targets
}
