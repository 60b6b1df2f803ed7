//! Analysis engine.
//!
//! [`Engine`] owns the configuration, runtime, resolver, and cache, and
//! exposes the operations hosts call: walk the graph, build export maps,
//! query resolution, and produce the three diagnostic families (unresolved
//! imports, missing named exports, unused exports).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use impex_config::{validate_schema, EngineConfig};

use crate::cache::{CacheStats, ModuleGraphCache};
use crate::export_map::{ExportMap, ExportMapBuilder};
use crate::module_id::ModuleId;
use crate::parser::{ModuleFacts, ParseDiagnostic};
use crate::resolver::{ModuleKind, ResolvedModule, SpecifierResolver};
use crate::runtime::Runtime;
use crate::span::SourceSpan;
use crate::walker::{GraphWalker, WalkReport};
use crate::xref::{UsageIndex, UsageOptions};
use crate::{Error, Result};

/// An import or re-export source whose specifier no resolution strategy
/// could place.
#[derive(Debug, Clone, Serialize)]
pub struct UnresolvedImport {
    /// The importing (or re-exporting) module.
    pub module: ModuleId,
    pub specifier: String,
    pub span: SourceSpan,
}

/// A named import (or named re-export) of a name its target does not export.
///
/// Only reported against enumerable targets: a module behind an external
/// star source or a parse failure might still provide the name.
#[derive(Debug, Clone, Serialize)]
pub struct MissingExport {
    /// The module doing the importing or re-exporting.
    pub module: ModuleId,
    /// The module that was expected to export `name`.
    pub target: ModuleId,
    pub name: String,
    pub span: SourceSpan,
}

/// An export no in-scope module consumes, directly or through re-exports.
#[derive(Debug, Clone, Serialize)]
pub struct UnusedExport {
    pub module: ModuleId,
    pub name: String,
    pub type_only: bool,
    pub span: SourceSpan,
}

/// Product of one [`Engine::analyze`] run.
#[derive(Debug)]
pub struct Analysis {
    /// Every module visited, in traversal order.
    pub modules: Vec<ModuleId>,
    /// Files that failed to parse, with their first diagnostic.
    pub parse_failures: Vec<ParseDiagnostic>,
    pub unresolved_imports: Vec<UnresolvedImport>,
    pub missing_exports: Vec<MissingExport>,
    /// Usage index over the walked graph; feeds [`Engine::unused_exports`].
    pub usage: UsageIndex,
}

/// Import/export graph analysis engine.
pub struct Engine {
    config: EngineConfig,
    runtime: Arc<dyn Runtime>,
    cache: Arc<ModuleGraphCache>,
    resolver: Arc<SpecifierResolver>,
    root: PathBuf,
}

impl Engine {
    /// Create an engine. Fails fast on invalid configuration.
    pub fn new(config: EngineConfig, runtime: Arc<dyn Runtime>) -> Result<Self> {
        validate_schema(&config)?;

        let root = match &config.cwd {
            Some(cwd) => cwd.clone(),
            None => runtime.get_cwd()?,
        };

        let resolver = Arc::new(SpecifierResolver::new(
            Arc::clone(&runtime),
            config.resolver.clone(),
            root.clone(),
        ));

        Ok(Self {
            config,
            runtime,
            cache: Arc::new(ModuleGraphCache::new()),
            resolver,
            root,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Workspace root every relative path is anchored to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the graph, populating the cache, without computing diagnostics.
    pub async fn walk(&self) -> Result<WalkReport> {
        let walker = GraphWalker::new(
            Arc::clone(&self.runtime),
            Arc::clone(&self.resolver),
            Arc::clone(&self.cache),
        );
        Ok(walker.walk(&self.config, &self.root).await?)
    }

    /// Walk the graph and compute resolution and usage diagnostics.
    pub async fn analyze(&self) -> Result<Analysis> {
        let report = self.walk().await?;
        let entry_points = self.entry_modules()?;

        let usage = UsageIndex::build(
            &self.cache,
            &entry_points,
            UsageOptions {
                include_type_imports: self.config.include_type_imports,
            },
        );

        let mut analysis = Analysis {
            modules: report.modules,
            parse_failures: Vec::new(),
            unresolved_imports: Vec::new(),
            missing_exports: Vec::new(),
            usage,
        };

        let builder = ExportMapBuilder::new(&self.cache);

        for module in &analysis.modules {
            let Some(facts) = self.cache.facts(module) else {
                continue;
            };

            if let Some(diag) = &facts.parse_error {
                analysis.parse_failures.push(diag.clone());
                continue;
            }

            for import in &facts.imports {
                let Some(resolved) = &import.resolved else {
                    continue;
                };

                if resolved.is_unresolved() {
                    analysis.unresolved_imports.push(UnresolvedImport {
                        module: module.clone(),
                        specifier: import.source.clone(),
                        span: import.span.clone(),
                    });
                    continue;
                }

                self.check_named_access(
                    &builder,
                    module,
                    resolved,
                    import.names.iter().filter_map(|n| n.imported_name()),
                    &import.span,
                    &mut analysis.missing_exports,
                );
            }

            // Re-export sources are dependencies too: a dangling one is
            // reported like a dangling import, and a named re-export
            // promises a name from its source.
            for export in &facts.exports {
                let Some(resolved) = &export.resolved_source else {
                    continue;
                };
                if resolved.is_unresolved() {
                    analysis.unresolved_imports.push(UnresolvedImport {
                        module: module.clone(),
                        specifier: resolved.specifier.clone(),
                        span: export.span.clone(),
                    });
                    continue;
                }
                let Some(imported) = export.imported_name.as_deref() else {
                    continue;
                };
                if imported == "*" {
                    continue;
                }
                self.check_named_access(
                    &builder,
                    module,
                    resolved,
                    std::iter::once(imported),
                    &export.span,
                    &mut analysis.missing_exports,
                );
            }
        }

        info!(
            modules = analysis.modules.len(),
            unresolved = analysis.unresolved_imports.len(),
            missing = analysis.missing_exports.len(),
            "analysis complete"
        );
        Ok(analysis)
    }

    fn check_named_access<'n>(
        &self,
        builder: &ExportMapBuilder<'_>,
        module: &ModuleId,
        resolved: &ResolvedModule,
        names: impl Iterator<Item = &'n str>,
        span: &SourceSpan,
        out: &mut Vec<MissingExport>,
    ) {
        if resolved.kind != ModuleKind::Internal {
            return;
        }
        let Some(target) = &resolved.path else {
            return;
        };

        let map = builder.build(target);
        if !map.is_enumerable() {
            return;
        }

        for name in names {
            if !map.contains(name) {
                out.push(MissingExport {
                    module: module.clone(),
                    target: target.clone(),
                    name: name.to_string(),
                    span: span.clone(),
                });
            }
        }
    }

    /// Exports nothing in scope consumes. Star records have no name of their
    /// own and are never reported here.
    pub fn unused_exports(&self, analysis: &Analysis) -> Vec<UnusedExport> {
        let mut unused = Vec::new();

        for module in &analysis.modules {
            let Some(facts) = self.cache.facts(module) else {
                continue;
            };

            for export in &facts.exports {
                if export.is_star_re_export() {
                    continue;
                }
                if !analysis.usage.is_used(module, &export.name) {
                    unused.push(UnusedExport {
                        module: module.clone(),
                        name: export.name.clone(),
                        type_only: export.type_only,
                        span: export.span.clone(),
                    });
                }
            }
        }

        unused
    }

    /// Resolve one specifier as written in `from`.
    pub async fn resolve(&self, specifier: &str, from: &Path) -> ResolvedModule {
        self.resolver.resolve(specifier, from).await
    }

    /// The merged export surface of a walked module.
    pub fn export_map(&self, module: &ModuleId) -> Arc<ExportMap> {
        ExportMapBuilder::new(&self.cache).build(module)
    }

    /// Cached facts for a walked module.
    pub fn module_facts(&self, module: &ModuleId) -> Option<Arc<ModuleFacts>> {
        self.cache.facts(module)
    }

    /// Drop one module's cached state ahead of a re-walk. Resolution memos
    /// are dropped too, since the change may add or remove files.
    pub fn invalidate(&self, module: &ModuleId) {
        self.cache.invalidate(module);
        self.resolver.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn entry_modules(&self) -> Result<Vec<ModuleId>> {
        self.config
            .entries
            .iter()
            .map(|entry| {
                ModuleId::with_base(&self.root, entry)
                    .map_err(|e| Error::Operation(e.to_string()))
            })
            .collect()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.root)
            .field("cache", &self.cache)
            .finish()
    }
}
