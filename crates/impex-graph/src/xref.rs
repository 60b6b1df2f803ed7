//! Cross-reference index.
//!
//! Records which exported names are actually consumed somewhere in the
//! workspace, and answers liveness queries for unused-export detection.
//! Namespace imports, dynamic imports, and bare `require()` calls cannot be
//! tracked per name, so they mark the whole target surface used. Re-export
//! chains do not count as usage by themselves: a name forwarded through a
//! chain is live only if the far end of the chain is.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use crate::cache::ModuleGraphCache;
use crate::export_map::{ExportMapBuilder, ExportOrigin};
use crate::import::ImportKind;
use crate::module_id::ModuleId;
use crate::resolver::ModuleKind;
use crate::span::SourceSpan;

/// One re-export edge: `re_exporter` forwards `source_name` from a source
/// module under `exported_as`.
#[derive(Debug, Clone)]
struct ReExportEdge {
    re_exporter: ModuleId,
    /// Name as known to the source module; `"*"` forwards everything.
    source_name: String,
    /// Name under which the re-exporter exposes it.
    exported_as: String,
}

/// Options controlling which imports count as usage.
#[derive(Debug, Clone, Copy)]
pub struct UsageOptions {
    pub include_type_imports: bool,
}

impl Default for UsageOptions {
    fn default() -> Self {
        Self {
            include_type_imports: true,
        }
    }
}

/// Index of exported-name usages across the walked graph.
#[derive(Debug, Default)]
pub struct UsageIndex {
    /// Per-name usages with the importing statement's span.
    usages: FxHashMap<(ModuleId, String), Vec<SourceSpan>>,
    /// Modules whose entire export surface counts as used: entry points and
    /// targets of namespace/dynamic/bare-require imports.
    fully_used: FxHashSet<ModuleId>,
    /// Re-export edges indexed by source module.
    re_export_edges: FxHashMap<ModuleId, Vec<ReExportEdge>>,
}

impl UsageIndex {
    /// Build the index over a populated fact cache.
    ///
    /// Entry points are unconditionally live: their exports are the public
    /// surface of the workspace.
    pub fn build(
        cache: &ModuleGraphCache,
        entry_points: &[ModuleId],
        options: UsageOptions,
    ) -> Self {
        let mut index = Self::default();
        index.fully_used.extend(entry_points.iter().cloned());

        let builder = ExportMapBuilder::new(cache);

        for module in cache.modules() {
            let Some(facts) = cache.facts(&module) else {
                continue;
            };

            for import in &facts.imports {
                if !options.include_type_imports && import.is_type_only() {
                    continue;
                }

                let Some(resolved) = &import.resolved else {
                    continue;
                };
                if resolved.kind != ModuleKind::Internal {
                    continue;
                }
                let Some(target) = &resolved.path else {
                    continue;
                };

                if import.names.is_empty() {
                    // Dynamic imports and bare requires grab the whole
                    // namespace; plain side-effect imports use no names.
                    if matches!(import.kind, ImportKind::Dynamic | ImportKind::Require) {
                        index.fully_used.insert(target.clone());
                    }
                    continue;
                }

                for name in &import.names {
                    if !options.include_type_imports && name.is_type_only() {
                        continue;
                    }
                    match name.imported_name() {
                        Some(imported) => index
                            .usages
                            .entry((target.clone(), imported.to_string()))
                            .or_default()
                            .push(import.span.clone()),
                        // Namespace import: every name is reachable.
                        None => {
                            index.fully_used.insert(target.clone());
                        }
                    }
                }
            }

            // Collect re-export edges from the merged export surface.
            let map = builder.build(&module);
            for entry in map.entries() {
                if let ExportOrigin::ReExported { from, name } = &entry.origin {
                    index
                        .re_export_edges
                        .entry(from.clone())
                        .or_default()
                        .push(ReExportEdge {
                            re_exporter: module.clone(),
                            source_name: name.clone(),
                            exported_as: entry.name.clone(),
                        });
                }
            }
        }

        debug!(
            tracked_names = index.usages.len(),
            fully_used_modules = index.fully_used.len(),
            "usage index built"
        );
        index
    }

    /// Direct usage sites of one exported name, excluding namespace-style
    /// consumers (those are tracked per module, not per name).
    pub fn usages_of(&self, module: &ModuleId, name: &str) -> &[SourceSpan] {
        self.usages
            .get(&(module.clone(), name.to_string()))
            .map_or(&[], Vec::as_slice)
    }

    /// True when the module's whole surface counts as used.
    pub fn is_fully_used(&self, module: &ModuleId) -> bool {
        self.fully_used.contains(module)
    }

    /// Liveness query: is `name` exported by `module` consumed anywhere,
    /// directly or through a chain of re-exports?
    pub fn is_used(&self, module: &ModuleId, name: &str) -> bool {
        let mut visited = FxHashSet::default();
        self.is_used_inner(module, name, &mut visited)
    }

    fn is_used_inner(
        &self,
        module: &ModuleId,
        name: &str,
        visited: &mut FxHashSet<(ModuleId, String)>,
    ) -> bool {
        if !visited.insert((module.clone(), name.to_string())) {
            // Re-export cycle; nothing on this loop consumed the name.
            return false;
        }

        if self.fully_used.contains(module) {
            return true;
        }

        if self.usages.contains_key(&(module.clone(), name.to_string())) {
            return true;
        }

        // A re-exported name is live if the re-exporter's alias for it is.
        if let Some(edges) = self.re_export_edges.get(module) {
            for edge in edges {
                let forwards_this_name =
                    edge.source_name == name || edge.source_name == "*";
                if !forwards_this_name {
                    continue;
                }
                // Liveness follows the name the re-exporter exposes; for a
                // namespace re-export that is the alias binding itself.
                if self.is_used_inner(&edge.re_exporter, &edge.exported_as, visited) {
                    return true;
                }
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{ExportKind, ExportRecord};
    use crate::import::{ImportKind, ImportRecord, ImportedName};
    use crate::parser::{ModuleFacts, SourceKind};
    use crate::resolver::ResolvedModule;
    use std::path::Path;

    fn span(file: &str) -> SourceSpan {
        SourceSpan::new(Path::new(file), 0, 0, 1, 1)
    }

    fn module(path: &str) -> ModuleId {
        ModuleId::from_resolved_path(path.into())
    }

    fn insert(
        cache: &ModuleGraphCache,
        path: &str,
        imports: Vec<ImportRecord>,
        exports: Vec<ExportRecord>,
    ) {
        cache.insert(
            0,
            ModuleFacts {
                module: module(path),
                source_kind: SourceKind::TypeScript,
                imports,
                exports,
                parse_error: None,
            },
        );
    }

    fn named_import(file: &str, target: &str, imported: &str) -> ImportRecord {
        let mut record = ImportRecord::new(
            target,
            ImportKind::Static,
            vec![ImportedName::Named {
                imported: imported.to_string(),
                local: imported.to_string(),
                type_only: false,
            }],
            span(file),
        );
        record.resolved = Some(ResolvedModule::internal(target, module(target)));
        record
    }

    fn local_export(file: &str, name: &str) -> ExportRecord {
        ExportRecord::local(name, ExportKind::Named, false, span(file))
    }

    #[test]
    fn named_import_marks_name_used() {
        let cache = ModuleGraphCache::new();
        insert(
            &cache,
            "/w/lib.ts",
            vec![],
            vec![local_export("/w/lib.ts", "used"), local_export("/w/lib.ts", "dead")],
        );
        insert(
            &cache,
            "/w/app.ts",
            vec![named_import("/w/app.ts", "/w/lib.ts", "used")],
            vec![],
        );

        let index = UsageIndex::build(&cache, &[], UsageOptions::default());
        assert!(index.is_used(&module("/w/lib.ts"), "used"));
        assert!(!index.is_used(&module("/w/lib.ts"), "dead"));
        assert_eq!(index.usages_of(&module("/w/lib.ts"), "used").len(), 1);
    }

    #[test]
    fn namespace_import_marks_everything_used() {
        let cache = ModuleGraphCache::new();
        insert(
            &cache,
            "/w/lib.ts",
            vec![],
            vec![local_export("/w/lib.ts", "a"), local_export("/w/lib.ts", "b")],
        );
        let mut ns = ImportRecord::new(
            "/w/lib.ts",
            ImportKind::Static,
            vec![ImportedName::Namespace {
                local: "lib".to_string(),
            }],
            span("/w/app.ts"),
        );
        ns.resolved = Some(ResolvedModule::internal("/w/lib.ts", module("/w/lib.ts")));
        insert(&cache, "/w/app.ts", vec![ns], vec![]);

        let index = UsageIndex::build(&cache, &[], UsageOptions::default());
        assert!(index.is_fully_used(&module("/w/lib.ts")));
        assert!(index.is_used(&module("/w/lib.ts"), "a"));
        assert!(index.is_used(&module("/w/lib.ts"), "b"));
    }

    #[test]
    fn side_effect_import_uses_no_names() {
        let cache = ModuleGraphCache::new();
        insert(
            &cache,
            "/w/polyfill.ts",
            vec![],
            vec![local_export("/w/polyfill.ts", "install")],
        );
        let mut side_effect =
            ImportRecord::new("/w/polyfill.ts", ImportKind::Static, vec![], span("/w/app.ts"));
        side_effect.resolved = Some(ResolvedModule::internal(
            "/w/polyfill.ts",
            module("/w/polyfill.ts"),
        ));
        insert(&cache, "/w/app.ts", vec![side_effect], vec![]);

        let index = UsageIndex::build(&cache, &[], UsageOptions::default());
        assert!(!index.is_used(&module("/w/polyfill.ts"), "install"));
    }

    #[test]
    fn bare_require_is_namespace_like() {
        let cache = ModuleGraphCache::new();
        insert(
            &cache,
            "/w/lib.ts",
            vec![],
            vec![local_export("/w/lib.ts", "helper")],
        );
        let mut req =
            ImportRecord::new("/w/lib.ts", ImportKind::Require, vec![], span("/w/app.ts"));
        req.resolved = Some(ResolvedModule::internal("/w/lib.ts", module("/w/lib.ts")));
        insert(&cache, "/w/app.ts", vec![req], vec![]);

        let index = UsageIndex::build(&cache, &[], UsageOptions::default());
        assert!(index.is_used(&module("/w/lib.ts"), "helper"));
    }

    #[test]
    fn liveness_follows_re_export_chains() {
        let cache = ModuleGraphCache::new();
        // lib exports `deep`; barrel re-exports it; app imports from barrel.
        insert(
            &cache,
            "/w/lib.ts",
            vec![],
            vec![local_export("/w/lib.ts", "deep"), local_export("/w/lib.ts", "dead")],
        );
        let mut re_export =
            ExportRecord::re_export("deep", "deep", "/w/lib.ts", false, span("/w/barrel.ts"));
        re_export.resolved_source =
            Some(ResolvedModule::internal("/w/lib.ts", module("/w/lib.ts")));
        let mut dead_re_export =
            ExportRecord::re_export("dead", "dead", "/w/lib.ts", false, span("/w/barrel.ts"));
        dead_re_export.resolved_source =
            Some(ResolvedModule::internal("/w/lib.ts", module("/w/lib.ts")));
        insert(&cache, "/w/barrel.ts", vec![], vec![re_export, dead_re_export]);
        insert(
            &cache,
            "/w/app.ts",
            vec![named_import("/w/app.ts", "/w/barrel.ts", "deep")],
            vec![],
        );

        let index = UsageIndex::build(&cache, &[], UsageOptions::default());
        // `deep` is consumed through the barrel, `dead` is forwarded but
        // nobody imports it anywhere.
        assert!(index.is_used(&module("/w/lib.ts"), "deep"));
        assert!(!index.is_used(&module("/w/lib.ts"), "dead"));
    }

    #[test]
    fn entry_point_exports_are_always_live() {
        let cache = ModuleGraphCache::new();
        insert(
            &cache,
            "/w/index.ts",
            vec![],
            vec![local_export("/w/index.ts", "api")],
        );

        let entries = vec![module("/w/index.ts")];
        let index = UsageIndex::build(&cache, &entries, UsageOptions::default());
        assert!(index.is_used(&module("/w/index.ts"), "api"));
    }

    #[test]
    fn re_export_cycle_terminates_as_unused() {
        let cache = ModuleGraphCache::new();
        let mut a_to_b = ExportRecord::re_export("x", "x", "/w/b.ts", false, span("/w/a.ts"));
        a_to_b.resolved_source = Some(ResolvedModule::internal("/w/b.ts", module("/w/b.ts")));
        let mut b_to_a = ExportRecord::re_export("x", "x", "/w/a.ts", false, span("/w/b.ts"));
        b_to_a.resolved_source = Some(ResolvedModule::internal("/w/a.ts", module("/w/a.ts")));

        insert(&cache, "/w/a.ts", vec![], vec![a_to_b]);
        insert(&cache, "/w/b.ts", vec![], vec![b_to_a]);

        let index = UsageIndex::build(&cache, &[], UsageOptions::default());
        assert!(!index.is_used(&module("/w/a.ts"), "x"));
    }

    #[test]
    fn type_imports_can_be_excluded() {
        let cache = ModuleGraphCache::new();
        insert(
            &cache,
            "/w/types.ts",
            vec![],
            vec![local_export("/w/types.ts", "Props")],
        );
        let mut record = ImportRecord::new(
            "/w/types.ts",
            ImportKind::TypeOnly,
            vec![ImportedName::Named {
                imported: "Props".to_string(),
                local: "Props".to_string(),
                type_only: true,
            }],
            span("/w/app.ts"),
        );
        record.resolved = Some(ResolvedModule::internal("/w/types.ts", module("/w/types.ts")));
        insert(&cache, "/w/app.ts", vec![record], vec![]);

        let strict = UsageIndex::build(
            &cache,
            &[],
            UsageOptions {
                include_type_imports: false,
            },
        );
        assert!(!strict.is_used(&module("/w/types.ts"), "Props"));

        let lenient = UsageIndex::build(&cache, &[], UsageOptions::default());
        assert!(lenient.is_used(&module("/w/types.ts"), "Props"));
    }
}
