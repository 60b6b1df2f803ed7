//! Export map construction.
//!
//! An [`ExportMap`] is the set of names one module exposes, with local exports
//! and named re-exports resolved eagerly and `export *` sources merged
//! recursively. Merging is two-phase: locals and named re-exports claim their
//! names first, then star sources fill remaining names in source order, first
//! writer wins, and `default` never propagates through a star.
//!
//! Cycles are broken with a per-request in-progress set. A star edge that
//! lands on an in-progress module contributes no names and marks the map
//! ambiguous; maps built through such an edge are not memoized, so answers do
//! not depend on which module was asked about first.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::cache::ModuleGraphCache;
use crate::export::ExportKind;
use crate::module_id::ModuleId;
use crate::resolver::ModuleKind;
use crate::span::SourceSpan;

/// Where an exported name's value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportOrigin {
    /// Declared in the module itself.
    Local,
    /// Forwarded from another workspace module, by name or through a star.
    /// `name` is the name as known to `from`; `"*"` for a namespace
    /// re-export, which forwards the whole surface under one binding.
    ReExported { from: ModuleId, name: String },
    /// Forwarded from a builtin, external, or unresolved source; the name
    /// cannot be traced further.
    External { specifier: String },
}

/// One name in a module's export surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEntry {
    pub name: String,
    pub origin: ExportOrigin,
    pub type_only: bool,
    /// Span of the declaration that introduced the name into this module.
    pub span: SourceSpan,
}

/// The complete, merged export surface of one module.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportMap {
    entries: FxHashMap<String, ExportEntry>,
    /// Star sources whose names cannot be enumerated (external packages,
    /// builtins, unresolved specifiers). Non-empty means "a missing name
    /// might still exist".
    pub external_star_sources: Vec<String>,
    /// True when a star edge hit a module currently being built (a cycle)
    /// anywhere in the merge. Name lookups on an ambiguous map are best
    /// effort.
    pub ambiguous: bool,
    /// True when the module failed to parse; the surface is unknown.
    pub parse_failed: bool,
}

impl ExportMap {
    pub fn get(&self, name: &str) -> Option<&ExportEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = &ExportEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True when the name list is exact: no parse failure, no unenumerable
    /// star source, no cycle ambiguity. Rules only report a name as missing
    /// against an enumerable map.
    pub fn is_enumerable(&self) -> bool {
        !self.parse_failed && !self.ambiguous && self.external_star_sources.is_empty()
    }
}

/// Builds export maps over a populated fact cache.
///
/// Purely synchronous: every source a star can reach was already parsed and
/// resolved during the walk phase, so no I/O happens here.
pub struct ExportMapBuilder<'a> {
    cache: &'a ModuleGraphCache,
}

impl<'a> ExportMapBuilder<'a> {
    pub fn new(cache: &'a ModuleGraphCache) -> Self {
        Self { cache }
    }

    /// Build (or fetch the memoized) export map for one module.
    pub fn build(&self, module: &ModuleId) -> Arc<ExportMap> {
        let mut in_progress = FxHashSet::default();
        match self.build_inner(module, &mut in_progress) {
            Some((map, _)) => map,
            // Unreachable with an empty in-progress set; kept total anyway.
            None => Arc::new(ExportMap::default()),
        }
    }

    /// Returns `None` when `module` is currently being built (a cycle edge).
    /// The `bool` is true when no cycle edge was touched anywhere below, in
    /// which case the result is safe to memoize.
    fn build_inner(
        &self,
        module: &ModuleId,
        in_progress: &mut FxHashSet<ModuleId>,
    ) -> Option<(Arc<ExportMap>, bool)> {
        if in_progress.contains(module) {
            return None;
        }

        if let Some(cached) = self.cache.export_map(module) {
            return Some((cached, true));
        }

        in_progress.insert(module.clone());
        let (map, clean) = self.merge(module, in_progress);
        in_progress.remove(module);

        let map = Arc::new(map);
        if clean {
            self.cache.store_export_map(module.clone(), Arc::clone(&map));
        } else {
            trace!(module = %module, "export map touched a cycle, not memoizing");
        }

        Some((map, clean))
    }

    fn merge(&self, module: &ModuleId, in_progress: &mut FxHashSet<ModuleId>) -> (ExportMap, bool) {
        let mut map = ExportMap::default();
        let mut clean = true;

        let Some(facts) = self.cache.facts(module) else {
            // Outside the walked graph; treat like a parse failure.
            map.parse_failed = true;
            return (map, clean);
        };

        if facts.is_parse_failed() {
            map.parse_failed = true;
            return (map, clean);
        }

        let mut stars = Vec::new();

        // Phase one: locals and named re-exports claim their names.
        for record in &facts.exports {
            if record.kind == ExportKind::StarReExport {
                stars.push(record);
                continue;
            }

            let origin = if record.source.is_none() {
                ExportOrigin::Local
            } else {
                match &record.resolved_source {
                    Some(resolved) if !resolved.is_unresolved() => {
                        match (resolved.kind, &resolved.path) {
                            (ModuleKind::Internal, Some(path)) => ExportOrigin::ReExported {
                                from: path.clone(),
                                name: record
                                    .imported_name
                                    .clone()
                                    .unwrap_or_else(|| record.name.clone()),
                            },
                            _ => ExportOrigin::External {
                                specifier: resolved.specifier.clone(),
                            },
                        }
                    }
                    // A source nothing could place promises nothing: the
                    // name is omitted, and its absence is the signal rules
                    // read for dangling re-exports.
                    _ => continue,
                }
            };

            map.entries.entry(record.name.clone()).or_insert(ExportEntry {
                name: record.name.clone(),
                origin,
                type_only: record.type_only,
                span: record.span.clone(),
            });
        }

        // Phase two: stars fill the gaps in source order, never overriding
        // phase-one names or earlier stars, never forwarding `default`.
        for star in stars {
            let Some(resolved) = &star.resolved_source else {
                if let Some(source) = &star.source {
                    map.external_star_sources.push(source.clone());
                }
                continue;
            };

            match (resolved.kind, &resolved.path) {
                (ModuleKind::Internal, Some(source_module)) => {
                    match self.build_inner(source_module, in_progress) {
                        Some((source_map, source_clean)) => {
                            clean &= source_clean;
                            map.ambiguous |= source_map.ambiguous;
                            map.external_star_sources
                                .extend(source_map.external_star_sources.iter().cloned());
                            if source_map.parse_failed {
                                // Names behind a broken file are unknowable.
                                map.external_star_sources.push(resolved.specifier.clone());
                                continue;
                            }

                            for entry in source_map.entries.values() {
                                if entry.name == "default" {
                                    continue;
                                }
                                map.entries.entry(entry.name.clone()).or_insert(ExportEntry {
                                    name: entry.name.clone(),
                                    origin: ExportOrigin::ReExported {
                                        from: source_module.clone(),
                                        name: entry.name.clone(),
                                    },
                                    type_only: entry.type_only || star.type_only,
                                    span: star.span.clone(),
                                });
                            }
                        }
                        None => {
                            // Star edge into a module currently being built.
                            map.ambiguous = true;
                            clean = false;
                        }
                    }
                }
                _ => {
                    map.external_star_sources.push(resolved.specifier.clone());
                }
            }
        }

        (map, clean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ModuleGraphCache;
    use crate::export::ExportRecord;
    use crate::parser::{ModuleFacts, SourceKind};
    use crate::resolver::ResolvedModule;
    use std::path::Path;

    fn span(file: &str) -> SourceSpan {
        SourceSpan::new(Path::new(file), 0, 0, 1, 1)
    }

    fn module(path: &str) -> ModuleId {
        ModuleId::from_resolved_path(path.into())
    }

    fn insert(cache: &ModuleGraphCache, path: &str, exports: Vec<ExportRecord>) {
        let facts = ModuleFacts {
            module: module(path),
            source_kind: SourceKind::TypeScript,
            imports: Vec::new(),
            exports,
            parse_error: None,
        };
        cache.insert(0, facts);
    }

    fn local(file: &str, name: &str) -> ExportRecord {
        ExportRecord::local(name, ExportKind::Named, false, span(file))
    }

    fn star_to(file: &str, target: &str) -> ExportRecord {
        let mut record = ExportRecord::star(target, false, span(file));
        record.resolved_source = Some(ResolvedModule::internal(target, module(target)));
        record
    }

    #[test]
    fn locals_win_over_star_names() {
        let cache = ModuleGraphCache::new();
        insert(
            &cache,
            "/w/b.ts",
            vec![local("/w/b.ts", "shared"), local("/w/b.ts", "only_b")],
        );
        insert(
            &cache,
            "/w/a.ts",
            vec![local("/w/a.ts", "shared"), star_to("/w/a.ts", "/w/b.ts")],
        );

        let map = ExportMapBuilder::new(&cache).build(&module("/w/a.ts"));
        assert_eq!(map.get("shared").unwrap().origin, ExportOrigin::Local);
        assert!(matches!(
            map.get("only_b").unwrap().origin,
            ExportOrigin::ReExported { .. }
        ));
        assert!(map.is_enumerable());
    }

    #[test]
    fn earlier_star_wins_and_default_never_propagates() {
        let cache = ModuleGraphCache::new();
        insert(
            &cache,
            "/w/first.ts",
            vec![
                local("/w/first.ts", "x"),
                ExportRecord::local("default", ExportKind::Default, false, span("/w/first.ts")),
            ],
        );
        insert(&cache, "/w/second.ts", vec![local("/w/second.ts", "x")]);
        insert(
            &cache,
            "/w/a.ts",
            vec![
                star_to("/w/a.ts", "/w/first.ts"),
                star_to("/w/a.ts", "/w/second.ts"),
            ],
        );

        let map = ExportMapBuilder::new(&cache).build(&module("/w/a.ts"));
        assert_eq!(
            map.get("x").unwrap().origin,
            ExportOrigin::ReExported {
                from: module("/w/first.ts"),
                name: "x".to_string(),
            }
        );
        assert!(!map.contains("default"));
    }

    #[test]
    fn star_cycle_is_ambiguous_but_terminates() {
        let cache = ModuleGraphCache::new();
        insert(
            &cache,
            "/w/a.ts",
            vec![local("/w/a.ts", "from_a"), star_to("/w/a.ts", "/w/b.ts")],
        );
        insert(
            &cache,
            "/w/b.ts",
            vec![local("/w/b.ts", "from_b"), star_to("/w/b.ts", "/w/a.ts")],
        );

        let builder = ExportMapBuilder::new(&cache);
        let map_a = builder.build(&module("/w/a.ts"));

        // Locals still surface through the cycle.
        assert!(map_a.contains("from_a"));
        assert!(map_a.contains("from_b"));
        assert!(map_a.ambiguous);
        assert!(!map_a.is_enumerable());
    }

    #[test]
    fn cycle_answers_are_order_independent() {
        let cache = ModuleGraphCache::new();
        insert(
            &cache,
            "/w/a.ts",
            vec![local("/w/a.ts", "from_a"), star_to("/w/a.ts", "/w/b.ts")],
        );
        insert(
            &cache,
            "/w/b.ts",
            vec![local("/w/b.ts", "from_b"), star_to("/w/b.ts", "/w/a.ts")],
        );

        let builder = ExportMapBuilder::new(&cache);
        // Ask in one order, then the other; visible names must agree.
        let first_a = builder.build(&module("/w/a.ts"));
        let first_b = builder.build(&module("/w/b.ts"));

        let cache2 = ModuleGraphCache::new();
        insert(
            &cache2,
            "/w/a.ts",
            vec![local("/w/a.ts", "from_a"), star_to("/w/a.ts", "/w/b.ts")],
        );
        insert(
            &cache2,
            "/w/b.ts",
            vec![local("/w/b.ts", "from_b"), star_to("/w/b.ts", "/w/a.ts")],
        );
        let builder2 = ExportMapBuilder::new(&cache2);
        let second_b = builder2.build(&module("/w/b.ts"));
        let second_a = builder2.build(&module("/w/a.ts"));

        let names = |m: &ExportMap| {
            let mut v: Vec<_> = m.names().map(str::to_string).collect();
            v.sort();
            v
        };
        assert_eq!(names(&first_a), names(&second_a));
        assert_eq!(names(&first_b), names(&second_b));
    }

    #[test]
    fn unresolvable_re_export_source_omits_the_name() {
        let cache = ModuleGraphCache::new();
        let mut dangling =
            ExportRecord::re_export("x", "x", "./missing", false, span("/w/barrel.ts"));
        dangling.resolved_source = Some(ResolvedModule::unresolved("./missing"));
        // Resolution never ran for this one; same treatment.
        let unvisited =
            ExportRecord::re_export("y", "y", "./skipped", false, span("/w/barrel.ts"));
        insert(
            &cache,
            "/w/barrel.ts",
            vec![dangling, unvisited, local("/w/barrel.ts", "own")],
        );

        let map = ExportMapBuilder::new(&cache).build(&module("/w/barrel.ts"));
        assert!(!map.contains("x"));
        assert!(!map.contains("y"));
        assert!(map.contains("own"));
        assert!(map.is_enumerable());
    }

    #[test]
    fn external_star_disables_enumeration() {
        let cache = ModuleGraphCache::new();
        let mut star = ExportRecord::star("some-pkg", false, span("/w/a.ts"));
        star.resolved_source = Some(ResolvedModule::external("some-pkg", None));
        insert(&cache, "/w/a.ts", vec![local("/w/a.ts", "x"), star]);

        let map = ExportMapBuilder::new(&cache).build(&module("/w/a.ts"));
        assert!(map.contains("x"));
        assert!(!map.is_enumerable());
        assert_eq!(map.external_star_sources, vec!["some-pkg".to_string()]);
    }

    #[test]
    fn parse_failed_module_has_unknown_surface() {
        let cache = ModuleGraphCache::new();
        let m = module("/w/broken.ts");
        cache.insert(
            0,
            ModuleFacts::parse_failed(
                m.clone(),
                SourceKind::TypeScript,
                crate::parser::ParseDiagnostic {
                    message: "unexpected token".into(),
                    span: span("/w/broken.ts"),
                },
            ),
        );

        let map = ExportMapBuilder::new(&cache).build(&m);
        assert!(map.parse_failed);
        assert!(!map.is_enumerable());
    }

    #[test]
    fn clean_maps_are_memoized_and_reused() {
        let cache = ModuleGraphCache::new();
        insert(&cache, "/w/b.ts", vec![local("/w/b.ts", "x")]);
        insert(&cache, "/w/a.ts", vec![star_to("/w/a.ts", "/w/b.ts")]);

        let builder = ExportMapBuilder::new(&cache);
        let first = builder.build(&module("/w/a.ts"));
        let second = builder.build(&module("/w/a.ts"));
        assert!(Arc::ptr_eq(&first, &second));
    }
}
