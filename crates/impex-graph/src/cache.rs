//! Module fact cache.
//!
//! Parsed facts are cached per module, keyed by a content fingerprint so a
//! changed file re-parses while untouched files reuse their facts across
//! runs. Concurrent requests for the same module coalesce through a per-key
//! lock, so each file parses at most once per change.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::export_map::ExportMap;
use crate::module_id::ModuleId;
use crate::parser::ModuleFacts;

/// Counter snapshot for observability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub invalidations: u64,
    /// Modules currently cached.
    pub modules: usize,
}

impl CacheStats {
    /// Fraction of lookups served from cache, in `[0.0, 1.0]`.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheEntry {
    fingerprint: u64,
    facts: Arc<ModuleFacts>,
}

/// Shared cache of per-module facts and derived export maps.
///
/// Facts publish atomically: readers either see a complete entry or none.
/// Export maps are derived data; any fact invalidation clears all of them,
/// since re-export chains make a map depend on arbitrarily distant modules.
#[derive(Default)]
pub struct ModuleGraphCache {
    entries: DashMap<ModuleId, CacheEntry>,
    export_maps: DashMap<ModuleId, Arc<ExportMap>>,
    locks: DashMap<ModuleId, Arc<Mutex<()>>>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl ModuleGraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content fingerprint used as the cache validity key.
    pub fn fingerprint(source: &[u8]) -> u64 {
        seahash::hash(source)
    }

    /// Fetch facts if cached under a matching fingerprint.
    pub fn get(&self, module: &ModuleId, fingerprint: u64) -> Option<Arc<ModuleFacts>> {
        match self.entries.get(module) {
            Some(entry) if entry.fingerprint == fingerprint => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.facts))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Publish freshly parsed facts, replacing any stale entry.
    pub fn insert(&self, fingerprint: u64, facts: ModuleFacts) -> Arc<ModuleFacts> {
        let module = facts.module.clone();
        let facts = Arc::new(facts);
        self.entries.insert(
            module,
            CacheEntry {
                fingerprint,
                facts: Arc::clone(&facts),
            },
        );
        facts
    }

    /// Fetch facts regardless of fingerprint, for the synchronous query phase
    /// that runs after the walk finished populating the cache.
    pub fn facts(&self, module: &ModuleId) -> Option<Arc<ModuleFacts>> {
        self.entries.get(module).map(|e| Arc::clone(&e.facts))
    }

    /// Per-module lock coalescing concurrent parse requests.
    pub fn parse_lock(&self, module: &ModuleId) -> Arc<Mutex<()>> {
        self.locks
            .entry(module.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop one module's facts and every derived export map.
    pub fn invalidate(&self, module: &ModuleId) {
        let removed = self.entries.remove(module).is_some();
        if removed {
            self.invalidations.fetch_add(1, Ordering::Relaxed);
            // Re-export chains mean any map may transitively include this
            // module, so derived maps are dropped wholesale.
            self.export_maps.clear();
            debug!(module = %module, "invalidated cached facts");
        }
    }

    /// Drop everything, counters included.
    pub fn clear(&self) {
        self.entries.clear();
        self.export_maps.clear();
        self.locks.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.invalidations.store(0, Ordering::Relaxed);
    }

    /// Drop every derived export map without touching facts, for when
    /// resolution outcomes under existing facts change.
    pub fn clear_export_maps(&self) {
        self.export_maps.clear();
    }

    pub fn export_map(&self, module: &ModuleId) -> Option<Arc<ExportMap>> {
        self.export_maps.get(module).map(|m| Arc::clone(&m))
    }

    pub fn store_export_map(&self, module: ModuleId, map: Arc<ExportMap>) {
        self.export_maps.insert(module, map);
    }

    /// Modules currently holding cached facts.
    pub fn modules(&self) -> Vec<ModuleId> {
        self.entries.iter().map(|e| e.key().clone()).collect()
    }

    pub fn contains(&self, module: &ModuleId) -> bool {
        self.entries.contains_key(module)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
            modules: self.entries.len(),
        }
    }
}

impl std::fmt::Debug for ModuleGraphCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleGraphCache")
            .field("modules", &self.entries.len())
            .field("export_maps", &self.export_maps.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{ModuleFacts, SourceKind};

    fn facts_for(path: &str) -> ModuleFacts {
        ModuleFacts {
            module: ModuleId::from_resolved_path(path.into()),
            source_kind: SourceKind::TypeScript,
            imports: Vec::new(),
            exports: Vec::new(),
            parse_error: None,
        }
    }

    #[test]
    fn fingerprint_mismatch_is_a_miss() {
        let cache = ModuleGraphCache::new();
        let module = ModuleId::from_resolved_path("/workspace/a.ts".into());
        let fp = ModuleGraphCache::fingerprint(b"v1");

        cache.insert(fp, facts_for("/workspace/a.ts"));
        assert!(cache.get(&module, fp).is_some());

        let fp2 = ModuleGraphCache::fingerprint(b"v2");
        assert!(cache.get(&module, fp2).is_none());

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[test]
    fn invalidate_drops_facts_and_derived_maps() {
        let cache = ModuleGraphCache::new();
        let a = ModuleId::from_resolved_path("/workspace/a.ts".into());
        let b = ModuleId::from_resolved_path("/workspace/b.ts".into());
        let fp = ModuleGraphCache::fingerprint(b"x");

        cache.insert(fp, facts_for("/workspace/a.ts"));
        cache.insert(fp, facts_for("/workspace/b.ts"));
        cache.store_export_map(b.clone(), Arc::new(ExportMap::default()));

        cache.invalidate(&a);

        assert!(!cache.contains(&a));
        assert!(cache.contains(&b));
        assert!(cache.export_map(&b).is_none());
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn invalidating_unknown_module_is_a_no_op() {
        let cache = ModuleGraphCache::new();
        let b = ModuleId::from_resolved_path("/workspace/b.ts".into());
        cache.store_export_map(b.clone(), Arc::new(ExportMap::default()));

        cache.invalidate(&ModuleId::from_resolved_path("/workspace/a.ts".into()));

        assert!(cache.export_map(&b).is_some());
        assert_eq!(cache.stats().invalidations, 0);
    }
}
