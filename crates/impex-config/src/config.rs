//! Engine configuration structures.
//!
//! [`EngineConfig`] is the single source of truth for an analysis run: which
//! files are entry points, which files are in scope, and how module
//! specifiers resolve. All fields have serde defaults so partial configs
//! merge cleanly with the built-in defaults.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};

/// Default maximum depth for graph traversal.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Default maximum number of modules to process in one run.
pub const DEFAULT_MAX_MODULES: usize = 100_000;

/// Default maximum file size considered during traversal, in bytes.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// File extensions tried during specifier resolution, in priority order.
pub const DEFAULT_EXTENSIONS: &[&str] = &["ts", "tsx", "js", "jsx", "mjs", "cjs", "json"];

/// Directory patterns excluded from the workspace scope unless overridden.
pub const DEFAULT_EXCLUDE: &[&str] = &["**/node_modules/**", "**/.git/**", "**/dist/**"];

/// Top-level configuration for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Entry-point files. All of their exports are considered used.
    pub entries: Vec<PathBuf>,

    /// Workspace scope: which files participate in cross-file analysis.
    pub scope: ScopeConfig,

    /// Specifier resolution behavior.
    pub resolver: ResolverConfig,

    /// Whether dynamic `import()` edges are followed during traversal.
    pub follow_dynamic_imports: bool,

    /// Whether TypeScript type-only imports count as graph edges.
    pub include_type_imports: bool,

    /// Maximum traversal depth (guards cyclic or pathological graphs).
    pub max_depth: Option<usize>,

    /// Maximum number of modules processed in one run.
    pub max_modules: Option<usize>,

    /// Files larger than this many bytes are skipped during traversal.
    pub max_file_size: Option<u64>,

    /// Working directory; defaults to the runtime's cwd when absent.
    pub cwd: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            scope: ScopeConfig::default(),
            resolver: ResolverConfig::default(),
            follow_dynamic_imports: false,
            include_type_imports: true,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            max_modules: Some(DEFAULT_MAX_MODULES),
            max_file_size: Some(DEFAULT_MAX_FILE_SIZE),
            cwd: None,
        }
    }
}

impl EngineConfig {
    /// Build a config from a `serde_json::Value` (for programmatic hosts).
    ///
    /// # Example
    ///
    /// ```
    /// use impex_config::EngineConfig;
    /// use serde_json::json;
    ///
    /// let config = EngineConfig::from_value(json!({
    ///     "entries": ["src/index.ts"],
    ///     "resolver": { "path_aliases": { "@": "./src" } }
    /// })).unwrap();
    /// assert_eq!(config.entries.len(), 1);
    /// ```
    pub fn from_value(value: Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}

/// Which files belong to the analyzed workspace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Root directories walked when collecting in-scope files.
    pub roots: Vec<PathBuf>,

    /// Include glob patterns. Empty means "every file with a configured
    /// resolver extension under the roots".
    pub include: Vec<String>,

    /// Exclude glob patterns, matched against workspace-relative paths.
    pub exclude: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            include: Vec::new(),
            exclude: DEFAULT_EXCLUDE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Resolution strategy identifiers, applied in configured order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionStrategy {
    /// Platform builtin module list (`node:path`, `fs`, ...).
    Builtin,
    /// Path-alias tables (TypeScript `paths` / webpack `resolve.alias` style).
    Alias,
    /// Relative and absolute file paths with extension/index fallback.
    Relative,
    /// `node_modules` package-root resolution via manifest fields.
    Package,
}

/// Specifier resolution options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Extensions tried when a specifier omits one, in priority order.
    pub extensions: Vec<String>,

    /// Path aliases (e.g. "@" -> "./src"). Insertion order is match order.
    pub path_aliases: IndexMap<String, String>,

    /// Packages always classified External, never traversed.
    pub external: Vec<String>,

    /// Additional builtin module names merged with the platform defaults.
    pub builtins: Vec<String>,

    /// Strategy priority order; the first strategy producing a file wins.
    pub strategies: Vec<ResolutionStrategy>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            path_aliases: IndexMap::new(),
            external: Vec::new(),
            builtins: Vec::new(),
            strategies: vec![
                ResolutionStrategy::Builtin,
                ResolutionStrategy::Alias,
                ResolutionStrategy::Relative,
                ResolutionStrategy::Package,
            ],
        }
    }
}
