//! # impex-graph
//!
//! Module resolution and export-graph analysis for JavaScript/TypeScript
//! workspaces. Given source files, the engine extracts import/export facts,
//! resolves specifiers to concrete files (or classifies them as builtin,
//! external, or unresolved), composes transitive export maps through
//! re-export chains, and answers the queries lint rules need:
//!
//! - does module M export name X?
//! - is export X of module M referenced anywhere in scope?
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                        Engine                            │
//! │  resolve / export_map / usage_index / unused_exports     │
//! └───────┬───────────────┬──────────────┬───────────────────┘
//!         │               │              │
//!         ▼               ▼              ▼
//!  SpecifierResolver  ModuleGraphCache  UsageIndex
//!         │               │              │
//!         └──────► GraphWalker ◄─────────┘
//!                      │
//!                      ▼
//!              parse_module_facts (OXC)
//! ```
//!
//! All file I/O happens through the [`Runtime`] abstraction during the walk
//! phase. Export-map building and usage queries are pure and synchronous over
//! the cached facts, so cycle detection never blocks on I/O.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use impex_config::EngineConfig;
//! use impex_graph::{Engine, NativeRuntime};
//!
//! # async fn example() -> impex_graph::Result<()> {
//! let mut config = EngineConfig::default();
//! config.entries = vec!["src/index.ts".into()];
//!
//! let engine = Engine::new(config, Arc::new(NativeRuntime::new()))?;
//! let analysis = engine.analyze().await?;
//!
//! for unused in engine.unused_exports(&analysis) {
//!     println!("{}: unused export '{}'", unused.module, unused.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod engine;
pub mod export;
pub mod export_map;
pub mod import;
pub mod module_id;
pub mod parser;
pub mod resolver;
pub mod runtime;
pub mod span;
pub mod walker;
pub mod xref;

pub use cache::{CacheStats, ModuleGraphCache};
pub use engine::{Analysis, Engine, MissingExport, UnresolvedImport, UnusedExport};
pub use export::{ExportKind, ExportRecord};
pub use export_map::{ExportEntry, ExportMap, ExportMapBuilder, ExportOrigin};
pub use import::{ImportKind, ImportRecord, ImportedName};
pub use module_id::{ModuleId, ModuleIdError};
pub use parser::{parse_module_facts, ModuleFacts, ParseDiagnostic, SourceKind};
pub use resolver::{ModuleKind, ResolvedModule, SpecifierResolver};
pub use runtime::{FileMetadata, Runtime, RuntimeError, RuntimeResult};
pub use span::SourceSpan;
pub use walker::{GraphWalker, WalkReport, WalkerError};
pub use xref::{UsageIndex, UsageOptions};

pub use runtime::native::NativeRuntime;

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::test_utils::TestRuntime;

/// Error type for engine operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration; fatal before any file is analyzed.
    #[error("invalid configuration: {0}")]
    Config(#[from] impex_config::ConfigError),

    /// Traversal failure (depth/module limits, path escapes).
    #[error(transparent)]
    Walk(#[from] walker::WalkerError),

    /// Runtime (I/O) failure outside per-file isolation.
    #[error(transparent)]
    Runtime(#[from] runtime::RuntimeError),

    /// Graph operation error.
    #[error("operation error: {0}")]
    Operation(String),
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests;
