//! Configuration for the impex analysis engine.
//!
//! The engine is configured with a single [`EngineConfig`] value describing
//! entry points, workspace scope, and specifier-resolution behavior. Configs
//! can be built programmatically, extracted from a `serde_json::Value`
//! supplied by a host, or discovered on disk (`impex.toml` or an `"impex"`
//! field in `package.json`).
//!
//! Validation is fatal by design: a config that fails [`validate_schema`]
//! aborts the run before any file is analyzed.

pub mod config;
pub mod discovery;
pub mod error;
pub mod validation;

pub use config::{EngineConfig, ResolutionStrategy, ResolverConfig, ScopeConfig};
pub use discovery::ConfigDiscovery;
pub use error::{ConfigError, Result};
pub use validation::validate_schema;
