//! Schema validation for engine configs.
//!
//! Validation is purely structural (no filesystem checks) so it works for
//! hosts with virtual file systems. A failure here is fatal: the engine
//! refuses to start an analysis run with an invalid config.

use globset::Glob;

use crate::config::EngineConfig;
use crate::error::{ConfigError, Result};

/// Validate an [`EngineConfig`] before an analysis run.
pub fn validate_schema(config: &EngineConfig) -> Result<()> {
    if config.entries.is_empty() && config.scope.roots.is_empty() {
        return Err(ConfigError::SchemaValidation(
            "no entries and no scope roots: nothing to analyze".to_string(),
        ));
    }

    if config.resolver.extensions.is_empty() {
        return Err(ConfigError::SchemaValidation(
            "resolver.extensions cannot be empty".to_string(),
        ));
    }

    for ext in &config.resolver.extensions {
        if ext.trim().is_empty() || ext.starts_with('.') {
            return Err(ConfigError::SchemaValidation(format!(
                "invalid extension '{ext}': use 'ts', not '.ts'"
            )));
        }
    }

    if config.resolver.strategies.is_empty() {
        return Err(ConfigError::SchemaValidation(
            "resolver.strategies cannot be empty".to_string(),
        ));
    }

    for (alias, target) in &config.resolver.path_aliases {
        if alias.trim().is_empty() || target.trim().is_empty() {
            return Err(ConfigError::SchemaValidation(
                "path alias names and targets cannot be empty".to_string(),
            ));
        }
    }

    for external in &config.resolver.external {
        if external.trim().is_empty() {
            return Err(ConfigError::SchemaValidation(
                "external package names cannot be empty".to_string(),
            ));
        }
    }

    if config.max_depth == Some(0) {
        return Err(ConfigError::SchemaValidation(
            "max_depth must be at least 1".to_string(),
        ));
    }

    for pattern in config.scope.include.iter().chain(&config.scope.exclude) {
        Glob::new(pattern).map_err(|source| ConfigError::InvalidGlob {
            pattern: pattern.clone(),
            source,
        })?;
    }

    Ok(())
}
