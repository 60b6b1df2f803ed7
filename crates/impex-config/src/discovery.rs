//! File-based config discovery.
//!
//! Searches conventional locations for impex configuration and loads it via
//! figment so file values, environment overrides, and built-in defaults merge
//! predictably. Library hosts that already hold a config value should use
//! [`EngineConfig::from_value`] directly.

use std::fs;
use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde_json::Value;
use tracing::debug;

use crate::config::EngineConfig;
use crate::error::{ConfigError, Result};

/// File-based configuration discovery.
///
/// # Example
///
/// ```no_run
/// use impex_config::ConfigDiscovery;
///
/// let config = ConfigDiscovery::new(".").load().unwrap();
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
}

impl ConfigDiscovery {
    /// Create a new config discovery rooted at a directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find a config file in the root directory.
    ///
    /// Searches in this order:
    /// 1. `impex.toml`
    /// 2. `package.json` with an `"impex"` field
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join("impex.toml");
        if toml_path.exists() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed.get("impex").is_some_and(|v| !v.is_null()) {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load config from the discovered file, merged over defaults with
    /// `IMPEX_*` environment overrides applied last.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no config file is found.
    pub fn load(&self) -> Result<EngineConfig> {
        let path = self.find().ok_or(ConfigError::NotFound)?;
        debug!(path = %path.display(), "loading config");
        self.load_from(&path)
    }

    /// Load config from a specific file path.
    pub fn load_from(&self, path: &Path) -> Result<EngineConfig> {
        if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            return self.load_from_package_json(path);
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Figment::from(Serialized::defaults(EngineConfig::default()))
                .merge(Toml::file(path))
                .merge(Env::prefixed("IMPEX_").split("__"))
                .extract()
                .map_err(|e| ConfigError::InvalidValue(e.to_string())),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }

    fn load_from_package_json(&self, path: &Path) -> Result<EngineConfig> {
        let content = fs::read_to_string(path)?;

        let parsed: Value = serde_json::from_str(&content)
            .map_err(|e| ConfigError::InvalidValue(format!("invalid package.json: {e}")))?;

        let impex_value = parsed
            .get("impex")
            .filter(|v| !v.is_null())
            .ok_or_else(|| {
                ConfigError::InvalidValue("package.json has no 'impex' field".to_string())
            })?;

        Figment::from(Serialized::defaults(EngineConfig::default()))
            .merge(Serialized::defaults(impex_value.clone()))
            .merge(Env::prefixed("IMPEX_").split("__"))
            .extract()
            .map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }
}
