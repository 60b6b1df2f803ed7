//! Crate-level integration tests over in-memory fixtures.

mod parser_tests;

use std::path::PathBuf;
use std::sync::Arc;

use impex_config::EngineConfig;

use crate::runtime::test_utils::TestRuntime;
use crate::{Engine, ModuleId};

/// Engine over a virtual workspace rooted at `/workspace`.
pub(crate) fn engine_with(runtime: TestRuntime, mut config: EngineConfig) -> Engine {
    config.cwd = Some(PathBuf::from("/workspace"));
    Engine::new(config, Arc::new(runtime)).unwrap()
}

pub(crate) fn module(path: &str) -> ModuleId {
    ModuleId::from_resolved_path(path.into())
}
