//! In-memory runtime for tests.
//!
//! Holds a virtual file tree keyed by absolute paths. Directories are implied
//! by file paths, so fixtures only declare files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use path_clean::PathClean;

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// Virtual filesystem runtime for fixtures.
#[derive(Debug, Default)]
pub struct TestRuntime {
    files: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
    cwd: PathBuf,
}

impl TestRuntime {
    /// Create an empty runtime rooted at `/workspace`.
    pub fn new() -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            cwd: PathBuf::from("/workspace"),
        }
    }

    /// Create a runtime with an explicit working directory.
    pub fn with_cwd(cwd: impl Into<PathBuf>) -> Self {
        Self {
            files: RwLock::new(BTreeMap::new()),
            cwd: cwd.into(),
        }
    }

    /// Add a file. Relative paths are joined onto the runtime's cwd.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = self.absolute(path.as_ref());
        self.files.write().insert(path, content.into());
    }

    /// Remove a file, simulating deletion between runs.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        let path = self.absolute(path.as_ref());
        self.files.write().remove(&path);
    }

    /// Replace a file's contents, simulating an edit between runs.
    pub fn update_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.add_file(path, content);
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf().clean()
        } else {
            self.cwd.join(path).clean()
        }
    }

    fn is_dir_inner(&self, path: &Path) -> bool {
        let path = self.absolute(path);
        let files = self.files.read();
        files.keys().any(|f| f.starts_with(&path) && f != &path)
    }
}

#[async_trait]
impl Runtime for TestRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = self.absolute(path);
        self.files
            .read()
            .get(&path)
            .cloned()
            .ok_or(RuntimeError::FileNotFound(path))
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let abs = self.absolute(path);
        if let Some(content) = self.files.read().get(&abs) {
            return Ok(FileMetadata {
                size: content.len() as u64,
                is_dir: false,
                is_file: true,
                modified: None,
            });
        }
        if self.is_dir_inner(path) {
            return Ok(FileMetadata {
                size: 0,
                is_dir: true,
                is_file: false,
                modified: None,
            });
        }
        Err(RuntimeError::FileNotFound(abs))
    }

    async fn read_dir(&self, path: &Path) -> RuntimeResult<Vec<String>> {
        let dir = self.absolute(path);
        let files = self.files.read();

        let mut names: Vec<String> = files
            .keys()
            .filter_map(|f| f.strip_prefix(&dir).ok())
            .filter_map(|rest| rest.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        names.sort();
        names.dedup();

        if names.is_empty() && !self.is_dir_inner(path) {
            return Err(RuntimeError::FileNotFound(dir));
        }
        Ok(names)
    }

    fn exists(&self, path: &Path) -> bool {
        let abs = self.absolute(path);
        self.files.read().contains_key(&abs) || self.is_dir_inner(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        let abs = self.absolute(path);
        self.files.read().contains_key(&abs)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.is_dir_inner(path)
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn implied_directories_exist() {
        let runtime = TestRuntime::new();
        runtime.add_file("src/utils/format.ts", "export const f = 1;");

        assert!(runtime.is_dir(Path::new("/workspace/src")));
        assert!(runtime.is_dir(Path::new("src/utils")));
        assert!(runtime.is_file(Path::new("src/utils/format.ts")));
        assert!(!runtime.is_file(Path::new("src/utils")));

        let names = runtime.read_dir(Path::new("src")).await.unwrap();
        assert_eq!(names, vec!["utils".to_string()]);
    }

    #[tokio::test]
    async fn update_changes_content() {
        let runtime = TestRuntime::new();
        runtime.add_file("a.ts", "v1");
        runtime.update_file("a.ts", "v2");

        let content = runtime.read_file(Path::new("a.ts")).await.unwrap();
        assert_eq!(content, b"v2");
    }
}
