//! Native filesystem runtime backed by `tokio::fs`.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use async_trait::async_trait;

use super::{FileMetadata, Runtime, RuntimeError, RuntimeResult};

/// Runtime implementation over the real filesystem.
#[derive(Debug, Default, Clone)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

fn io_err(path: &Path, err: std::io::Error) -> RuntimeError {
    if err.kind() == std::io::ErrorKind::NotFound {
        RuntimeError::FileNotFound(path.to_path_buf())
    } else {
        RuntimeError::Io(format!("{}: {err}", path.display()))
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        tokio::fs::read(path).await.map_err(|e| io_err(path, e))
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        let meta = tokio::fs::metadata(path).await.map_err(|e| io_err(path, e))?;

        let modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_millis() as u64);

        Ok(FileMetadata {
            size: meta.len(),
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            modified,
        })
    }

    async fn read_dir(&self, path: &Path) -> RuntimeResult<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await.map_err(|e| io_err(path, e))?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await.map_err(|e| io_err(path, e))? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        names.sort();
        Ok(names)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        std::env::current_dir().map_err(|e| RuntimeError::Io(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_and_lists_real_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.ts");
        std::fs::write(&file, "export const a = 1;").unwrap();

        let runtime = NativeRuntime::new();
        assert!(runtime.is_file(&file));
        assert!(runtime.is_dir(dir.path()));

        let bytes = runtime.read_file(&file).await.unwrap();
        assert_eq!(bytes, b"export const a = 1;");

        let names = runtime.read_dir(dir.path()).await.unwrap();
        assert_eq!(names, vec!["a.ts".to_string()]);
    }

    #[tokio::test]
    async fn missing_file_is_file_not_found() {
        let runtime = NativeRuntime::new();
        let err = runtime
            .read_file(Path::new("/definitely/not/here.ts"))
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::FileNotFound(_)));
    }
}
