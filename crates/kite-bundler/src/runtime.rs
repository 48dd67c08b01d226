//! Filesystem access for the bundler.
//!
//! Every read the pipeline performs goes through [`Runtime`], so that tests
//! can observe reads and plugins can provide files that do not exist on
//! disk. [`BundlerRuntime`] checks virtual files first, then falls back to
//! the filesystem.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;

/// Result type for runtime operations
pub type RuntimeResult<T> = std::result::Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(PathBuf),

    #[error("I/O error on {}: {message}", .path.display())]
    Io { path: PathBuf, message: String },
}

/// Read-only file access used by resolution and module loading.
pub trait Runtime: Send + Sync + fmt::Debug {
    fn read(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    fn is_file(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.read(path)?;
        String::from_utf8(bytes).map_err(|_| RuntimeError::InvalidUtf8(path.to_path_buf()))
    }
}

/// Runtime implementation that combines virtual files with filesystem access
#[derive(Debug, Default, Clone)]
pub struct BundlerRuntime {
    virtual_files: Arc<RwLock<FxHashMap<PathBuf, Arc<[u8]>>>>,
}

impl BundlerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a virtual file. The path is cleaned before storage.
    pub fn add_virtual_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let content: Vec<u8> = content.into();
        self.virtual_files
            .write()
            .insert(path.as_ref().clean(), Arc::from(content));
    }

    pub fn has_virtual_file(&self, path: &Path) -> bool {
        self.virtual_files.read().contains_key(&path.clean())
    }

    pub fn virtual_file_count(&self) -> usize {
        self.virtual_files.read().len()
    }
}

impl Runtime for BundlerRuntime {
    fn read(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        if let Some(content) = self.virtual_files.read().get(&path.clean()) {
            return Ok(content.to_vec());
        }
        fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RuntimeError::FileNotFound(path.to_path_buf()),
            _ => RuntimeError::Io {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })
    }

    fn is_file(&self, path: &Path) -> bool {
        self.has_virtual_file(path) || path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn virtual_files_shadow_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.js");
        fs::write(&path, "disk").unwrap();

        let runtime = BundlerRuntime::new();
        assert_eq!(runtime.read_to_string(&path).unwrap(), "disk");

        runtime.add_virtual_file(&path, "virtual");
        assert_eq!(runtime.read_to_string(&path).unwrap(), "virtual");
    }

    #[test]
    fn virtual_lookup_cleans_paths() {
        let runtime = BundlerRuntime::new();
        runtime.add_virtual_file("/project/client/App.vue.ts", "export {}");
        assert!(runtime.is_file(Path::new("/project/client/./js/../App.vue.ts")));
    }

    #[test]
    fn missing_file_reports_not_found() {
        let runtime = BundlerRuntime::new();
        let err = runtime.read(Path::new("/definitely/not/here.js")).unwrap_err();
        assert!(matches!(err, RuntimeError::FileNotFound(_)));
    }

    #[test]
    fn invalid_utf8_is_reported() {
        let runtime = BundlerRuntime::new();
        runtime.add_virtual_file("/x.js", vec![0xff, 0xfe]);
        assert!(matches!(
            runtime.read_to_string(Path::new("/x.js")),
            Err(RuntimeError::InvalidUtf8(_))
        ));
    }
}
