//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use blueprint_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{BlueprintError, BlueprintResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn read_file(&self, path: &Path) -> BlueprintResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn create_dir_all(&self, path: &Path) -> BlueprintResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> BlueprintResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| map_io_error(parent, e, "create directory"))?;
        }
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

pub(crate) fn map_io_error(path: &Path, e: io::Error, operation: &str) -> BlueprintError {
    ApplicationError::Filesystem {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parents_and_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a/b/c.txt");
        let fs = LocalFilesystem::new();

        fs.write_file(&path, "hello").unwrap();
        assert!(fs.exists(&path));
        assert_eq!(fs.read_file(&path).unwrap(), "hello");
    }

    #[test]
    fn missing_file_is_a_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFilesystem::new()
            .read_file(&dir.path().join("nope"))
            .unwrap_err();
        assert!(matches!(
            err,
            BlueprintError::Application(ApplicationError::Filesystem { .. })
        ));
    }
}
