use super::DomainError;
use std::fmt;
use std::path::{Path, PathBuf};

/// A file path guaranteed to stay inside a blueprint root.
///
/// Invariant: non-empty, not absolute, no leading `..` or `./`. Enforced at
/// construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelativePath(String);

impl RelativePath {
    /// Fallible constructor. `blueprint` only feeds the error message.
    pub fn try_new(path: impl Into<String>, blueprint: &str) -> Result<Self, DomainError> {
        let path = path.into();
        if path.trim().is_empty() {
            return Err(DomainError::validation(
                blueprint,
                "path is missing for file specification in files",
            ));
        }
        if escapes_root(&path) {
            return Err(DomainError::PathEscape {
                blueprint: blueprint.to_owned(),
                path,
            });
        }
        Ok(Self(path))
    }

    /// Resolve against a root directory.
    pub fn join_to(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(&self.0)
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the directory directly holding this file is named `name`.
    pub fn parent_is(&self, name: &str) -> bool {
        self.as_path()
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|dir| dir == name)
    }
}

/// `/x`, `\x`, `C:\x`, `../x` and `./x` all leave (or pretend to leave) the root.
fn escapes_root(path: &str) -> bool {
    path.starts_with('/')
        || path.starts_with('\\')
        || path.starts_with("..")
        || path.starts_with("./")
        || path.starts_with(".\\")
        || Path::new(path).is_absolute()
        || has_drive_prefix(path)
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl AsRef<Path> for RelativePath {
    fn as_ref(&self) -> &Path {
        self.as_path()
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
