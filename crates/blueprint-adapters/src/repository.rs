//! Directory-backed blueprint repository.
//!
//! # Directory layout expected
//!
//! ```text
//! blueprints/
//! ├── aws/
//! │   └── basic/
//! │       ├── blueprint.yaml     ← definition (or blueprint.yml)
//! │       ├── main.tf.tmpl
//! │       └── README.md
//! └── common/
//!     └── monitoring/
//!         ├── blueprint.yaml
//!         └── alerts.yaml
//! ```
//!
//! A blueprint's repository path is its directory relative to the root
//! (`aws/basic`), always with forward slashes.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde::Serialize;
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

use blueprint_core::{
    application::{ApplicationError, ports::BlueprintResolver},
    domain::BlueprintConfig,
    error::BlueprintResult,
};

use crate::schema::parse_blueprint;

/// Definition file names, in lookup order.
pub const DEFINITION_FILES: [&str; 2] = ["blueprint.yaml", "blueprint.yml"];

/// One row of [`LocalRepository::list`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlueprintSummary {
    pub path: String,
    pub name: String,
    pub description: String,
    pub api_version: String,
}

/// Resolves blueprints from a local directory tree.
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn definition_file(&self, path: &str) -> Option<PathBuf> {
        let dir = self.root.join(path);
        DEFINITION_FILES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    }

    /// Every blueprint under the root, sorted by path.
    ///
    /// Directories whose definition fails to parse are logged and skipped;
    /// one broken blueprint must not hide the others.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub fn list(&self) -> BlueprintResult<Vec<BlueprintSummary>> {
        if !self.root.is_dir() {
            return Err(ApplicationError::Resolver {
                path: self.root.display().to_string(),
                reason: "repository root is not a directory".into(),
            }
            .into());
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::Resolver {
                path: self.root.display().to_string(),
                reason: format!("directory walk error: {e}"),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(file_name) = entry.file_name().to_str() else {
                continue;
            };
            if !DEFINITION_FILES.contains(&file_name) {
                continue;
            }
            let Some(dir) = entry.path().parent() else {
                continue;
            };
            let Ok(relative) = dir.strip_prefix(&self.root) else {
                continue;
            };
            let path = repository_path(relative);

            match self.fetch_and_normalize(&path) {
                Ok(config) => found.push(BlueprintSummary {
                    path,
                    name: config.metadata.name,
                    description: config.metadata.description,
                    api_version: config.api_version.to_string(),
                }),
                Err(e) => warn!(blueprint = %path, error = %e, "skipping blueprint due to load error"),
            }
        }

        // Both spellings present in one directory yield one entry.
        found.dedup_by(|a, b| a.path == b.path);
        debug!(count = found.len(), "finished listing blueprints");
        Ok(found)
    }
}

impl BlueprintResolver for LocalRepository {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn fetch_and_normalize(&self, path: &str) -> BlueprintResult<BlueprintConfig> {
        let file = self
            .definition_file(path)
            .ok_or_else(|| ApplicationError::BlueprintNotFound { path: path.to_owned() })?;

        let content = fs::read_to_string(&file).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ApplicationError::BlueprintNotFound { path: path.to_owned() },
            _ => ApplicationError::Resolver {
                path: path.to_owned(),
                reason: format!("failed to read '{}': {e}", file.display()),
            },
        })?;

        let mut config = parse_blueprint(path, &content)?;
        let dir = self.root.join(path);
        for template in &mut config.template_configs {
            template.full_path = template.source_path.join_to(&dir);
        }

        debug!(file = %file.display(), "blueprint resolved");
        Ok(config)
    }
}

fn repository_path(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::error::BlueprintError;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    const DOC: &str = "apiVersion: xl/v2\nkind: Blueprint\nmetadata:\n  name: basic\n  description: Basic\nspec:\n  files:\n    - path: main.tf.tmpl\n";

    #[test]
    fn resolves_and_sets_full_paths() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "aws/basic/blueprint.yaml", DOC);

        let repo = LocalRepository::new(temp.path());
        let config = repo.fetch_and_normalize("aws/basic").unwrap();

        assert_eq!(config.path, "aws/basic");
        assert_eq!(
            config.template_configs[0].full_path,
            temp.path().join("aws/basic").join("main.tf.tmpl")
        );
    }

    #[test]
    fn falls_back_to_yml() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "legacy/blueprint.yml", DOC);

        let repo = LocalRepository::new(temp.path());
        assert!(repo.fetch_and_normalize("legacy").is_ok());
    }

    #[test]
    fn missing_blueprint_is_not_found() {
        let temp = TempDir::new().unwrap();
        let repo = LocalRepository::new(temp.path());

        let err = repo.fetch_and_normalize("nope").unwrap_err();
        assert!(matches!(
            err,
            BlueprintError::Application(ApplicationError::BlueprintNotFound { .. })
        ));
    }

    #[test]
    fn list_skips_broken_definitions() {
        let temp = TempDir::new().unwrap();
        write(temp.path(), "aws/basic/blueprint.yaml", DOC);
        write(temp.path(), "broken/blueprint.yaml", "apiVersion: xl/v9\n");
        write(temp.path(), "notes/readme.md", "not a blueprint");

        let repo = LocalRepository::new(temp.path());
        let listed = repo.list().unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, "aws/basic");
        assert_eq!(listed[0].name, "basic");
        assert_eq!(listed[0].api_version, "xl/v2");
    }
}
