//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `blueprint-adapters` crate provides implementations.

use std::path::Path;

use crate::domain::{BlueprintConfig, PreparedData, ResolvedOption, Value, Variable};
use crate::error::BlueprintResult;
use crate::functions::FnResult;

/// Port for fetching a blueprint document by repository path and turning it
/// into the canonical model.
///
/// Implemented by:
/// - `blueprint_adapters::repository::LocalRepository` (directory tree)
#[cfg_attr(test, mockall::automock)]
pub trait BlueprintResolver: Send + Sync {
    fn fetch_and_normalize(&self, path: &str) -> BlueprintResult<BlueprintConfig>;
}

/// Validator handed to [`InputSource::ask`]; returns the rejection reason.
pub type AnswerValidator<'a> = &'a dyn Fn(&Value) -> Result<(), String>;

/// Port for interactive input.
///
/// Implementations pick a control from `variable.var_type`: free text,
/// masked text, single-select, confirm or file path. `options` are already
/// resolved; a select answer is the chosen option's `value`. An
/// implementation should loop until `validator` accepts.
pub trait InputSource {
    fn ask(
        &mut self,
        variable: &Variable,
        default: &Value,
        options: &[ResolvedOption],
        validator: AnswerValidator<'_>,
    ) -> BlueprintResult<Value>;

    /// Final yes/no confirmation before anything is written.
    fn confirm(&mut self, summary: &PreparedData) -> BlueprintResult<bool>;
}

/// Port for one function domain (`aws`, `k8s`, `os`, `version`).
///
/// Providers must be safe for concurrent read-only calls.
#[cfg_attr(test, mockall::automock)]
pub trait FunctionProvider: Send + Sync {
    fn call(&self, module: &str, params: &[String]) -> BlueprintResult<FnResult>;
}

/// Port for rendering one template file body.
///
/// Implemented by:
/// - `blueprint_adapters::renderer::PlaceholderRenderer`
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, name: &str, template: &str, data: &PreparedData) -> BlueprintResult<String>;
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `blueprint_adapters::filesystem::LocalFilesystem` (production)
/// - `blueprint_adapters::filesystem::MemoryFilesystem` (testing)
pub trait Filesystem: Send + Sync {
    /// Read a whole file as UTF-8.
    fn read_file(&self, path: &Path) -> BlueprintResult<String>;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> BlueprintResult<()>;

    /// Write content to a file, creating parents as needed.
    fn write_file(&self, path: &Path, content: &str) -> BlueprintResult<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;
}
