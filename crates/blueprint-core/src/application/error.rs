//! Application layer errors.
//!
//! These errors represent failures in orchestration, not in blueprint
//! declarations. Declaration and evaluation errors are `DomainError` from
//! `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// The repository could not supply a blueprint document.
    #[error("could not resolve blueprint '{path}': {reason}")]
    Resolver { path: String, reason: String },

    /// The blueprint is not present in the repository.
    #[error("blueprint '{path}' was not found in the repository")]
    BlueprintNotFound { path: String },

    /// The input collaborator failed (terminal closed, bad answers file).
    #[error("input failed for '{subject}': {reason}")]
    Input { subject: String, reason: String },

    /// Template rendering failed.
    #[error("rendering '{path}' failed: {reason}")]
    Rendering { path: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    Filesystem { path: PathBuf, reason: String },

    /// The user declined the final confirmation or interrupted a prompt.
    #[error("generation cancelled by user")]
    Cancelled,

    /// An output file already exists and `force` was not given.
    #[error("output file already exists at {path}")]
    OutputExists { path: PathBuf },
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Resolver { path, .. } => vec![
                format!("Check that '{}' is a readable blueprint directory", path),
                "Verify the --repository root".into(),
            ],
            Self::BlueprintNotFound { path } => vec![
                format!("No blueprint.yaml found for '{}'", path),
                "Try: blueprint list to see available blueprints".into(),
            ],
            Self::Input { .. } => vec!["Check the answers file or rerun interactively".into()],
            Self::Filesystem { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
                "Ensure the parent directory exists".into(),
            ],
            Self::OutputExists { path } => vec![
                format!("File already exists: {}", path.display()),
                "Use --force to overwrite (destructive)".into(),
                "Or choose a different --output directory".into(),
            ],
            Self::Cancelled => vec!["Nothing was written".into()],
            Self::Rendering { .. } => vec!["Check the template placeholders".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::BlueprintNotFound { .. } => ErrorCategory::NotFound,
            Self::Resolver { .. } | Self::Filesystem { .. } | Self::Rendering { .. } => {
                ErrorCategory::Internal
            }
            Self::Input { .. } | Self::OutputExists { .. } => ErrorCategory::Validation,
            Self::Cancelled => ErrorCategory::Cancelled,
        }
    }
}
