//! The error type returned across the crate boundary.
//!
//! Domain and application failures keep their own enums; [`BlueprintError`]
//! only wraps them so callers get one type with hints and a category.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{DomainError, ErrorCategory as DomainCategory};

#[derive(Debug, Error, Clone)]
pub enum BlueprintError {
    /// Bad declarations, failed expressions, rejected answers.
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// Resolver, renderer, filesystem and pipeline failures.
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl BlueprintError {
    /// Hints a front end can print under the message.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in blueprint".into()],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => e.category().into(),
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// The innermost domain error, without the `Resolution` layers.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(e) => Some(e.root()),
            _ => None,
        }
    }
}

/// Coarse classification used by front ends to pick exit codes and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Evaluation,
    NotFound,
    Configuration,
    Cancelled,
    Internal,
}

impl From<DomainCategory> for ErrorCategory {
    fn from(category: DomainCategory) -> Self {
        match category {
            DomainCategory::Validation => Self::Validation,
            DomainCategory::Evaluation => Self::Evaluation,
            DomainCategory::NotFound => Self::NotFound,
            DomainCategory::Internal => Self::Internal,
        }
    }
}

pub type BlueprintResult<T> = Result<T, BlueprintError>;
