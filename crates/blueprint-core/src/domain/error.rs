// ============================================================================
// domain/error.rs - BLUEPRINT ERROR DOMAIN
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (prepared results are compared in tests)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (malformed or incomplete blueprint documents)
    // ========================================================================
    #[error("invalid blueprint '{blueprint}': {reason}")]
    Validation { blueprint: String, reason: String },

    #[error(
        "path for file specification cannot start with /, .. or ./ (got '{path}' in blueprint '{blueprint}')"
    )]
    PathEscape { blueprint: String, path: String },

    #[error("blueprint composition cycle detected: {}", cycle.join(" -> "))]
    CompositionCycle { cycle: Vec<String> },

    // ========================================================================
    // Evaluation Errors (expressions and function calls)
    // ========================================================================
    #[error("failed to evaluate expression [{expression}]: {reason}")]
    Evaluation { expression: String, reason: String },

    #[error("Expression [{expression}] result is invalid for a {expected} field, got {found}")]
    Type {
        expression: String,
        expected: &'static str,
        found: String,
    },

    #[error("function [{call}] failed: {reason}")]
    FunctionCall { call: String, reason: String },

    #[error("invalid function call [{call}]: {reason}")]
    InvalidFunctionCall { call: String, reason: String },

    #[error("{domain}.{module} is not a known function")]
    UnknownFunction { domain: String, module: String },

    // ========================================================================
    // Answer Errors
    // ========================================================================
    #[error("parameter [{variable}] is missing from the answers")]
    MissingAnswer { variable: String },

    #[error("invalid answer for parameter [{variable}]: {reason}")]
    InvalidAnswer { variable: String, reason: String },

    // ========================================================================
    // Context
    // ========================================================================
    /// Attaches the offending declaration and blueprint path to a nested error.
    #[error("{subject} in blueprint '{blueprint}': {source}")]
    Resolution {
        blueprint: String,
        subject: String,
        #[source]
        source: Box<DomainError>,
    },
}

impl DomainError {
    /// Shorthand for a [`DomainError::Validation`].
    pub fn validation(blueprint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            blueprint: blueprint.into(),
            reason: reason.into(),
        }
    }

    /// Wrap this error with the declaration it was raised for.
    pub fn within(self, blueprint: impl Into<String>, subject: impl Into<String>) -> Self {
        Self::Resolution {
            blueprint: blueprint.into(),
            subject: subject.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with every [`DomainError::Resolution`] layer removed.
    pub fn root(&self) -> &DomainError {
        match self {
            Self::Resolution { source, .. } => source.root(),
            other => other,
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Validation { blueprint, reason } => vec![
                format!("Fix the declaration in '{}'", blueprint),
                format!("Details: {}", reason),
            ],
            Self::PathEscape { .. } => vec![
                "File paths must be relative to the blueprint root".into(),
                "Remove leading '/', '../' or './' from the path".into(),
            ],
            Self::CompositionCycle { cycle } => vec![
                "A blueprint includes itself, directly or transitively".into(),
                format!("Break the cycle: {}", cycle.join(" -> ")),
            ],
            Self::Evaluation { .. } | Self::Type { .. } => vec![
                "Check the expression syntax and the parameters it references".into(),
                "Parameters must be declared before the expression that uses them".into(),
            ],
            Self::FunctionCall { .. } | Self::UnknownFunction { .. } => vec![
                "Supported domains: aws, k8s, os, version".into(),
                "Use the form domain.module(args)[index] or domain.module(args).attribute".into(),
            ],
            Self::InvalidFunctionCall { call, .. } => vec![
                format!("Check the syntax of '{}'", call),
                "Use the form domain.module(args)[index] or domain.module(args).attribute".into(),
            ],
            Self::MissingAnswer { variable } => vec![
                format!("Add '{}' to the answers file", variable),
                "Or run without --strict-answers to be prompted".into(),
            ],
            Self::InvalidAnswer { variable, .. } => {
                vec![format!("Provide a valid value for '{}'", variable)]
            }
            Self::Resolution { source, .. } => source.suggestions(),
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. } | Self::PathEscape { .. } | Self::CompositionCycle { .. } => {
                ErrorCategory::Validation
            }
            Self::Evaluation { .. }
            | Self::Type { .. }
            | Self::FunctionCall { .. }
            | Self::InvalidFunctionCall { .. } => ErrorCategory::Evaluation,
            Self::MissingAnswer { .. } | Self::InvalidAnswer { .. } => ErrorCategory::Validation,
            Self::UnknownFunction { .. } => ErrorCategory::NotFound,
            Self::Resolution { source, .. } => source.category(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Evaluation,
    NotFound,
    Internal,
}
