//! Errors surfaced by the `blueprint` binary.
//!
//! Core failures pass through unchanged inside [`CliError::Core`]; the
//! variants here cover what only the CLI can get wrong (paths, config
//! files, terminal features). Each error knows its hints, its exit code and
//! how to print itself.

use std::error::Error;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use thiserror::Error;

use blueprint_core::error::{BlueprintError, ErrorCategory as CoreCategory};

pub type CliResult<T> = Result<T, CliError>;

type BoxedCause = Box<dyn Error + Send + Sync>;

const VERBOSE_HINT: &str = "Use -v / --verbose for more details.";

#[derive(Debug, Error)]
pub enum CliError {
    /// Input clap accepted but the command cannot use.
    #[error("Invalid input: {message}")]
    InvalidInput {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("Blueprint repository not found at {path}")]
    RepositoryNotFound { path: PathBuf },

    /// The config file could not be read, merged or written.
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    #[error("{0}")]
    Core(#[from] BlueprintError),

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// The user declined a confirmation or interrupted a prompt.
    #[error("Operation cancelled")]
    Cancelled,

    /// The binary was built without a cargo feature the run needs.
    #[error("Feature not available: {feature}")]
    FeatureNotAvailable { feature: &'static str },
}

impl From<std::io::Error> for CliError {
    fn from(source: std::io::Error) -> Self {
        Self::IoError {
            message: source.to_string(),
            source,
        }
    }
}

/// How an error is classified for exit codes and log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    UserError,
    NotFound,
    Configuration,
    Internal,
}

impl ErrorCategory {
    pub fn exit_code(self) -> u8 {
        match self {
            Self::Internal => 1,
            Self::UserError => 2,
            Self::NotFound => 3,
            Self::Configuration => 4,
        }
    }
}

impl From<CoreCategory> for ErrorCategory {
    fn from(category: CoreCategory) -> Self {
        match category {
            CoreCategory::Validation | CoreCategory::Evaluation | CoreCategory::Cancelled => {
                Self::UserError
            }
            CoreCategory::NotFound => Self::NotFound,
            CoreCategory::Configuration => Self::Configuration,
            CoreCategory::Internal => Self::Internal,
        }
    }
}

impl CliError {
    /// Hints printed under the error message.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Core(core) => core.suggestions(),
            Self::InvalidInput { .. } => vec!["Run with --help to see the accepted arguments".into()],
            Self::RepositoryNotFound { path } => vec![
                format!("No directory at '{}'", path.display()),
                "Pass the repository root with -r/--repository".into(),
                "Or set `repository` in the config file".into(),
            ],
            Self::ConfigError { .. } => vec![
                format!(
                    "Check the config file at {}",
                    crate::config::AppConfig::config_path().display()
                ),
                "Run 'blueprint config --init' to write a default one".into(),
            ],
            Self::IoError { .. } => vec![
                "Check the permissions of the target path".into(),
                "Make sure the parent directory exists".into(),
            ],
            Self::Cancelled => vec!["Nothing was written".into()],
            Self::FeatureNotAvailable { feature } => vec![
                format!("Rebuild with `--features {feature}` to prompt for parameters"),
                "Or pass an answers file with --answers, or use --use-defaults".into(),
            ],
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(core) => core.category().into(),
            Self::InvalidInput { .. } | Self::Cancelled => ErrorCategory::UserError,
            Self::RepositoryNotFound { .. } => ErrorCategory::NotFound,
            Self::ConfigError { .. } | Self::FeatureNotAvailable { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError { .. } => ErrorCategory::Internal,
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.category().exit_code()
    }

    /// Messages of the wrapped errors, outermost first.
    fn causes(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::successors(self.source(), |err| (*err).source()).map(ToString::to_string)
    }

    /// Terminal rendering with colors. `verbose` adds the cause chain and
    /// drops the hint about `-v`.
    pub fn format_colored(&self, verbose: bool) -> String {
        let mut out = format!(
            "\n{} {}\n\n  {}\n",
            "✗".red().bold(),
            "Error:".red().bold(),
            self.to_string().red()
        );
        if verbose {
            for cause in self.causes() {
                out += &format!("\n  {} {}\n", "→".dimmed(), cause.dimmed());
            }
        }
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out += &format!("\n{}\n", "Suggestions:".yellow().bold());
            for hint in suggestions {
                out += &format!("  {hint}\n");
            }
        }
        if !verbose {
            out += &format!("\n{} {}\n", "\u{2139}".blue(), VERBOSE_HINT.dimmed());
        }
        out
    }

    /// Same layout as [`Self::format_colored`] without escape codes.
    pub fn format_plain(&self, verbose: bool) -> String {
        let mut out = format!("\nError: {}\n", self);
        if verbose {
            for cause in self.causes() {
                out += &format!("  Caused by: {cause}\n");
            }
        }
        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            out += "\nSuggestions:\n";
            for hint in suggestions {
                out += &format!("  {hint}\n");
            }
        }
        if !verbose {
            out += &format!("\n{VERBOSE_HINT}\n");
        }
        out
    }

    /// User mistakes are warnings; everything else is an error.
    pub fn log(&self) {
        let category = self.category();
        match category {
            ErrorCategory::UserError | ErrorCategory::NotFound => {
                tracing::warn!(?category, "{}", self)
            }
            ErrorCategory::Configuration | ErrorCategory::Internal => {
                tracing::error!(?category, "{}", self)
            }
        }
        for cause in self.causes() {
            tracing::debug!(%cause, "caused by");
        }
    }
}

/// Attach a message to an I/O failure at the call site.
pub trait IntoCli<T> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>;
}

impl<T> IntoCli<T> for Result<T, std::io::Error> {
    fn with_cli_context<F, S>(self, f: F) -> CliResult<T>
    where
        F: FnOnce() -> S,
        S: Into<String>,
    {
        self.map_err(|source| CliError::IoError {
            message: f().into(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    use blueprint_core::application::ApplicationError;

    fn core(err: ApplicationError) -> CliError {
        CliError::Core(err.into())
    }

    #[test]
    fn missing_blueprint_suggests_list() {
        let err = core(ApplicationError::BlueprintNotFound {
            path: "aws/basic".into(),
        });
        assert!(err.suggestions().iter().any(|s| s.contains("blueprint list")));
    }

    #[test]
    fn output_exists_suggestions_come_from_core() {
        let err = core(ApplicationError::OutputExists {
            path: PathBuf::from("/tmp/out/app.yaml"),
        });
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn repository_not_found_mentions_flag() {
        let err = CliError::RepositoryNotFound {
            path: PathBuf::from("/nope"),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("--repository")));
    }

    #[test]
    fn exit_codes_follow_category() {
        let cases: Vec<(CliError, u8)> = vec![
            (
                CliError::InvalidInput {
                    message: "x".into(),
                    source: None,
                },
                2,
            ),
            (
                core(ApplicationError::Input {
                    subject: "AppName".into(),
                    reason: "missing".into(),
                }),
                2,
            ),
            (core(ApplicationError::Cancelled), 2),
            (CliError::Cancelled, 2),
            (core(ApplicationError::BlueprintNotFound { path: "x".into() }), 3),
            (
                CliError::ConfigError {
                    message: "x".into(),
                    source: None,
                },
                4,
            ),
            (
                CliError::Core(BlueprintError::Configuration {
                    message: "x".into(),
                }),
                4,
            ),
            (CliError::FeatureNotAvailable { feature: "interactive" }, 4),
            (io::Error::other("e").into(), 1),
        ];
        for (err, code) in cases {
            assert_eq!(err.exit_code(), code, "{err}");
        }
    }

    #[test]
    fn plain_format_has_header_and_hint() {
        let s = CliError::RepositoryNotFound {
            path: PathBuf::from("/tmp/x"),
        }
        .format_plain(false);
        assert!(s.contains("Error:"));
        assert!(s.contains("Suggestions:"));
        assert!(s.contains(VERBOSE_HINT));
    }

    #[test]
    fn verbose_plain_format_lists_causes() {
        let err = CliError::IoError {
            message: "writing config".into(),
            source: io::Error::other("disk full"),
        };
        let s = err.format_plain(true);
        assert!(s.contains("Caused by: disk full"));
        assert!(!s.contains("--verbose"));
    }

    #[test]
    fn io_context_replaces_message() {
        let result: Result<(), io::Error> = Err(io::Error::new(io::ErrorKind::NotFound, "missing"));
        let cli = result.with_cli_context(|| "reading config");
        assert!(matches!(cli, Err(CliError::IoError { message, .. }) if message == "reading config"));
    }
}
