//! Domain value objects: VariableType, ApiVersion, IncludeStage, FileOperation.
//!
//! These are pure value types: `Copy`, equality-by-value, no identity. Each
//! one knows its wire spelling (`as_str`) and how to parse it back
//! (`FromStr`), nothing more.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The only document kind a blueprint file may declare.
pub const BLUEPRINT_KIND: &str = "Blueprint";

// ── VariableType ─────────────────────────────────────────────────────────────

/// The kind of input a variable collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariableType {
    Input,
    SecretInput,
    Editor,
    SecretEditor,
    File,
    SecretFile,
    Select,
    Confirm,
}

impl VariableType {
    pub const ALL: [VariableType; 8] = [
        Self::Input,
        Self::SecretInput,
        Self::Editor,
        Self::SecretEditor,
        Self::File,
        Self::SecretFile,
        Self::Select,
        Self::Confirm,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::SecretInput => "SecretInput",
            Self::Editor => "Editor",
            Self::SecretEditor => "SecretEditor",
            Self::File => "File",
            Self::SecretFile => "SecretFile",
            Self::Select => "Select",
            Self::Confirm => "Confirm",
        }
    }

    /// Secret variables are stored in the secrets bucket and masked on summaries.
    pub const fn is_secret(self) -> bool {
        matches!(self, Self::SecretInput | Self::SecretEditor | Self::SecretFile)
    }

    /// Whether the answer names a file whose contents become the value.
    pub const fn reads_file(self) -> bool {
        matches!(self, Self::File | Self::SecretFile)
    }

    /// The secret counterpart of a plain type. Used by the legacy `secret: true` flag.
    pub const fn into_secret(self) -> Self {
        match self {
            Self::Input => Self::SecretInput,
            Self::Editor => Self::SecretEditor,
            Self::File => Self::SecretFile,
            other => other,
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariableType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation("", format!("type [{s}] is not valid")))
    }
}

// ── ApiVersion ───────────────────────────────────────────────────────────────

/// Blueprint schema version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    /// Legacy schema. Still accepted, normalized into the current model.
    #[serde(rename = "xl/v1")]
    V1,
    #[serde(rename = "xl/v2")]
    V2,
}

impl ApiVersion {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "xl/v1",
            Self::V2 => "xl/v2",
        }
    }

    pub const fn is_deprecated(self) -> bool {
        matches!(self, Self::V1)
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "xl/v1" => Ok(Self::V1),
            "xl/v2" => Ok(Self::V2),
            _ => Err(DomainError::validation(
                "",
                format!(
                    "api version needs to be {} or {}",
                    Self::V2.as_str(),
                    Self::V1.as_str()
                ),
            )),
        }
    }
}

// ── IncludeStage ─────────────────────────────────────────────────────────────

/// Where an included blueprint lands relative to the including one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncludeStage {
    Before,
    #[default]
    After,
}

impl IncludeStage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl fmt::Display for IncludeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IncludeStage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" => Ok(Self::Before),
            "after" | "" => Ok(Self::After),
            other => Err(DomainError::validation(
                "",
                format!("include stage [{other}] must be 'before' or 'after'"),
            )),
        }
    }
}

// ── FileOperation ────────────────────────────────────────────────────────────

/// File operation set by a composition file override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOperation {
    #[default]
    None,
    Skip,
}

impl FileOperation {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Skip => "skip",
        }
    }
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileOperation {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "skip" => Ok(Self::Skip),
            other => Err(DomainError::validation(
                "",
                format!("file operation [{other}] is not supported"),
            )),
        }
    }
}
