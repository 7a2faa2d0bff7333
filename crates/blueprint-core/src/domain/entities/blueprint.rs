//! Canonical blueprint document model.
//!
//! A [`BlueprintConfig`] is built once per raw document by the schema
//! normalizer, mutated only by composition (override application), then read
//! by data preparation.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::{
    entities::{
        common::RelativePath,
        field::{Condition, VarField},
        variable::Variable,
    },
    error::DomainError,
    value_objects::{ApiVersion, BLUEPRINT_KIND, FileOperation, IncludeStage},
};

// ── Metadata ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    pub instructions: String,
    /// Skip the values, secrets and `.gitignore` files that are otherwise
    /// always written under the generated directory.
    pub suppress_generated_dir: bool,
}

// ── TemplateConfig ───────────────────────────────────────────────────────────

/// One output file declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateConfig {
    /// Relative to the blueprint root.
    pub source_path: RelativePath,
    /// Where the repository keeps the file. Filled in by the resolver.
    pub full_path: PathBuf,
    pub depends_on: Option<Condition>,
    pub rename_to: Option<VarField>,
    /// Only ever set by a composition file override.
    pub operation: FileOperation,
}

impl TemplateConfig {
    pub fn new(source_path: RelativePath) -> Self {
        Self {
            full_path: PathBuf::from(source_path.as_str()),
            source_path,
            depends_on: None,
            rename_to: None,
            operation: FileOperation::None,
        }
    }

    pub fn with_depends_on(mut self, condition: Condition) -> Self {
        self.depends_on = Some(condition);
        self
    }

    pub fn with_rename_to(mut self, rename_to: VarField) -> Self {
        self.rename_to = Some(rename_to);
        self
    }
}

// ── Includes ─────────────────────────────────────────────────────────────────

/// Replaces the `value` of the included blueprint's variable with this name.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterOverride {
    pub name: String,
    pub value: Option<VarField>,
}

/// Replaces `operation` and `renameTo` of the included blueprint's file at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct FileOverride {
    pub path: RelativePath,
    pub operation: FileOperation,
    pub rename_to: Option<VarField>,
}

/// A reference from one blueprint to another.
#[derive(Debug, Clone, PartialEq)]
pub struct IncludedBlueprint {
    pub blueprint_path: String,
    pub stage: IncludeStage,
    pub depends_on: Option<Condition>,
    pub parameter_overrides: Vec<ParameterOverride>,
    pub file_overrides: Vec<FileOverride>,
}

impl IncludedBlueprint {
    pub fn new(blueprint_path: impl Into<String>, stage: IncludeStage) -> Self {
        Self {
            blueprint_path: blueprint_path.into(),
            stage,
            depends_on: None,
            parameter_overrides: Vec::new(),
            file_overrides: Vec::new(),
        }
    }
}

// ── BlueprintConfig ──────────────────────────────────────────────────────────

/// The canonical, version-independent blueprint document.
#[derive(Debug, Clone, PartialEq)]
pub struct BlueprintConfig {
    /// Repository path the document was resolved from.
    pub path: String,
    pub api_version: ApiVersion,
    pub kind: String,
    pub metadata: Metadata,
    pub variables: Vec<Variable>,
    pub template_configs: Vec<TemplateConfig>,
    pub includes: Vec<IncludedBlueprint>,
}

impl BlueprintConfig {
    pub fn new(path: impl Into<String>, api_version: ApiVersion) -> Self {
        Self {
            path: path.into(),
            api_version,
            kind: BLUEPRINT_KIND.to_owned(),
            metadata: Metadata::default(),
            variables: Vec::new(),
            template_configs: Vec::new(),
            includes: Vec::new(),
        }
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.iter().find(|v| v.name == name)
    }

    pub fn variable_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.variables.iter_mut().find(|v| v.name == name)
    }

    pub fn template_config_mut(&mut self, path: &RelativePath) -> Option<&mut TemplateConfig> {
        self.template_configs
            .iter_mut()
            .find(|t| &t.source_path == path)
    }

    /// Checks the document-level invariants.
    pub fn validate(&self) -> Result<(), DomainError> {
        crate::domain::DomainValidator::validate_blueprint(self)
    }
}

// ── ComposedBlueprint ────────────────────────────────────────────────────────

/// One entry of a composed include sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedBlueprint {
    pub path: String,
    pub config: BlueprintConfig,
    /// Include-edge conditions of every ancestor followed by this edge's own.
    /// All must hold for the entry to be prepared.
    pub conditions: Vec<Condition>,
    /// Path of the including blueprint; `None` for the root.
    pub parent: Option<String>,
    /// Stage of the edge that brought this entry in; `None` for the root.
    pub stage: Option<IncludeStage>,
}

impl ComposedBlueprint {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}
