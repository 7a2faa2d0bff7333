//! `apiVersion: xl/v2` documents.

use std::str::FromStr;

use serde::Deserialize;
use serde_yaml::Value as Yaml;

use blueprint_core::domain::{
    ApiVersion, BlueprintConfig, DomainError, FileOperation, FileOverride,
    IncludeStage, IncludedBlueprint, Metadata, ParameterOverride, RelativePath, TemplateConfig,
    VarField, Variable, VariableType,
};

use super::fields::{self, V2_TAGS};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct DocumentV2 {
    #[allow(dead_code)]
    api_version: String,
    kind: String,
    #[serde(default)]
    metadata: MetadataV2,
    #[serde(default)]
    spec: SpecV2,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MetadataV2 {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    instructions: String,
    #[serde(default, rename = "suppressXebiaLabsFolder")]
    suppress_generated_dir: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct SpecV2 {
    #[serde(default)]
    parameters: Vec<ParameterV2>,
    #[serde(default)]
    files: Vec<FileV2>,
    #[serde(default, alias = "includebefore")]
    include_before: Vec<IncludeV2>,
    #[serde(default, alias = "includeafter")]
    include_after: Vec<IncludeV2>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct ParameterV2 {
    name: Option<Yaml>,
    prompt: Option<Yaml>,
    description: Option<Yaml>,
    label: Option<Yaml>,
    #[serde(rename = "type")]
    var_type: Option<Yaml>,
    default: Option<Yaml>,
    value: Option<Yaml>,
    prompt_if: Option<Yaml>,
    #[serde(default)]
    options: Vec<Yaml>,
    #[serde(alias = "saveInXlVals")]
    save_in_xlvals: Option<Yaml>,
    replace_as_is: Option<Yaml>,
    reveal_on_summary: Option<Yaml>,
    validate: Option<Yaml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct FileV2 {
    path: Option<Yaml>,
    rename_to: Option<Yaml>,
    write_if: Option<Yaml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct FileOverrideV2 {
    path: Option<Yaml>,
    rename_to: Option<Yaml>,
    operation: Option<Yaml>,
    write_if: Option<Yaml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct IncludeV2 {
    blueprint: String,
    #[serde(default)]
    parameter_overrides: Vec<ParameterV2>,
    #[serde(default)]
    file_overrides: Vec<FileOverrideV2>,
    include_if: Option<Yaml>,
}

impl DocumentV2 {
    pub(crate) fn normalize(self, path: &str) -> Result<BlueprintConfig, DomainError> {
        let invalid = |reason: String| DomainError::validation(path, reason);

        let mut config = BlueprintConfig::new(path, ApiVersion::V2);
        config.kind = self.kind;
        config.metadata = Metadata {
            name: self.metadata.name,
            description: self.metadata.description,
            author: self.metadata.author,
            version: self.metadata.version,
            instructions: self.metadata.instructions,
            suppress_generated_dir: self.metadata.suppress_generated_dir,
        };

        for parameter in &self.spec.parameters {
            config.variables.push(parameter.to_variable().map_err(invalid)?);
        }
        for file in &self.spec.files {
            config.template_configs.push(file.to_template_config(path)?);
        }
        for (stage, includes) in [
            (IncludeStage::Before, &self.spec.include_before),
            (IncludeStage::After, &self.spec.include_after),
        ] {
            for include in includes {
                config.includes.push(include.to_included(path, stage)?);
            }
        }

        Ok(config)
    }
}

fn must_have(name: &str, field: &str) -> String {
    format!("parameter {name} must have a '{field}' field")
}

fn must_not_have(name: &str, field: &str, when: &str) -> String {
    format!("parameter {name} must not have a '{field}' field when field '{when}' is set")
}

impl ParameterV2 {
    fn to_variable(&self) -> Result<Variable, String> {
        let name = fields::text(self.name.as_ref())?;
        if name.trim().is_empty() {
            return Err("parameter must have a 'name' field".into());
        }

        let prompt = fields::text(self.prompt.as_ref())?;
        let type_name = fields::text(self.var_type.as_ref())?;
        let value = fields::var_field(self.value.as_ref(), V2_TAGS)?;
        let default = fields::var_field(self.default.as_ref(), V2_TAGS)?;
        let depends_on = fields::condition(self.prompt_if.as_ref(), V2_TAGS, false)?;

        if value.is_none() {
            if prompt.trim().is_empty() {
                return Err(must_have(&name, "prompt"));
            }
            if type_name.trim().is_empty() {
                return Err(must_have(&name, "type"));
            }
        } else {
            if !prompt.is_empty() {
                return Err(must_not_have(&name, "prompt", "value"));
            }
            if default.is_some() {
                return Err(must_not_have(&name, "default", "value"));
            }
            if !self.options.is_empty() {
                return Err(must_not_have(&name, "options", "value"));
            }
            if depends_on.is_some() {
                return Err(must_not_have(&name, "promptIf", "value"));
            }
        }

        let var_type = if type_name.is_empty() {
            VariableType::Input
        } else {
            VariableType::from_str(&type_name)
                .map_err(|_| format!("type [{type_name}] is not valid for parameter [{name}]"))?
        };

        if !var_type.is_secret() {
            if self.replace_as_is.is_some() {
                return Err(must_not_have(&name, "replaceAsIs", "type=SecretInput"));
            }
            if self.reveal_on_summary.is_some() {
                return Err(must_not_have(&name, "revealOnSummary", "type=SecretInput"));
            }
        }

        let label = fields::text(self.label.as_ref())?;
        let mut variable = Variable::new(name, var_type).with_prompt(prompt);
        if !label.is_empty() {
            variable = variable.with_label(label);
        }
        variable.description = fields::text(self.description.as_ref())?;
        variable.default = default;
        variable.value = value;
        variable.depends_on = depends_on;
        variable.validate = fields::var_field(self.validate.as_ref(), V2_TAGS)?;
        variable.options = self
            .options
            .iter()
            .map(|o| fields::option(o, V2_TAGS))
            .collect::<Result<_, _>>()?;
        variable.save_in_values_file = fields::flag(self.save_in_xlvals.as_ref());
        variable.replace_as_is = fields::flag(self.replace_as_is.as_ref());
        variable.reveal_on_summary = fields::flag(self.reveal_on_summary.as_ref());
        Ok(variable)
    }

    /// Only `name` and `value` matter on an include's parameter override.
    fn to_override(&self, blueprint: &str) -> Result<ParameterOverride, DomainError> {
        let invalid = |reason: String| DomainError::validation(blueprint, reason);
        let name = fields::text(self.name.as_ref()).map_err(invalid)?;
        if name.trim().is_empty() {
            return Err(invalid("parameter override must have a 'name' field".into()));
        }
        Ok(ParameterOverride {
            name,
            value: fields::var_field(self.value.as_ref(), V2_TAGS).map_err(invalid)?,
        })
    }
}

/// A literal `renameTo` is checked like any other file path.
pub(crate) fn rename_target(
    node: Option<&Yaml>,
    tags: fields::Tags,
    blueprint: &str,
) -> Result<Option<VarField>, DomainError> {
    let field = fields::var_field(node, tags).map_err(|r| DomainError::validation(blueprint, r))?;
    if let Some(VarField::Literal(literal)) = &field {
        RelativePath::try_new(literal.clone(), blueprint)?;
    }
    Ok(field)
}

pub(crate) fn file_path(node: Option<&Yaml>, blueprint: &str) -> Result<RelativePath, DomainError> {
    let raw = fields::text(node).map_err(|r| DomainError::validation(blueprint, r))?;
    RelativePath::try_new(raw, blueprint)
}

impl FileV2 {
    fn to_template_config(&self, blueprint: &str) -> Result<TemplateConfig, DomainError> {
        let mut config = TemplateConfig::new(file_path(self.path.as_ref(), blueprint)?);
        config.rename_to = rename_target(self.rename_to.as_ref(), V2_TAGS, blueprint)?;
        config.depends_on = fields::condition(self.write_if.as_ref(), V2_TAGS, false)
            .map_err(|r| DomainError::validation(blueprint, r))?;
        Ok(config)
    }
}

impl FileOverrideV2 {
    fn to_override(&self, blueprint: &str) -> Result<FileOverride, DomainError> {
        let invalid = |reason: String| DomainError::validation(blueprint, reason);
        let mut operation = FileOperation::from_str(&fields::text(self.operation.as_ref()).map_err(invalid)?)
            .map_err(|_| invalid("file override operation must be 'skip' when set".into()))?;

        // `writeIf: false` is how v2 spells a skipped file.
        if let Some(write_if) = fields::var_field(self.write_if.as_ref(), V2_TAGS).map_err(invalid)? {
            if matches!(&write_if, VarField::Literal(s) if s == "false") {
                operation = FileOperation::Skip;
            }
        }

        Ok(FileOverride {
            path: file_path(self.path.as_ref(), blueprint)?,
            operation,
            rename_to: rename_target(self.rename_to.as_ref(), V2_TAGS, blueprint)?,
        })
    }
}

impl IncludeV2 {
    fn to_included(&self, blueprint: &str, stage: IncludeStage) -> Result<IncludedBlueprint, DomainError> {
        if self.blueprint.trim().is_empty() {
            return Err(DomainError::validation(blueprint, "include must have a 'blueprint' field"));
        }
        let mut include = IncludedBlueprint::new(self.blueprint.clone(), stage);
        include.depends_on = fields::condition(self.include_if.as_ref(), V2_TAGS, false)
            .map_err(|r| DomainError::validation(blueprint, r))?;
        include.parameter_overrides = self
            .parameter_overrides
            .iter()
            .map(|p| p.to_override(blueprint))
            .collect::<Result<_, _>>()?;
        include.file_overrides = self
            .file_overrides
            .iter()
            .map(|f| f.to_override(blueprint))
            .collect::<Result<_, _>>()?;
        Ok(include)
    }
}
