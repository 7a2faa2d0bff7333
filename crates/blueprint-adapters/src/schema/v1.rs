//! `apiVersion: xl/v1` documents (deprecated).
//!
//! Legacy documents are mapped onto the current model: the description doubles
//! as prompt, `secret: true` picks the secret variant of the type, `pattern`
//! becomes a `regex(...)` validate expression and `dependsOnFalse` inverts the
//! condition.

use std::str::FromStr;

use serde::Deserialize;
use serde_yaml::Value as Yaml;

use blueprint_core::domain::{
    ApiVersion, BlueprintConfig, Condition, DomainError, FileOperation, FileOverride,
    IncludeStage, IncludedBlueprint, Metadata, ParameterOverride, TemplateConfig, VarField,
    Variable, VariableType,
};

use super::{
    fields::{self, V1_TAGS},
    v2::{file_path, rename_target},
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub(crate) struct DocumentV1 {
    #[allow(dead_code)]
    api_version: String,
    kind: String,
    #[serde(default)]
    metadata: MetadataV1,
    parameters: Option<Vec<ParameterV1>>,
    files: Option<Vec<FileV1>>,
    #[serde(default)]
    spec: SpecV1,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct MetadataV1 {
    #[serde(default)]
    project_name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    instructions: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpecV1 {
    parameters: Option<Vec<ParameterV1>>,
    files: Option<Vec<FileV1>>,
    #[serde(default)]
    include: Vec<IncludeV1>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct ParameterV1 {
    name: Option<Yaml>,
    #[serde(rename = "type")]
    var_type: Option<Yaml>,
    secret: Option<Yaml>,
    value: Option<Yaml>,
    description: Option<Yaml>,
    default: Option<Yaml>,
    depends_on: Option<Yaml>,
    depends_on_true: Option<Yaml>,
    depends_on_false: Option<Yaml>,
    #[serde(default)]
    options: Vec<Yaml>,
    pattern: Option<Yaml>,
    #[serde(rename = "saveInXlVals", alias = "saveInXlvals")]
    save_in_xlvals: Option<Yaml>,
    use_raw_value: Option<Yaml>,
    show_value_on_summary: Option<Yaml>,
    validate: Option<Yaml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct FileV1 {
    path: Option<Yaml>,
    operation: Option<Yaml>,
    renamed_path: Option<Yaml>,
    depends_on: Option<Yaml>,
    depends_on_true: Option<Yaml>,
    depends_on_false: Option<Yaml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct IncludeV1 {
    blueprint: String,
    #[serde(default)]
    stage: String,
    #[serde(default)]
    parameter_overrides: Vec<ParameterOverrideV1>,
    #[serde(default)]
    file_overrides: Vec<FileV1>,
    depends_on: Option<Yaml>,
    depends_on_true: Option<Yaml>,
    depends_on_false: Option<Yaml>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct ParameterOverrideV1 {
    name: String,
    value: Option<Yaml>,
    // Accepted so legacy documents still parse; never evaluated.
    #[allow(dead_code)]
    depends_on: Option<Yaml>,
    #[allow(dead_code)]
    depends_on_true: Option<Yaml>,
    #[allow(dead_code)]
    depends_on_false: Option<Yaml>,
}

/// `dependsOnFalse` wins over `dependsOnTrue`, which wins over bare `dependsOn`.
fn legacy_condition(
    depends_on: Option<&Yaml>,
    depends_on_true: Option<&Yaml>,
    depends_on_false: Option<&Yaml>,
) -> Result<Option<Condition>, String> {
    if let Some(c) = fields::condition(depends_on_false, V1_TAGS, true)? {
        return Ok(Some(c));
    }
    if let Some(c) = fields::condition(depends_on_true, V1_TAGS, false)? {
        return Ok(Some(c));
    }
    fields::condition(depends_on, V1_TAGS, false)
}

impl DocumentV1 {
    pub(crate) fn normalize(self, path: &str) -> Result<BlueprintConfig, DomainError> {
        let invalid = |reason: String| DomainError::validation(path, reason);

        let mut config = BlueprintConfig::new(path, ApiVersion::V1);
        config.kind = self.kind;
        config.metadata = Metadata {
            name: self.metadata.project_name,
            description: self.metadata.description,
            author: self.metadata.author,
            version: self.metadata.version,
            instructions: self.metadata.instructions,
            ..Metadata::default()
        };

        // Top-level lists predate `spec`.
        let parameters = self.spec.parameters.or(self.parameters).unwrap_or_default();
        let files = self.spec.files.or(self.files).unwrap_or_default();

        for parameter in &parameters {
            config.variables.push(parameter.to_variable().map_err(invalid)?);
        }
        for file in &files {
            config.template_configs.push(file.to_template_config(path)?);
        }
        for include in &self.spec.include {
            config.includes.push(include.to_included(path)?);
        }
        Ok(config)
    }
}

impl ParameterV1 {
    fn to_variable(&self) -> Result<Variable, String> {
        let name = fields::text(self.name.as_ref())?;
        let type_name = fields::text(self.var_type.as_ref())?;
        if name.trim().is_empty() || type_name.trim().is_empty() {
            return Err(format!("parameter [{name}] is missing required fields: [type]"));
        }

        let mut var_type = VariableType::from_str(&type_name)
            .map_err(|_| format!("type [{type_name}] is not valid for parameter [{name}]"))?;
        if fields::flag(self.secret.as_ref()) {
            var_type = var_type.into_secret();
        }

        let description = fields::text(self.description.as_ref())?;
        let mut variable = Variable::new(name.clone(), var_type).with_prompt(description.clone());
        variable.description = description;
        variable.default = fields::var_field(self.default.as_ref(), V1_TAGS)?;
        variable.value = fields::var_field(self.value.as_ref(), V1_TAGS)?;
        variable.depends_on = legacy_condition(
            self.depends_on.as_ref(),
            self.depends_on_true.as_ref(),
            self.depends_on_false.as_ref(),
        )?;
        variable.options = self
            .options
            .iter()
            .map(|o| fields::option(o, V1_TAGS))
            .collect::<Result<_, _>>()?;
        variable.save_in_values_file = fields::flag(self.save_in_xlvals.as_ref());
        variable.replace_as_is = fields::flag(self.use_raw_value.as_ref());
        variable.reveal_on_summary = fields::flag(self.show_value_on_summary.as_ref());

        let pattern = fields::text(self.pattern.as_ref())?;
        variable.validate = if pattern.is_empty() {
            fields::var_field(self.validate.as_ref(), V1_TAGS)?
        } else {
            Some(VarField::Expression(format!("regex('{pattern}', {name})")))
        };
        Ok(variable)
    }
}

impl FileV1 {
    fn condition(&self, blueprint: &str) -> Result<Option<Condition>, DomainError> {
        legacy_condition(
            self.depends_on.as_ref(),
            self.depends_on_true.as_ref(),
            self.depends_on_false.as_ref(),
        )
        .map_err(|r| DomainError::validation(blueprint, r))
    }

    fn to_template_config(&self, blueprint: &str) -> Result<TemplateConfig, DomainError> {
        let mut config = TemplateConfig::new(file_path(self.path.as_ref(), blueprint)?);
        config.depends_on = self.condition(blueprint)?;
        Ok(config)
    }

    fn to_override(&self, blueprint: &str) -> Result<FileOverride, DomainError> {
        let invalid = |reason: String| DomainError::validation(blueprint, reason);
        let operation = FileOperation::from_str(&fields::text(self.operation.as_ref()).map_err(invalid)?)
            .map_err(|_| invalid("file override operation must be 'skip' when set".into()))?;
        Ok(FileOverride {
            path: file_path(self.path.as_ref(), blueprint)?,
            operation,
            rename_to: rename_target(self.renamed_path.as_ref(), V1_TAGS, blueprint)?,
        })
    }
}

impl IncludeV1 {
    fn to_included(&self, blueprint: &str) -> Result<IncludedBlueprint, DomainError> {
        let invalid = |reason: String| DomainError::validation(blueprint, reason);
        if self.blueprint.trim().is_empty() {
            return Err(invalid("include must have a 'blueprint' field".into()));
        }
        let stage = IncludeStage::from_str(&self.stage).map_err(|_| {
            invalid(format!("include stage [{}] must be 'before' or 'after'", self.stage))
        })?;

        let mut include = IncludedBlueprint::new(self.blueprint.clone(), stage);
        include.depends_on = legacy_condition(
            self.depends_on.as_ref(),
            self.depends_on_true.as_ref(),
            self.depends_on_false.as_ref(),
        )
        .map_err(invalid)?;
        include.parameter_overrides = self
            .parameter_overrides
            .iter()
            .map(|p| {
                Ok(ParameterOverride {
                    name: p.name.clone(),
                    value: fields::var_field(p.value.as_ref(), V1_TAGS).map_err(invalid)?,
                })
            })
            .collect::<Result<_, DomainError>>()?;
        include.file_overrides = self
            .file_overrides
            .iter()
            .map(|f| f.to_override(blueprint))
            .collect::<Result<_, _>>()?;
        Ok(include)
    }
}
