use std::collections::HashSet;

use crate::domain::{
    entities::{BlueprintConfig, Variable},
    error::DomainError,
    value_objects::{ApiVersion, BLUEPRINT_KIND, VariableType},
};

/// Centralized domain validation.
///
/// All document-level invariants live here, not scattered across the schema
/// normalizers.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_blueprint(config: &BlueprintConfig) -> Result<(), DomainError> {
        if config.kind != BLUEPRINT_KIND {
            return Err(DomainError::validation(
                &config.path,
                format!("yaml document kind needs to be {BLUEPRINT_KIND}"),
            ));
        }

        let mut seen = HashSet::new();
        for variable in &config.variables {
            if !seen.insert(variable.name.as_str()) {
                return Err(DomainError::validation(
                    &config.path,
                    format!("variable names must be unique, found [{}] twice", variable.name),
                ));
            }
            Self::validate_variable(variable, config.api_version)
                .map_err(|reason| DomainError::validation(&config.path, reason))?;
        }

        Ok(())
    }

    fn validate_variable(variable: &Variable, api_version: ApiVersion) -> Result<(), String> {
        let name = &variable.name;
        if name.is_empty() {
            return Err("parameter must have a 'name' field".into());
        }
        if variable.var_type == VariableType::Select
            && variable.value.is_none()
            && variable.options.is_empty()
        {
            return Err(format!(
                "at least one option field is need to be set for parameter [{name}]"
            ));
        }
        if variable.var_type.reads_file() && variable.value.is_some() {
            return Err(format!(
                "'value' field is not allowed for file input type on parameter [{name}]"
            ));
        }
        // Legacy documents mixed the two freely.
        if api_version == ApiVersion::V2 && variable.value.is_some() && variable.depends_on.is_some()
        {
            return Err(format!(
                "parameter {name} must not have a 'promptIf' field when field 'value' is set"
            ));
        }
        Ok(())
    }
}
