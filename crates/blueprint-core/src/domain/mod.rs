// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for blueprints.
//!
//! This module contains the canonical blueprint model and its invariants.
//! Evaluation, prompting and I/O are handled elsewhere; the types here only
//! describe what a blueprint declares.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Value semantics**: All domain objects are Clone + PartialEq
//! - **Sum types**: Deferred fields are an enum, not a tagged string
//!
pub mod entities;
pub mod error;
pub mod value_objects;

mod validation;

pub use entities::{
    blueprint::{
        BlueprintConfig, ComposedBlueprint, FileOverride, IncludedBlueprint, Metadata,
        ParameterOverride, TemplateConfig,
    },
    common::RelativePath,
    field::{Condition, ResolvedOption, SelectOption, VarField},
    prepared::{PreparedData, SECRET_MASK, redaction_token},
    value::{Value, format_number, parse_bool},
    variable::Variable,
};

pub use error::{DomainError, ErrorCategory};

pub use value_objects::{ApiVersion, BLUEPRINT_KIND, FileOperation, IncludeStage, VariableType};

pub use validation::DomainValidator;

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn config_with(variables: Vec<Variable>) -> BlueprintConfig {
        let mut config = BlueprintConfig::new("test/blueprint", ApiVersion::V2);
        config.variables = variables;
        config
    }

    // ========================================================================
    // Value Object Tests
    // ========================================================================

    #[test]
    fn variable_type_parses_exact_names() {
        assert_eq!(
            VariableType::from_str("SecretInput").unwrap(),
            VariableType::SecretInput
        );
        assert!(VariableType::from_str("secretinput").is_err());
        assert!(VariableType::from_str("Invalid").is_err());
    }

    #[test]
    fn secret_variants() {
        assert!(VariableType::SecretFile.is_secret());
        assert!(!VariableType::Select.is_secret());
        assert_eq!(VariableType::Input.into_secret(), VariableType::SecretInput);
        assert_eq!(VariableType::Confirm.into_secret(), VariableType::Confirm);
    }

    #[test]
    fn api_version_parses_both_schemas() {
        assert_eq!(ApiVersion::from_str("xl/v1").unwrap(), ApiVersion::V1);
        assert_eq!(ApiVersion::from_str("xl/v2").unwrap(), ApiVersion::V2);
        let err = ApiVersion::from_str("xl/v3").unwrap_err();
        assert!(err.to_string().contains("api version needs to be xl/v2 or xl/v1"));
    }

    #[test]
    fn include_stage_defaults_to_after() {
        assert_eq!(IncludeStage::from_str("").unwrap(), IncludeStage::After);
        assert_eq!(IncludeStage::from_str("Before").unwrap(), IncludeStage::Before);
    }

    // ========================================================================
    // Path Tests
    // ========================================================================

    #[test]
    fn relative_path_rejects_escapes() {
        for bad in ["../x", "./x", "/etc/passwd", "..", "C:\\x"] {
            let err = RelativePath::try_new(bad, "bp").unwrap_err();
            assert!(
                matches!(err, DomainError::PathEscape { .. }),
                "{bad} should escape"
            );
        }
    }

    #[test]
    fn relative_path_rejects_empty() {
        let err = RelativePath::try_new("  ", "bp").unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn relative_path_accepts_nested() {
        let path = RelativePath::try_new("xebialabs/foo.yaml", "bp").unwrap();
        assert_eq!(path.as_str(), "xebialabs/foo.yaml");
        assert!(path.parent_is("xebialabs"));
        assert!(!path.parent_is("foo.yaml"));

        let deep = RelativePath::try_new("xebialabs/nested/foo.yaml", "bp").unwrap();
        assert!(deep.parent_is("nested"));
        assert!(!deep.parent_is("xebialabs"));
    }

    // ========================================================================
    // Validation Tests
    // ========================================================================

    #[test]
    fn duplicate_names_are_rejected() {
        let config = config_with(vec![
            Variable::new("A", VariableType::Input),
            Variable::new("A", VariableType::Confirm),
        ]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("[A] twice"));
    }

    #[test]
    fn select_needs_options() {
        let config = config_with(vec![Variable::new("Region", VariableType::Select)]);
        let err = config.validate().unwrap_err();
        assert!(
            err.to_string()
                .contains("at least one option field is need to be set for parameter [Region]")
        );

        let config = config_with(vec![
            Variable::new("Region", VariableType::Select)
                .with_options([SelectOption::new(VarField::literal("eu-west-1"))]),
        ]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn file_variable_cannot_have_value() {
        let mut var = Variable::new("Cert", VariableType::File);
        var.value = Some(VarField::literal("cert.pem"));
        let err = config_with(vec![var]).validate().unwrap_err();
        assert!(matches!(err, DomainError::Validation { .. }));
    }

    #[test]
    fn value_and_depends_on_are_exclusive_in_v2_only() {
        let var = Variable::constant("A", VarField::literal("x"))
            .with_depends_on(Condition::new(VarField::literal("B")));

        assert!(config_with(vec![var.clone()]).validate().is_err());

        let mut legacy = config_with(vec![var]);
        legacy.api_version = ApiVersion::V1;
        assert!(legacy.validate().is_ok());
    }

    #[test]
    fn kind_must_be_blueprint() {
        let mut config = config_with(vec![]);
        config.kind = "Deployment".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("kind needs to be Blueprint"));
    }

    // ========================================================================
    // Error Tests
    // ========================================================================

    #[test]
    fn resolution_context_keeps_root_cause() {
        let err = DomainError::MissingAnswer {
            variable: "Region".into(),
        }
        .within("aws/ecs", "parameter [Region]");

        assert!(matches!(err.root(), DomainError::MissingAnswer { .. }));
        assert_eq!(err.category(), ErrorCategory::Validation);
        let msg = err.to_string();
        assert!(msg.contains("aws/ecs"));
        assert!(msg.contains("Region"));
    }

    #[test]
    fn cycle_message_lists_path() {
        let err = DomainError::CompositionCycle {
            cycle: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(
            err.to_string(),
            "blueprint composition cycle detected: a -> b -> a"
        );
    }

    #[test]
    fn var_field_display_shows_tag() {
        assert_eq!(
            VarField::FunctionCall("aws.regions(ecs)[0]".into()).to_string(),
            "!fn aws.regions(ecs)[0]"
        );
        assert_eq!(VarField::literal("x").to_string(), "x");
    }
}
