//! Resolution of deferred fields in each consuming context.
//!
//! The same [`VarField`] means different things depending on where it sits:
//! a default degrades to `""` on failure, a condition must produce a bool and
//! fails hard, an option list expands function results. This module holds
//! those rules in one place.

use std::collections::BTreeMap;

use tracing::debug;

use crate::{
    domain::{
        Condition, DomainError, ResolvedOption, Value, VarField, Variable, VariableType,
        parse_bool,
    },
    expression::Evaluator,
    functions::FunctionRegistry,
};

/// Parameters visible to expressions, keyed by variable name.
pub type Params = BTreeMap<String, Value>;

#[derive(Debug, Clone, Copy)]
pub struct FieldResolver<'r> {
    registry: &'r FunctionRegistry,
}

impl<'r> FieldResolver<'r> {
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        Self { registry }
    }

    pub fn evaluator(&self) -> Evaluator<'r> {
        Evaluator::new(self.registry)
    }

    /// The variable's default. Never fails; a broken `!fn`/`!expr` degrades to
    /// empty (or `false` for Confirm).
    pub fn default_value(&self, variable: &Variable, params: &Params) -> Value {
        let confirm = variable.var_type == VariableType::Confirm;
        let empty = || {
            if confirm {
                Value::Bool(false)
            } else {
                Value::Str(String::new())
            }
        };

        let Some(field) = &variable.default else {
            return empty();
        };

        match field {
            VarField::Literal(s) if confirm => Value::Bool(parse_bool(s).unwrap_or(false)),
            VarField::Literal(s) => Value::Str(s.clone()),
            VarField::FunctionCall(raw) => match self.registry.evaluate(raw) {
                Ok(values) => {
                    let first = values.into_iter().next().unwrap_or_default();
                    if confirm {
                        Value::Bool(parse_bool(&first).unwrap_or_else(|| {
                            debug!(variable = %variable.name, call = %raw, result = %first, "default is not a bool");
                            false
                        }))
                    } else {
                        Value::Str(first)
                    }
                }
                Err(e) => {
                    debug!(variable = %variable.name, call = %raw, error = %e, "default function failed, using empty default");
                    empty()
                }
            },
            VarField::Expression(raw) => match self.evaluator().evaluate(raw, params, None, None) {
                Ok(Value::Bool(b)) => Value::Bool(b),
                Ok(other) if confirm => Value::Bool(other.as_bool().unwrap_or(false)),
                Ok(other) => settle(other),
                Err(e) => {
                    debug!(variable = %variable.name, expression = %raw, error = %e, "default expression failed, using empty default");
                    empty()
                }
            },
        }
    }

    /// The constant `value`, when it resolves to something non-empty.
    ///
    /// Failures degrade to `None` so the variable falls through to input.
    pub fn constant_value(&self, variable: &Variable, params: &Params) -> Option<Value> {
        let field = variable.value.as_ref()?;
        let confirm = variable.var_type == VariableType::Confirm;

        let resolved = match field {
            VarField::Literal(s) => Value::Str(s.clone()),
            VarField::FunctionCall(raw) => match self.registry.evaluate(raw) {
                Ok(values) => Value::Str(values.into_iter().next().unwrap_or_default()),
                Err(e) => {
                    debug!(variable = %variable.name, call = %raw, error = %e, "value function failed, value must be provided manually");
                    return None;
                }
            },
            VarField::Expression(raw) => match self.evaluator().evaluate(raw, params, None, None) {
                Ok(Value::Bool(b)) if confirm => Value::Bool(b),
                Ok(Value::Bool(b)) => Value::Str(b.to_string()),
                Ok(other) => settle(other),
                Err(e) => {
                    debug!(variable = %variable.name, expression = %raw, error = %e, "value expression failed, value must be provided manually");
                    return None;
                }
            },
        };

        if resolved.is_empty() {
            debug!(variable = %variable.name, "value resolved empty, not treated as constant");
            return None;
        }
        if confirm {
            return match resolved {
                Value::Bool(b) => Some(Value::Bool(b)),
                other => other.as_bool().map(Value::Bool).or_else(|| {
                    debug!(variable = %variable.name, value = %other, "value is not a bool");
                    None
                }),
            };
        }
        Some(resolved)
    }

    /// Select options in declaration order. A failing option source drops the
    /// whole list, matching what an author sees when a cloud lookup fails.
    pub fn options(&self, variable: &Variable, params: &Params) -> Vec<ResolvedOption> {
        let mut resolved = Vec::new();
        for option in &variable.options {
            match &option.field {
                VarField::Literal(value) => resolved.push(ResolvedOption {
                    label: option.label.clone(),
                    value: value.clone(),
                }),
                VarField::FunctionCall(raw) => match self.registry.evaluate(raw) {
                    Ok(values) => resolved.extend(values.into_iter().map(ResolvedOption::new)),
                    Err(e) => {
                        debug!(variable = %variable.name, call = %raw, error = %e, "option function failed");
                        return Vec::new();
                    }
                },
                VarField::Expression(raw) => {
                    match self.evaluator().evaluate(raw, params, None, None) {
                        Ok(Value::List(items)) => resolved
                            .extend(items.iter().map(|item| ResolvedOption::new(item.to_string()))),
                        Ok(other) => {
                            debug!(variable = %variable.name, expression = %raw, found = other.type_name(), "option expression must return a list");
                            return Vec::new();
                        }
                        Err(e) => {
                            debug!(variable = %variable.name, expression = %raw, error = %e, "option expression failed");
                            return Vec::new();
                        }
                    }
                }
            }
        }
        resolved
    }

    /// Evaluate a `promptIf`/`writeIf`/`includeIf` gate. Failures are fatal.
    ///
    /// A literal names another variable whose resolved value is read as a
    /// bool; an unknown name counts as `false`.
    pub fn condition(&self, condition: &Condition, params: &Params) -> Result<bool, DomainError> {
        let value = match &condition.field {
            VarField::FunctionCall(raw) => {
                let values = self.registry.evaluate(raw)?;
                let first = values.first().ok_or_else(|| DomainError::FunctionCall {
                    call: raw.clone(),
                    reason: "function results is empty".into(),
                })?;
                parse_bool(first).ok_or_else(|| DomainError::Type {
                    expression: raw.clone(),
                    expected: "bool",
                    found: format!("'{first}'"),
                })?
            }
            VarField::Expression(raw) => self.evaluator().evaluate_bool(raw, params, None, None)?,
            VarField::Literal(name) => match params.get(name) {
                Some(value) => value.as_bool().unwrap_or(false),
                None => parse_bool(name).unwrap_or(false),
            },
        };
        Ok(value != condition.invert)
    }

    /// Resolve a `renameTo` target.
    pub fn text(&self, field: &VarField, params: &Params) -> Result<String, DomainError> {
        match field {
            VarField::Literal(s) => Ok(s.clone()),
            VarField::FunctionCall(raw) => Ok(self
                .registry
                .evaluate(raw)?
                .into_iter()
                .next()
                .unwrap_or_default()),
            VarField::Expression(raw) => Ok(self
                .evaluator()
                .evaluate(raw, params, None, None)?
                .to_string()),
        }
    }

    /// Check an answer (from a file, a default or a prompt) and convert it to
    /// the value stored for the variable.
    pub fn verify_answer(
        &self,
        variable: &Variable,
        answer: &Value,
        params: &Params,
    ) -> Result<Value, DomainError> {
        let name = &variable.name;
        let invalid = |reason: String| DomainError::InvalidAnswer {
            variable: name.clone(),
            reason,
        };

        match variable.var_type {
            VariableType::Confirm => answer
                .as_bool()
                .map(Value::Bool)
                .ok_or_else(|| invalid(format!("[{answer}] is not a valid bool"))),
            VariableType::Select => {
                let options = self.options(variable, params);
                let text = answer.to_string();
                if options.iter().any(|o| o.value == text) {
                    Ok(Value::Str(text))
                } else {
                    let available: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
                    Err(invalid(format!(
                        "answer [{text}] is not one of the available options {available:?} for variable [{name}]"
                    )))
                }
            }
            VariableType::File | VariableType::SecretFile => {
                let path = answer.to_string();
                debug!(variable = %name, path = %path, "reading file contents for answer");
                std::fs::read_to_string(&path)
                    .map(Value::Str)
                    .map_err(|e| invalid(format!("error reading input file [{path}]: {e}")))
            }
            _ => {
                if let Some(rule) = &variable.validate {
                    let ok = self.evaluator().evaluate_bool(
                        rule.raw(),
                        params,
                        Some(name),
                        Some(answer),
                    )?;
                    if !ok {
                        return Err(invalid(format!(
                            "validation failed for field [{name}] with value [{answer}] and expression [{}]",
                            rule.raw()
                        )));
                    }
                }
                Ok(match answer {
                    Value::Bool(b) => Value::Bool(*b),
                    other => Value::Str(other.to_string()),
                })
            }
        }
    }
}

/// Prepared data holds strings and bools only.
pub(crate) fn settle(value: Value) -> Value {
    match value {
        Value::Number(_) | Value::List(_) => Value::Str(value.to_string()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{application::ports::MockFunctionProvider, functions::FnResult};

    fn aws_registry() -> FunctionRegistry {
        let mut aws = MockFunctionProvider::new();
        aws.expect_call()
            .returning(|module, _| match module {
                "regions" => Ok(FnResult::list(["eu-west-1", "us-east-1"])),
                _ => Err(DomainError::FunctionCall {
                    call: format!("aws.{module}"),
                    reason: "NoCredentialProviders".into(),
                }
                .into()),
            });
        FunctionRegistry::new().register("aws", Arc::new(aws))
    }

    fn params(pairs: &[(&str, Value)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.clone()))
            .collect()
    }

    #[test]
    fn literal_fields_ignore_params() {
        let registry = FunctionRegistry::new();
        let resolver = FieldResolver::new(&registry);
        let var = Variable::new("A", VariableType::Input).with_default(VarField::literal("x"));

        assert_eq!(resolver.default_value(&var, &Params::new()), Value::from("x"));
        assert_eq!(
            resolver.default_value(&var, &params(&[("x", Value::from("other"))])),
            Value::from("x")
        );
    }

    #[test]
    fn failed_function_default_degrades_to_empty() {
        let registry = aws_registry();
        let resolver = FieldResolver::new(&registry);
        let var = Variable::new("Key", VariableType::Input)
            .with_default(VarField::FunctionCall("aws.credentials().AccessKeyID".into()));
        assert_eq!(resolver.default_value(&var, &Params::new()), Value::from(""));
    }

    #[test]
    fn empty_confirm_default_is_false() {
        let registry = FunctionRegistry::new();
        let resolver = FieldResolver::new(&registry);
        let var = Variable::new("Ok", VariableType::Confirm);
        assert_eq!(resolver.default_value(&var, &Params::new()), Value::Bool(false));
    }

    #[test]
    fn expression_default_numbers_are_stringified() {
        let registry = FunctionRegistry::new();
        let resolver = FieldResolver::new(&registry);
        let var = Variable::new("N", VariableType::Input)
            .with_default(VarField::Expression("A * 2".into()));
        assert_eq!(
            resolver.default_value(&var, &params(&[("A", Value::from("21"))])),
            Value::from("42")
        );
    }

    #[test]
    fn function_options_expand() {
        let registry = aws_registry();
        let resolver = FieldResolver::new(&registry);
        let var = Variable::new("Region", VariableType::Select).with_options([
            crate::domain::SelectOption::new(VarField::FunctionCall("aws.regions(ecs)".into())),
            crate::domain::SelectOption::labelled("Local", "local"),
        ]);
        let options = resolver.options(&var, &Params::new());
        let values: Vec<_> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["eu-west-1", "us-east-1", "local"]);
        assert_eq!(options[2].to_string(), "Local (local)");
    }

    #[test]
    fn plain_condition_reads_named_variable() {
        let registry = FunctionRegistry::new();
        let resolver = FieldResolver::new(&registry);
        let data = params(&[("UseEks", Value::Bool(true))]);

        assert!(resolver.condition(&Condition::new(VarField::literal("UseEks")), &data).unwrap());
        assert!(!resolver.condition(&Condition::inverted(VarField::literal("UseEks")), &data).unwrap());
        assert!(!resolver.condition(&Condition::new(VarField::literal("Missing")), &data).unwrap());
    }

    #[test]
    fn failing_condition_is_fatal() {
        let registry = aws_registry();
        let resolver = FieldResolver::new(&registry);
        let cond = Condition::new(VarField::FunctionCall("aws.credentials().IsAvailable".into()));
        assert!(resolver.condition(&cond, &Params::new()).is_err());

        let cond = Condition::new(VarField::Expression("'abc'".into()));
        assert!(matches!(
            resolver.condition(&cond, &Params::new()).unwrap_err(),
            DomainError::Type { .. }
        ));
    }

    #[test]
    fn select_answer_must_be_an_option() {
        let registry = aws_registry();
        let resolver = FieldResolver::new(&registry);
        let var = Variable::new("Region", VariableType::Select).with_options([
            crate::domain::SelectOption::new(VarField::FunctionCall("aws.regions(ecs)".into())),
        ]);

        assert_eq!(
            resolver
                .verify_answer(&var, &Value::from("eu-west-1"), &Params::new())
                .unwrap(),
            Value::from("eu-west-1")
        );
        let err = resolver
            .verify_answer(&var, &Value::from("mars-1"), &Params::new())
            .unwrap_err();
        assert!(err.to_string().contains("is not one of the available options"));
    }

    #[test]
    fn validate_expression_sees_candidate() {
        let registry = FunctionRegistry::new();
        let resolver = FieldResolver::new(&registry);
        let var = Variable::new("Port", VariableType::Input)
            .with_validate(VarField::Expression("Port > 1024".into()));

        assert!(resolver.verify_answer(&var, &Value::from("8080"), &Params::new()).is_ok());
        assert!(matches!(
            resolver
                .verify_answer(&var, &Value::from("80"), &Params::new())
                .unwrap_err(),
            DomainError::InvalidAnswer { .. }
        ));
    }

    #[test]
    fn confirm_answer_must_be_bool() {
        let registry = FunctionRegistry::new();
        let resolver = FieldResolver::new(&registry);
        let var = Variable::new("Ok", VariableType::Confirm);
        assert_eq!(
            resolver.verify_answer(&var, &Value::from("true"), &Params::new()).unwrap(),
            Value::Bool(true)
        );
        assert!(resolver.verify_answer(&var, &Value::from("maybe"), &Params::new()).is_err());
    }

    #[test]
    fn file_answer_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cert.pem");
        std::fs::write(&path, "CERT").unwrap();

        let registry = FunctionRegistry::new();
        let resolver = FieldResolver::new(&registry);
        let var = Variable::new("Cert", VariableType::SecretFile);
        assert_eq!(
            resolver
                .verify_answer(&var, &Value::from(path.display().to_string()), &Params::new())
                .unwrap(),
            Value::from("CERT")
        );
    }
}
