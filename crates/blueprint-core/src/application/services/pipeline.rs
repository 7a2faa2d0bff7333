//! Per-blueprint data preparation.
//!
//! Every variable runs through the same ordered stages: default, `promptIf`
//! gate, constant value, answers, use-defaults, interactive input. The first
//! stage that yields a value wins.

use std::collections::BTreeMap;

use tracing::{debug, info, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::InputSource,
        services::field_resolver::{FieldResolver, Params, settle},
    },
    domain::{
        BlueprintConfig, DomainError, PreparedData, SECRET_MASK, Value, Variable, redaction_token,
    },
    error::BlueprintResult,
    functions::FunctionRegistry,
};

/// Pre-supplied answers, keyed by variable name.
pub type Answers = BTreeMap<String, String>;

/// Switches controlling how variables without a constant value are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Ask the input source for anything not otherwise resolved.
    pub interactive: bool,
    /// A variable missing from the answers map is an error instead of a prompt.
    pub strict_answers: bool,
    /// Take a non-empty default without asking.
    pub use_defaults_as_value: bool,
    /// Skip the final "proceed?" confirmation.
    pub skip_final_confirm: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            interactive: true,
            strict_answers: false,
            use_defaults_as_value: false,
            skip_final_confirm: false,
        }
    }
}

/// Runs the variable pipeline for one blueprint at a time.
#[derive(Debug, Clone, Copy)]
pub struct DataPreparer<'a> {
    registry: &'a FunctionRegistry,
    config: PipelineConfig,
    answers: Option<&'a Answers>,
}

impl<'a> DataPreparer<'a> {
    pub fn new(registry: &'a FunctionRegistry, config: PipelineConfig) -> Self {
        Self {
            registry,
            config,
            answers: None,
        }
    }

    pub fn with_answers(mut self, answers: &'a Answers) -> Self {
        self.answers = Some(answers);
        self
    }

    pub fn config(&self) -> PipelineConfig {
        self.config
    }

    pub fn registry(&self) -> &'a FunctionRegistry {
        self.registry
    }

    /// Resolve every variable of `blueprint` in declaration order.
    ///
    /// `seed` is the data already resolved by earlier blueprints; expressions
    /// see it, but the returned data only holds this blueprint's variables.
    #[instrument(skip_all, fields(blueprint = %blueprint.path, variables = blueprint.variables.len()))]
    pub fn prepare(
        &self,
        blueprint: &BlueprintConfig,
        seed: &BTreeMap<String, Value>,
        input: &mut dyn InputSource,
    ) -> BlueprintResult<PreparedData> {
        let resolver = FieldResolver::new(self.registry);
        let mut data = PreparedData::new();
        let mut params: Params = seed.clone();

        for variable in &blueprint.variables {
            let subject = format!("parameter [{}]", variable.name);
            let value = self
                .resolve_variable(&resolver, blueprint, variable, &params, input)
                .map_err(|e| match e {
                    crate::error::BlueprintError::Domain(d @ DomainError::Resolution { .. }) => d.into(),
                    crate::error::BlueprintError::Domain(d) => d.within(&blueprint.path, &subject).into(),
                    other => other,
                })?;
            store(&mut data, variable, value);
            if let Some(v) = data.template_data.get(&variable.name) {
                params.insert(variable.name.clone(), v.clone());
            }
        }

        info!(
            resolved = data.template_data.len(),
            secrets = data.secrets.len(),
            "blueprint data prepared"
        );
        Ok(data)
    }

    fn resolve_variable(
        &self,
        resolver: &FieldResolver<'_>,
        blueprint: &BlueprintConfig,
        variable: &Variable,
        params: &Params,
        input: &mut dyn InputSource,
    ) -> BlueprintResult<Value> {
        let name = &variable.name;
        let default = resolver.default_value(variable, params);

        if let Some(condition) = &variable.depends_on {
            if !resolver.condition(condition, params)? {
                debug!(variable = %name, condition = %condition, "condition false, keeping default");
                return Ok(default);
            }
        }

        if let Some(value) = resolver.constant_value(variable, params) {
            debug!(variable = %name, "using constant value");
            return Ok(value);
        }

        if let Some(answers) = self.answers {
            match answers.get(name) {
                Some(answer) => {
                    debug!(variable = %name, "using value from answers");
                    return Ok(resolver.verify_answer(variable, &Value::Str(answer.clone()), params)?);
                }
                None if self.config.strict_answers => {
                    return Err(DomainError::MissingAnswer {
                        variable: name.clone(),
                    }
                    .within(&blueprint.path, format!("parameter [{name}]"))
                    .into());
                }
                None => debug!(variable = %name, "not in answers, falling through"),
            }
        }

        if self.config.use_defaults_as_value && !default.is_empty() {
            debug!(variable = %name, "using default as value");
            return Ok(resolver.verify_answer(variable, &default, params)?);
        }

        if !self.config.interactive {
            debug!(variable = %name, "non-interactive, using default");
            return Ok(default);
        }

        let options = resolver.options(variable, params);
        let validator = |candidate: &Value| -> Result<(), String> {
            if candidate.is_empty() && !variable.is_secret() && default.is_empty() {
                return Err("Value is required".into());
            }
            let candidate = if candidate.is_empty() { &default } else { candidate };
            resolver
                .verify_answer(variable, candidate, params)
                .map(|_| ())
                .map_err(|e| e.to_string())
        };

        let answer = input.ask(variable, &default, &options, &validator)?;
        let answer = if answer.is_empty() {
            if variable.is_secret() || !default.is_empty() {
                default.clone()
            } else {
                return Err(ApplicationError::Input {
                    subject: name.clone(),
                    reason: "no value given".into(),
                }
                .into());
            }
        } else {
            answer
        };
        Ok(resolver.verify_answer(variable, &answer, params)?)
    }
}

/// Record a resolved value in the right maps.
fn store(data: &mut PreparedData, variable: &Variable, value: Value) {
    let name = variable.name.clone();
    let value = settle(value);

    if variable.is_secret() {
        data.secrets.insert(name.clone(), value.clone());
        let in_template = if variable.replace_as_is {
            value.clone()
        } else {
            Value::Str(redaction_token(&name))
        };
        let shown = if variable.reveal_on_summary {
            value
        } else {
            Value::Str(SECRET_MASK.to_owned())
        };
        data.template_data.insert(name.clone(), in_template);
        data.default_data.insert(name, shown);
        return;
    }

    if variable.save_in_values_file {
        data.values.insert(name.clone(), value.clone());
    }
    data.template_data.insert(name.clone(), value.clone());
    data.default_data.insert(name, value);
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::domain::{ApiVersion, Condition, VarField, VariableType};

    /// Replies from a queue and records what was asked.
    #[derive(Default)]
    struct Scripted {
        replies: Vec<Value>,
        asked: Vec<String>,
    }

    impl InputSource for Scripted {
        fn ask(
            &mut self,
            variable: &Variable,
            _default: &Value,
            _options: &[crate::domain::ResolvedOption],
            validator: crate::application::ports::AnswerValidator<'_>,
        ) -> BlueprintResult<Value> {
            self.asked.push(variable.name.clone());
            let reply = if self.replies.is_empty() {
                Value::Str(String::new())
            } else {
                self.replies.remove(0)
            };
            validator(&reply).map_err(|reason| ApplicationError::Input {
                subject: variable.name.clone(),
                reason,
            })?;
            Ok(reply)
        }

        fn confirm(&mut self, _summary: &PreparedData) -> BlueprintResult<bool> {
            Ok(true)
        }
    }

    fn blueprint(variables: Vec<Variable>) -> BlueprintConfig {
        let mut config = BlueprintConfig::new("test/bp", ApiVersion::V2);
        config.variables = variables;
        config
    }

    #[test]
    fn expressions_see_earlier_values() {
        let registry = FunctionRegistry::new();
        let preparer = DataPreparer::new(&registry, PipelineConfig::default());
        let bp = blueprint(vec![
            Variable::constant("Foo", VarField::literal("200")),
            Variable::constant("Bar", VarField::literal("100")),
            Variable::constant("Max", VarField::Expression("Foo > 10 ? Foo : Bar".into())),
        ]);

        let data = preparer.prepare(&bp, &BTreeMap::new(), &mut Scripted::default()).unwrap();
        assert_eq!(data.template_data["Max"], Value::from("200"));
        assert!(data.values.is_empty());
    }

    #[test]
    fn false_condition_stores_default_without_asking() {
        let registry = FunctionRegistry::new();
        let preparer = DataPreparer::new(&registry, PipelineConfig::default());
        let bp = blueprint(vec![
            Variable::constant("UseEks", VarField::literal("false")),
            Variable::new("Cluster", VariableType::Input)
                .with_default(VarField::literal("main"))
                .with_depends_on(Condition::new(VarField::literal("UseEks"))),
        ]);

        let mut input = Scripted::default();
        let data = preparer.prepare(&bp, &BTreeMap::new(), &mut input).unwrap();
        assert!(input.asked.is_empty());
        assert_eq!(data.template_data["Cluster"], Value::from("main"));
    }

    #[test]
    fn secrets_are_tokenized_and_masked() {
        let registry = FunctionRegistry::new();
        let answers: Answers = [("Password".to_owned(), "hunter2".to_owned())].into();
        let preparer = DataPreparer::new(&registry, PipelineConfig::default()).with_answers(&answers);
        let bp = blueprint(vec![Variable::new("Password", VariableType::SecretInput)]);

        let data = preparer.prepare(&bp, &BTreeMap::new(), &mut Scripted::default()).unwrap();
        assert_eq!(data.secrets["Password"], Value::from("hunter2"));
        assert_eq!(data.template_data["Password"], Value::from("!value Password"));
        assert_eq!(data.default_data["Password"], Value::from(SECRET_MASK));
    }

    #[test]
    fn replace_as_is_and_reveal() {
        let registry = FunctionRegistry::new();
        let answers: Answers = [("Token".to_owned(), "abc".to_owned())].into();
        let preparer = DataPreparer::new(&registry, PipelineConfig::default()).with_answers(&answers);
        let bp = blueprint(vec![
            Variable::new("Token", VariableType::SecretInput)
                .replaced_as_is()
                .revealed_on_summary(),
        ]);

        let data = preparer.prepare(&bp, &BTreeMap::new(), &mut Scripted::default()).unwrap();
        assert_eq!(data.template_data["Token"], Value::from("abc"));
        assert_eq!(data.default_data["Token"], Value::from("abc"));
    }

    #[test]
    fn strict_answers_reject_missing_entry() {
        let registry = FunctionRegistry::new();
        let answers = Answers::new();
        let config = PipelineConfig {
            strict_answers: true,
            ..PipelineConfig::default()
        };
        let preparer = DataPreparer::new(&registry, config).with_answers(&answers);
        let bp = blueprint(vec![Variable::new("Region", VariableType::Input)]);

        let err = preparer
            .prepare(&bp, &BTreeMap::new(), &mut Scripted::default())
            .unwrap_err();
        let domain = err.as_domain().unwrap();
        assert!(matches!(domain.root(), DomainError::MissingAnswer { .. }));
        assert!(err.to_string().contains("test/bp"));
        assert!(err.to_string().contains("parameter [Region]"));
    }

    #[test]
    fn prompt_answer_is_saved_to_values() {
        let registry = FunctionRegistry::new();
        let preparer = DataPreparer::new(&registry, PipelineConfig::default());
        let bp = blueprint(vec![
            Variable::new("AppName", VariableType::Input).saved_in_values_file(),
        ]);

        let mut input = Scripted {
            replies: vec![Value::from("shop")],
            ..Scripted::default()
        };
        let data = preparer.prepare(&bp, &BTreeMap::new(), &mut input).unwrap();
        assert_eq!(input.asked, vec!["AppName"]);
        assert_eq!(data.values["AppName"], Value::from("shop"));
    }

    #[test]
    fn empty_reply_takes_default() {
        let registry = FunctionRegistry::new();
        let preparer = DataPreparer::new(&registry, PipelineConfig::default());
        let bp = blueprint(vec![
            Variable::new("Port", VariableType::Input).with_default(VarField::literal("8080")),
        ]);

        let data = preparer.prepare(&bp, &BTreeMap::new(), &mut Scripted::default()).unwrap();
        assert_eq!(data.template_data["Port"], Value::from("8080"));
    }

    #[test]
    fn use_defaults_skips_prompt() {
        let registry = FunctionRegistry::new();
        let config = PipelineConfig {
            use_defaults_as_value: true,
            ..PipelineConfig::default()
        };
        let preparer = DataPreparer::new(&registry, config);
        let bp = blueprint(vec![
            Variable::new("Ok", VariableType::Confirm).with_default(VarField::literal("true")),
        ]);

        let mut input = Scripted::default();
        let data = preparer.prepare(&bp, &BTreeMap::new(), &mut input).unwrap();
        assert!(input.asked.is_empty());
        assert_eq!(data.template_data["Ok"], Value::Bool(true));
    }

    #[test]
    fn seed_is_visible_but_not_returned() {
        let registry = FunctionRegistry::new();
        let preparer = DataPreparer::new(&registry, PipelineConfig::default());
        let bp = blueprint(vec![Variable::constant(
            "Greeting",
            VarField::Expression("'hi ' + Name".into()),
        )]);
        let seed = [("Name".to_owned(), Value::from("ann"))].into();

        let data = preparer.prepare(&bp, &seed, &mut Scripted::default()).unwrap();
        assert_eq!(data.template_data.len(), 1);
        assert_eq!(data.template_data["Greeting"], Value::from("hi ann"));
    }
}
