use crate::domain::{
    entities::field::{Condition, SelectOption, VarField},
    value_objects::VariableType,
};

/// One input parameter of a blueprint, in canonical form.
///
/// Both schema versions normalize into this shape. Construction goes through
/// [`Variable::new`] (prompted) or [`Variable::constant`] (value-only) and the
/// `with_*` methods.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: String,
    pub var_type: VariableType,
    pub label: String,
    pub prompt: String,
    pub description: String,
    pub default: Option<VarField>,
    /// A non-empty resolved value turns the variable into a constant.
    pub value: Option<VarField>,
    pub depends_on: Option<Condition>,
    pub options: Vec<SelectOption>,
    /// Expression that must evaluate to `true` for an answer to be accepted.
    pub validate: Option<VarField>,
    pub save_in_values_file: bool,
    pub replace_as_is: bool,
    pub reveal_on_summary: bool,
}

impl Variable {
    /// A prompted variable. The label defaults to the name.
    pub fn new(name: impl Into<String>, var_type: VariableType) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            var_type,
            prompt: String::new(),
            description: String::new(),
            default: None,
            value: None,
            depends_on: None,
            options: Vec::new(),
            validate: None,
            save_in_values_file: false,
            replace_as_is: false,
            reveal_on_summary: false,
        }
    }

    /// A value-only variable. Never prompted.
    pub fn constant(name: impl Into<String>, value: VarField) -> Self {
        Self::new(name, VariableType::Input).with_value(value)
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: VarField) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_value(mut self, value: VarField) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_depends_on(mut self, condition: Condition) -> Self {
        self.depends_on = Some(condition);
        self
    }

    pub fn with_options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options = options.into_iter().collect();
        self
    }

    pub fn with_validate(mut self, expression: VarField) -> Self {
        self.validate = Some(expression);
        self
    }

    pub fn saved_in_values_file(mut self) -> Self {
        self.save_in_values_file = true;
        self
    }

    pub fn replaced_as_is(mut self) -> Self {
        self.replace_as_is = true;
        self
    }

    pub fn revealed_on_summary(mut self) -> Self {
        self.reveal_on_summary = true;
        self
    }

    pub fn is_secret(&self) -> bool {
        self.var_type.is_secret()
    }

    /// Text shown when asking for this variable.
    pub fn question(&self) -> &str {
        if self.prompt.is_empty() {
            &self.label
        } else {
            &self.prompt
        }
    }
}
