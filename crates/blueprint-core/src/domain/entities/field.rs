//! Deferred blueprint fields.
//!
//! A [`VarField`] is written once by the schema normalizer and resolved later,
//! by whichever context consumes it (default, value, option, condition).

use std::fmt;

/// A field whose value may need evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VarField {
    /// Plain scalar. Resolves to itself regardless of parameters.
    Literal(String),
    /// `!fn domain.module(args)[index]` or `!fn domain.module(args).attr`.
    FunctionCall(String),
    /// `!expr ...` (or legacy `!expression ...`).
    Expression(String),
}

impl VarField {
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal(value.into())
    }

    /// The raw source text, whatever the tag.
    pub fn raw(&self) -> &str {
        match self {
            Self::Literal(s) | Self::FunctionCall(s) | Self::Expression(s) => s,
        }
    }

    pub fn tag(&self) -> Option<&'static str> {
        match self {
            Self::Literal(_) => None,
            Self::FunctionCall(_) => Some("!fn"),
            Self::Expression(_) => Some("!expr"),
        }
    }

    /// Literal with an empty body. Tagged fields are never "empty" before evaluation.
    pub fn is_empty_literal(&self) -> bool {
        matches!(self, Self::Literal(s) if s.is_empty())
    }
}

impl fmt::Display for VarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tag() {
            Some(tag) => write!(f, "{tag} {}", self.raw()),
            None => f.write_str(self.raw()),
        }
    }
}

/// A boolean gate: `promptIf`, `writeIf`, `includeIf` and the legacy
/// `dependsOnTrue`/`dependsOnFalse` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub field: VarField,
    /// Set by the legacy `dependsOnFalse` spelling.
    pub invert: bool,
}

impl Condition {
    pub fn new(field: VarField) -> Self {
        Self {
            field,
            invert: false,
        }
    }

    pub fn inverted(field: VarField) -> Self {
        Self {
            field,
            invert: true,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.invert {
            write!(f, "not({})", self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

/// One entry of a `Select` variable's option list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SelectOption {
    /// Display label from the `{label, value}` form.
    pub label: Option<String>,
    pub field: VarField,
}

impl SelectOption {
    pub fn new(field: VarField) -> Self {
        Self { label: None, field }
    }

    pub fn labelled(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            field: VarField::Literal(value.into()),
        }
    }
}

/// A select option after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOption {
    pub label: Option<String>,
    pub value: String,
}

impl ResolvedOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            label: None,
            value: value.into(),
        }
    }
}

impl fmt::Display for ResolvedOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{label} ({})", self.value),
            None => f.write_str(&self.value),
        }
    }
}
