//! Raw YAML scalars and tagged nodes to [`VarField`]s.

use serde_yaml::Value as Yaml;

use blueprint_core::domain::{Condition, SelectOption, VarField, parse_bool};

/// Tag spellings accepted by one schema version.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Tags {
    pub function: &'static str,
    pub expression: &'static str,
}

pub(crate) const V1_TAGS: Tags = Tags {
    function: "fn",
    expression: "expression",
};

pub(crate) const V2_TAGS: Tags = Tags {
    function: "fn",
    expression: "expr",
};

/// Scalar text of a YAML node. Floats keep six decimals.
pub(crate) fn scalar(node: &Yaml) -> Option<String> {
    match node {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Number(n) if n.is_f64() => n.as_f64().map(|f| format!("{f:.6}")),
        Yaml::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// `None` for an absent/null node, an error for an unsupported one.
pub(crate) fn var_field(node: Option<&Yaml>, tags: Tags) -> Result<Option<VarField>, String> {
    let Some(node) = node else {
        return Ok(None);
    };
    match node {
        Yaml::Null => Ok(None),
        Yaml::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let tag = tag.trim_start_matches('!');
            let body = scalar(&tagged.value).unwrap_or_default();
            if tag == tags.function {
                Ok(Some(VarField::FunctionCall(body)))
            } else if tag == tags.expression {
                Ok(Some(VarField::Expression(body)))
            } else {
                Err(format!(
                    "unknown tag !{tag} {body}, supported tags are [!{}, !{}]",
                    tags.expression, tags.function
                ))
            }
        }
        other => scalar(other)
            .map(|s| Some(VarField::Literal(s)))
            .ok_or_else(|| format!("unknown variable type [{}]", describe(other))),
    }
}

pub(crate) fn text(node: Option<&Yaml>) -> Result<String, String> {
    match node {
        None | Some(Yaml::Null) => Ok(String::new()),
        Some(other) => scalar(other).ok_or_else(|| format!("expected a string, got {}", describe(other))),
    }
}

/// A flag given as a YAML bool or a bool-looking string.
pub(crate) fn flag(node: Option<&Yaml>) -> bool {
    match node {
        Some(Yaml::Bool(b)) => *b,
        Some(Yaml::String(s)) => parse_bool(s).unwrap_or(false),
        _ => false,
    }
}

pub(crate) fn condition(node: Option<&Yaml>, tags: Tags, invert: bool) -> Result<Option<Condition>, String> {
    Ok(var_field(node, tags)?.map(|field| Condition { field, invert }))
}

/// One `options` entry: a scalar, a tagged node or a `{label, value}` map.
pub(crate) fn option(node: &Yaml, tags: Tags) -> Result<SelectOption, String> {
    match node {
        Yaml::Mapping(map) => {
            let label = match map.get("label") {
                Some(Yaml::String(l)) => l.clone(),
                other => return Err(format!("unknown list item type {}", other.map(describe).unwrap_or("null"))),
            };
            let value = map
                .get("value")
                .and_then(scalar)
                .ok_or_else(|| format!("unknown list item type for option [{label}]"))?;
            Ok(SelectOption::labelled(label, value))
        }
        Yaml::Sequence(_) | Yaml::Null => Err(format!("unknown list item type {}", describe(node))),
        other => var_field(Some(other), tags)?
            .map(SelectOption::new)
            .ok_or_else(|| "unknown list item type null".to_owned()),
    }
}

fn describe(node: &Yaml) -> &'static str {
    match node {
        Yaml::Null => "null",
        Yaml::Bool(_) => "bool",
        Yaml::Number(_) => "number",
        Yaml::String(_) => "string",
        Yaml::Sequence(_) => "list",
        Yaml::Mapping(_) => "map",
        Yaml::Tagged(_) => "tagged value",
    }
}
