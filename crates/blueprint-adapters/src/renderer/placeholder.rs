//! `{{ .Name }}` substitution renderer.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{instrument, trace};

use blueprint_core::{
    application::{ApplicationError, ports::TemplateRenderer},
    domain::PreparedData,
    error::BlueprintResult,
};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{-?\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*-?\}\}")
        .unwrap_or_else(|e| unreachable!("placeholder pattern is valid: {e}"))
});

/// Replaces `{{ .Name }}` with the template data value of `Name`.
///
/// Unknown names render as the empty string. Any other `{{ ... }}` action is
/// rejected rather than copied through half-rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderRenderer;

impl PlaceholderRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl TemplateRenderer for PlaceholderRenderer {
    #[instrument(skip_all, fields(template = %name))]
    fn render(&self, name: &str, template: &str, data: &PreparedData) -> BlueprintResult<String> {
        // Only the template text between placeholders is checked; values may
        // contain anything.
        if let Some(action) = PLACEHOLDER.split(template).find_map(unsupported_action) {
            return Err(ApplicationError::Rendering {
                path: name.to_owned(),
                reason: format!("unsupported template action near '{action}'"),
            }
            .into());
        }

        let rendered = PLACEHOLDER.replace_all(template, |caps: &Captures<'_>| {
            let key = &caps[1];
            match data.template_data.get(key) {
                Some(value) => value.to_string(),
                None => {
                    trace!(key, "placeholder has no value");
                    String::new()
                }
            }
        });
        Ok(rendered.into_owned())
    }
}

fn unsupported_action(text: &str) -> Option<String> {
    text.find("{{").map(|at| text[at..].chars().take(40).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_core::domain::Value;

    fn data() -> PreparedData {
        let mut data = PreparedData::new();
        data.template_data.insert("AppName".into(), Value::Str("demo".into()));
        data.template_data.insert("Replicas".into(), Value::Number(3.0));
        data.template_data.insert("UseTls".into(), Value::Bool(true));
        data
    }

    #[test]
    fn substitutes_values() {
        let out = PlaceholderRenderer::new()
            .render("app.yaml", "name: {{ .AppName }}\nreplicas: {{.Replicas}}\ntls: {{- .UseTls -}}", &data())
            .unwrap();
        assert_eq!(out, "name: demo\nreplicas: 3\ntls: true");
    }

    #[test]
    fn missing_key_renders_empty() {
        let out = PlaceholderRenderer::new().render("x", "[{{ .Nope }}]", &data()).unwrap();
        assert_eq!(out, "[]");
    }

    #[test]
    fn unsupported_action_fails() {
        let err = PlaceholderRenderer::new()
            .render("x", "{{ if .UseTls }}yes{{ end }}", &data())
            .unwrap_err();
        assert!(err.to_string().contains("unsupported template action"));
    }

    #[test]
    fn braces_in_values_are_kept() {
        let mut data = data();
        data.template_data
            .insert("Greeting".into(), Value::Str("hello {{name}}".into()));
        let out = PlaceholderRenderer::new()
            .render("x", "msg: {{ .Greeting }}", &data)
            .unwrap();
        assert_eq!(out, "msg: hello {{name}}");
    }

    #[test]
    fn unsupported_action_after_placeholder_fails() {
        let err = PlaceholderRenderer::new()
            .render("x", "{{ .AppName }} {{ range .Items }}", &data())
            .unwrap_err();
        assert!(err.to_string().contains("near '{{ range .Items }}'"));
    }
}
