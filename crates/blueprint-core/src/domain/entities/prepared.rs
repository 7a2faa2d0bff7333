use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::entities::value::Value;

/// Shown on summaries in place of a secret value.
pub const SECRET_MASK: &str = "*****";

/// Placeholder injected into template data for a tokenized secret.
pub fn redaction_token(name: &str) -> String {
    format!("!value {name}")
}

/// Resolved parameter data, keyed by variable name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PreparedData {
    /// Every resolved value; secrets tokenized unless `replaceAsIs`.
    pub template_data: BTreeMap<String, Value>,
    /// Display values for the summary; secrets masked unless `revealOnSummary`.
    pub default_data: BTreeMap<String, Value>,
    /// Non-secret values flagged for the values file.
    pub values: BTreeMap<String, Value>,
    /// Raw secret values for the secrets file.
    pub secrets: BTreeMap<String, Value>,
}

impl PreparedData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Key-by-key merge; entries from `other` win.
    pub fn merge(&mut self, other: PreparedData) {
        self.template_data.extend(other.template_data);
        self.default_data.extend(other.default_data);
        self.values.extend(other.values);
        self.secrets.extend(other.secrets);
    }

    pub fn is_empty(&self) -> bool {
        self.template_data.is_empty()
            && self.default_data.is_empty()
            && self.values.is_empty()
            && self.secrets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_merge_wins() {
        let mut base = PreparedData::new();
        base.template_data.insert("A".into(), Value::from("one"));
        base.values.insert("A".into(), Value::from("one"));

        let mut next = PreparedData::new();
        next.template_data.insert("A".into(), Value::from("two"));
        next.secrets.insert("S".into(), Value::from("pw"));

        base.merge(next);

        assert_eq!(base.template_data["A"], Value::from("two"));
        assert_eq!(base.values["A"], Value::from("one"));
        assert_eq!(base.secrets["S"], Value::from("pw"));
    }

    #[test]
    fn redaction_token_format() {
        assert_eq!(redaction_token("Password"), "!value Password");
    }
}
