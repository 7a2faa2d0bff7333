//! Answers file loading.
//!
//! An answers file is a flat YAML map from variable name to answer:
//!
//! ```yaml
//! AppName: demo
//! UseMonitoring: true
//! Replicas: 3
//! ```
//!
//! Scalars are kept as their text; the preparation pipeline coerces them to
//! each variable's type.

use std::{fs, path::Path};

use serde_yaml::{Mapping, Value as Yaml};
use tracing::{debug, instrument};

use blueprint_core::{application::{Answers, ApplicationError}, error::BlueprintResult};

#[instrument(fields(path = %path.display()))]
pub fn load_answers(path: &Path) -> BlueprintResult<Answers> {
    let subject = path.display().to_string();
    if !path.is_file() {
        return Err(ApplicationError::Input {
            subject,
            reason: "answers file not found".into(),
        }
        .into());
    }

    let content = fs::read_to_string(path).map_err(|e| ApplicationError::Input {
        subject: subject.clone(),
        reason: e.to_string(),
    })?;
    let answers = parse_answers(&content).map_err(|reason| ApplicationError::Input { subject, reason })?;

    debug!(count = answers.len(), "answers loaded");
    Ok(answers)
}

pub fn parse_answers(content: &str) -> Result<Answers, String> {
    let map: Mapping = match serde_yaml::from_str(content).map_err(|e| format!("malformed yaml: {e}"))? {
        Yaml::Mapping(map) => map,
        Yaml::Null => Mapping::new(),
        _ => return Err("answers file must be a map of parameter names to answers".into()),
    };

    let mut answers = Answers::new();
    for (key, value) in map {
        let Some(name) = scalar_text(&key) else {
            return Err("answer keys must be parameter names".into());
        };
        let answer = match &value {
            Yaml::Null => String::new(),
            other => scalar_text(other)
                .ok_or_else(|| format!("answer for [{name}] must be a scalar value"))?,
        };
        answers.insert(name, answer);
    }
    Ok(answers)
}

fn scalar_text(node: &Yaml) -> Option<String> {
    match node {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Bool(b) => Some(b.to_string()),
        Yaml::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
