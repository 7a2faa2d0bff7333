//! Terminal implementations of the `InputSource` port.
//!
//! [`TerminalInput`] asks through `dialoguer` and is only compiled with the
//! `interactive` feature. [`NonInteractive`] refuses to ask and is used for
//! piped runs and builds without the feature.

use blueprint_core::{
    application::{AnswerValidator, ApplicationError, InputSource},
    domain::{PreparedData, ResolvedOption, Value, Variable},
    error::BlueprintResult,
};

/// Input source for runs that must never block on a prompt.
#[derive(Debug, Default)]
pub struct NonInteractive;

impl InputSource for NonInteractive {
    fn ask(
        &mut self,
        variable: &Variable,
        _default: &Value,
        _options: &[ResolvedOption],
        _validator: AnswerValidator<'_>,
    ) -> BlueprintResult<Value> {
        Err(ApplicationError::Input {
            subject: variable.name.clone(),
            reason: "a value is needed but prompting is disabled".into(),
        }
        .into())
    }

    fn confirm(&mut self, _summary: &PreparedData) -> BlueprintResult<bool> {
        Ok(true)
    }
}

/// Summary lines shown before the final confirmation.
pub fn summary_rows(summary: &PreparedData) -> Vec<Vec<String>> {
    summary
        .default_data
        .iter()
        .map(|(name, value)| vec![name.clone(), value.to_string()])
        .collect()
}

#[cfg(feature = "interactive")]
pub use terminal::TerminalInput;

#[cfg(feature = "interactive")]
mod terminal {
    use std::io;

    use console::Term;
    use dialoguer::{Confirm, Editor, FuzzySelect, Input, Password, theme::ColorfulTheme};
    use owo_colors::OwoColorize;
    use tracing::debug;

    use blueprint_core::{
        application::{AnswerValidator, ApplicationError, InputSource},
        domain::{PreparedData, ResolvedOption, Value, Variable, VariableType},
        error::BlueprintResult,
    };

    use super::summary_rows;

    /// Asks on the terminal, picking a control from the variable type.
    pub struct TerminalInput {
        theme: ColorfulTheme,
        term: Term,
        no_color: bool,
    }

    impl TerminalInput {
        pub fn new(no_color: bool) -> Self {
            Self {
                theme: ColorfulTheme::default(),
                term: Term::stderr(),
                no_color,
            }
        }

        fn read(
            &self,
            variable: &Variable,
            default: &Value,
            options: &[ResolvedOption],
        ) -> Result<Value, dialoguer::Error> {
            let question = variable.question();
            let default_text = default.to_string();

            match variable.var_type {
                VariableType::Confirm => Confirm::with_theme(&self.theme)
                    .with_prompt(question)
                    .default(default.as_bool().unwrap_or(false))
                    .interact()
                    .map(Value::Bool),

                VariableType::Select => {
                    let labels: Vec<String> = options.iter().map(ToString::to_string).collect();
                    let start = options
                        .iter()
                        .position(|o| o.value == default_text)
                        .unwrap_or(0);
                    let picked = FuzzySelect::with_theme(&self.theme)
                        .with_prompt(question)
                        .items(&labels)
                        .default(start)
                        .interact()?;
                    Ok(Value::Str(
                        options.get(picked).map(|o| o.value.clone()).unwrap_or_default(),
                    ))
                }

                VariableType::SecretInput => Password::with_theme(&self.theme)
                    .with_prompt(question)
                    .allow_empty_password(true)
                    .interact()
                    .map(Value::Str),

                VariableType::Editor | VariableType::SecretEditor => {
                    self.term.write_line(&format!("{question} (opening editor)"))?;
                    let edited = Editor::new().edit(&default_text)?;
                    Ok(Value::Str(edited.unwrap_or_default()))
                }

                // File types answer with a path; the contents are read on verification.
                VariableType::Input | VariableType::File | VariableType::SecretFile => {
                    let mut input = Input::<String>::with_theme(&self.theme)
                        .with_prompt(question)
                        .allow_empty(true);
                    if !default.is_empty() && !variable.is_secret() {
                        input = input.default(default_text);
                    }
                    input.interact_text().map(Value::Str)
                }
            }
        }

        fn reject(&self, reason: &str) -> io::Result<()> {
            let line = if self.no_color {
                format!("\u{2717} {reason}")
            } else {
                format!("{} {}", "\u{2717}".red().bold(), reason.red())
            };
            self.term.write_line(&line)
        }
    }

    /// Ctrl-C cancels; any other terminal failure is an input error.
    fn prompt_failed(subject: &str, err: dialoguer::Error) -> ApplicationError {
        let err = io::Error::from(err);
        if err.kind() == io::ErrorKind::Interrupted {
            return ApplicationError::Cancelled;
        }
        ApplicationError::Input {
            subject: subject.to_owned(),
            reason: err.to_string(),
        }
    }

    impl InputSource for TerminalInput {
        fn ask(
            &mut self,
            variable: &Variable,
            default: &Value,
            options: &[ResolvedOption],
            validator: AnswerValidator<'_>,
        ) -> BlueprintResult<Value> {
            if !variable.description.is_empty() {
                let _ = self.term.write_line(&variable.description);
            }
            loop {
                let answer = self
                    .read(variable, default, options)
                    .map_err(|e| prompt_failed(&variable.name, e))?;
                match validator(&answer) {
                    Ok(()) => return Ok(answer),
                    Err(reason) => {
                        debug!(variable = %variable.name, %reason, "answer rejected");
                        self.reject(&reason).map_err(|e| ApplicationError::Input {
                            subject: variable.name.clone(),
                            reason: e.to_string(),
                        })?;
                    }
                }
            }
        }

        fn confirm(&mut self, summary: &PreparedData) -> BlueprintResult<bool> {
            let rows = summary_rows(summary);
            let width = rows.iter().map(|r| r[0].len()).max().unwrap_or(0);

            let mut lines = vec![String::new(), "Summary".to_owned()];
            lines.extend(
                rows.iter()
                    .map(|r| format!("  {:<width$}  {}", r[0], r[1], width = width)),
            );
            lines.push(String::new());
            for line in &lines {
                self.term
                    .write_line(line)
                    .map_err(|e| ApplicationError::Input {
                        subject: "summary".into(),
                        reason: e.to_string(),
                    })?;
            }

            Confirm::with_theme(&self.theme)
                .with_prompt("Confirm to generate blueprint files?")
                .default(true)
                .interact()
                .map_err(|e| prompt_failed("confirmation", e).into())
        }
    }
}
