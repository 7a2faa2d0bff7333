//! Implementation of the `blueprint generate` command.
//!
//! Responsibility: translate CLI arguments into a `GenerateRequest`, pick an
//! input source, call the core service, and display results. No business
//! logic lives here.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use blueprint_adapters::{
    LocalFilesystem, LocalRepository, PlaceholderRenderer, default_registry, load_answers,
};
use blueprint_core::{
    application::{
        ApplicationError, BlueprintService, GenerateReport, GenerateRequest, InputSource,
        PipelineConfig, services::display_path,
    },
    domain::Value,
    error::BlueprintError,
};

use crate::{
    cli::{GenerateArgs, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    prompt::{NonInteractive, summary_rows},
};

/// Execute the `blueprint generate` command.
///
/// Dispatch sequence:
/// 1. Resolve the repository and output directories
/// 2. Load the answers file, if any
/// 3. Decide whether prompting is possible
/// 4. Run the core service
/// 5. Print the summary and the written files
#[instrument(skip_all, fields(blueprint = %args.blueprint))]
pub fn execute(
    args: GenerateArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    // 1. Directories
    let root = config.repository_root(args.repository.repository.as_deref());
    if !root.is_dir() {
        return Err(CliError::RepositoryNotFound { path: root });
    }
    let output_dir = config.output_dir(args.output.as_deref());
    if output_dir.is_file() {
        return Err(CliError::InvalidInput {
            message: format!("output path '{}' is a file", output_dir.display()),
            source: None,
        });
    }

    // 2. Answers
    let answers = match &args.answers {
        Some(path) => {
            let answers = load_answers(path)?;
            debug!(path = %path.display(), count = answers.len(), "Answers loaded");
            Some(answers)
        }
        None => None,
    };

    // 3. Prompting
    let use_defaults = args.use_defaults || config.generate.use_defaults;
    let can_prompt =
        prompting_available() && std::io::stdin().is_terminal() && !args.strict_answers;
    if !prompting_available() && answers.is_none() && !use_defaults {
        return Err(CliError::FeatureNotAvailable {
            feature: "interactive",
        });
    }
    if !can_prompt && !args.strict_answers && !use_defaults {
        warn!("No terminal for prompts, unanswered parameters fall back to their defaults");
    }

    let mut request = GenerateRequest::new(&output_dir);
    request.answers = answers;
    request.force = args.force;
    request.dry_run = args.dry_run;
    request.pipeline = PipelineConfig {
        interactive: can_prompt,
        strict_answers: args.strict_answers,
        use_defaults_as_value: use_defaults,
        skip_final_confirm: args.yes || args.strict_answers || global.quiet,
    };
    debug!(?request.pipeline, output = %output_dir.display(), "Request built");

    // 4. Generate
    let service = BlueprintService::new(
        Box::new(LocalRepository::new(&root)),
        Box::new(PlaceholderRenderer::new()),
        Box::new(LocalFilesystem::new()),
        default_registry(),
    );
    let mut input = input_source(can_prompt, !output.supports_color());

    let progress =
        (!can_prompt && !global.quiet && !output.is_json()).then(|| spinner(&args.blueprint));
    let result = service.generate(&args.blueprint, &request, input.as_mut());
    if let Some(progress) = progress {
        progress.finish_and_clear();
    }
    let report = result.map_err(|e| match e {
        BlueprintError::Application(ApplicationError::Cancelled) => CliError::Cancelled,
        other => CliError::Core(other),
    })?;
    info!(files = report.files.len(), written = report.written, "Generate finished");

    // 5. Report
    if output.is_json() {
        output.json(&GenerateOutput::new(&args.blueprint, &output_dir, &report))?;
        return Ok(());
    }
    print_report(&output, &output_dir, &report, !can_prompt)
}

fn print_report(
    output: &OutputManager,
    output_dir: &Path,
    report: &GenerateReport,
    show_summary: bool,
) -> CliResult<()> {
    if show_summary && !report.prepared.data.default_data.is_empty() {
        output.header("Summary")?;
        output.table(&["PARAMETER", "VALUE"], &summary_rows(&report.prepared.data))?;
        output.print("")?;
    }

    for skipped in &report.prepared.skipped {
        output.info(&format!("Skipped '{skipped}': include condition not met"))?;
    }

    if report.written {
        output.success(&format!(
            "Generated {} files in {}",
            report.files.len(),
            output_dir.display()
        ))?;
    } else {
        output.info(&format!(
            "Dry run: would write {} files to {}",
            report.files.len(),
            output_dir.display()
        ))?;
    }
    for file in &report.files {
        output.print(&format!("  {}", display_path(output_dir, &file.path)))?;
    }

    let instructions = report.prepared.config.metadata.instructions.trim();
    if report.written && !instructions.is_empty() {
        output.print("")?;
        output.print(instructions)?;
    }
    Ok(())
}

/// Machine-readable result of `generate --output-format json`.
#[derive(Debug, Serialize)]
struct GenerateOutput<'a> {
    blueprint: &'a str,
    output_dir: String,
    written: bool,
    files: Vec<String>,
    skipped: &'a [String],
    summary: &'a BTreeMap<String, Value>,
}

impl<'a> GenerateOutput<'a> {
    fn new(blueprint: &'a str, output_dir: &Path, report: &'a GenerateReport) -> Self {
        Self {
            blueprint,
            output_dir: output_dir.display().to_string(),
            written: report.written,
            files: report
                .files
                .iter()
                .map(|f| display_path(output_dir, &f.path))
                .collect(),
            skipped: &report.prepared.skipped,
            summary: &report.prepared.data.default_data,
        }
    }
}

fn spinner(blueprint: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(format!("Generating {blueprint}..."));
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

const fn prompting_available() -> bool {
    cfg!(feature = "interactive")
}

#[cfg(feature = "interactive")]
fn input_source(can_prompt: bool, no_color: bool) -> Box<dyn InputSource> {
    if can_prompt {
        Box::new(crate::prompt::TerminalInput::new(no_color))
    } else {
        Box::new(NonInteractive)
    }
}

#[cfg(not(feature = "interactive"))]
fn input_source(_can_prompt: bool, _no_color: bool) -> Box<dyn InputSource> {
    Box::new(NonInteractive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use blueprint_core::{
        application::{PreparedComposition, services::GeneratedFile},
        domain::{ApiVersion, BlueprintConfig, PreparedData},
    };

    fn report() -> GenerateReport {
        let mut data = PreparedData::new();
        data.default_data.insert("AppName".into(), Value::Str("shop".into()));
        data.default_data.insert("DbPassword".into(), Value::Str("*****".into()));
        GenerateReport {
            prepared: PreparedComposition {
                data,
                config: BlueprintConfig::new("web", ApiVersion::V2),
                skipped: vec!["common/monitoring".into()],
            },
            files: vec![
                GeneratedFile {
                    path: PathBuf::from("/out/app.yaml"),
                    content: "name: shop".into(),
                },
                GeneratedFile {
                    path: PathBuf::from("/out/xebialabs/values.xlvals"),
                    content: String::new(),
                },
            ],
            written: false,
        }
    }

    #[test]
    fn json_output_uses_relative_paths() {
        let report = report();
        let json =
            serde_json::to_value(GenerateOutput::new("web", Path::new("/out"), &report)).unwrap();

        assert_eq!(json["blueprint"], "web");
        assert_eq!(json["written"], false);
        assert_eq!(json["files"][0], "app.yaml");
        assert_eq!(json["files"][1], "xebialabs/values.xlvals");
        assert_eq!(json["skipped"][0], "common/monitoring");
        assert_eq!(json["summary"]["DbPassword"], "*****");
    }

    #[test]
    fn non_interactive_source_when_prompting_is_off() {
        let mut input = input_source(false, true);
        assert!(input.confirm(&PreparedData::new()).unwrap());
    }
}
