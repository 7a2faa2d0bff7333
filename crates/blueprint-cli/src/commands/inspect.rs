//! `blueprint inspect`: show the composed include sequence of a blueprint.

use serde::Serialize;
use tracing::instrument;

use blueprint_adapters::{LocalFilesystem, LocalRepository, PlaceholderRenderer, default_registry};
use blueprint_core::{
    application::{BlueprintService, Composition},
    domain::ComposedBlueprint,
};

use crate::{
    cli::InspectArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(blueprint = %args.blueprint))]
pub fn execute(args: InspectArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let root = config.repository_root(args.repository.repository.as_deref());
    if !root.is_dir() {
        return Err(CliError::RepositoryNotFound { path: root });
    }

    let service = BlueprintService::new(
        Box::new(LocalRepository::new(&root)),
        Box::new(PlaceholderRenderer::new()),
        Box::new(LocalFilesystem::new()),
        default_registry(),
    );
    let composition = service.inspect(&args.blueprint)?;
    let entries = entries(&composition);

    if output.is_json() {
        output.json(&entries)?;
        return Ok(());
    }

    output.header(&format!("Composition of '{}'", args.blueprint))?;
    let rows: Vec<Vec<String>> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| {
            vec![
                (i + 1).to_string(),
                e.path.clone(),
                e.stage.unwrap_or("root").to_owned(),
                e.parameters.to_string(),
                e.files.to_string(),
                if e.conditions.is_empty() {
                    "-".to_owned()
                } else {
                    e.conditions.join(" && ")
                },
            ]
        })
        .collect();
    output.table(
        &["#", "BLUEPRINT", "STAGE", "PARAMETERS", "FILES", "CONDITIONS"],
        &rows,
    )?;
    output.print("")?;
    output.info(&format!(
        "{} parameters and {} files after merging",
        composition.merged.variables.len(),
        composition.merged.template_configs.len()
    ))?;
    Ok(())
}

/// One composed blueprint as shown by `inspect`.
#[derive(Debug, Serialize)]
struct InspectEntry {
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<&'static str>,
    conditions: Vec<String>,
    parameters: usize,
    files: usize,
}

impl From<&ComposedBlueprint> for InspectEntry {
    fn from(entry: &ComposedBlueprint) -> Self {
        Self {
            path: entry.path.clone(),
            parent: entry.parent.clone(),
            stage: entry.stage.map(|s| s.as_str()),
            conditions: entry.conditions.iter().map(ToString::to_string).collect(),
            parameters: entry.config.variables.len(),
            files: entry.config.template_configs.len(),
        }
    }
}

fn entries(composition: &Composition) -> Vec<InspectEntry> {
    composition.entries.iter().map(InspectEntry::from).collect()
}
