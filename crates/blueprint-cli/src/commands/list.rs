//! Implementation of the `blueprint list` command.

use tracing::{debug, instrument};

use blueprint_adapters::LocalRepository;

use crate::{
    cli::ListArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all)]
pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let root = config.repository_root(args.repository.repository.as_deref());
    if !root.is_dir() {
        return Err(CliError::RepositoryNotFound { path: root });
    }

    let repository = LocalRepository::new(&root);
    let blueprints = repository.list()?;
    debug!(root = %repository.root().display(), count = blueprints.len(), "Blueprints listed");

    // JSON goes to stdout even in quiet mode so pipes stay parseable.
    if output.is_json() {
        output.json(&blueprints)?;
        return Ok(());
    }

    if blueprints.is_empty() {
        output.warning(&format!("No blueprints found under {}", root.display()))?;
        return Ok(());
    }

    output.header(&format!("Blueprints in {}:", root.display()))?;
    let rows: Vec<Vec<String>> = blueprints
        .iter()
        .map(|b| {
            let mut description = b.description.lines().next().unwrap_or_default().to_owned();
            if description.is_empty() {
                description = "-".into();
            }
            vec![b.path.clone(), b.name.clone(), b.api_version.clone(), description]
        })
        .collect();
    output.table(&["PATH", "NAME", "API", "DESCRIPTION"], &rows)?;
    Ok(())
}
