//! `blueprint config`: show, locate or initialise the configuration file.

use std::path::Path;

use crate::{
    cli::ConfigArgs,
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the requested config action. `--show` is the default.
pub fn execute(
    args: ConfigArgs,
    config_file: Option<&Path>,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let path = config_file
        .map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path);

    if args.path {
        output.print(&path.display().to_string())?;
        return Ok(());
    }

    if args.init {
        return init(&path, args.force, &output);
    }

    if output.is_json() {
        output.json(&config)?;
        return Ok(());
    }
    output.header("Current Configuration:")?;
    output.print(&to_toml(&config)?)?;
    Ok(())
}

fn init(path: &Path, force: bool, output: &OutputManager) -> CliResult<()> {
    if path.exists() && !force {
        output.warning(&format!(
            "Config already exists at {}  (use --force to overwrite)",
            path.display(),
        ))?;
        return Ok(());
    }

    let toml = to_toml(&AppConfig::default())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_cli_context(|| {
            format!("Failed to create config directory '{}'", parent.display())
        })?;
    }
    std::fs::write(path, toml)
        .with_cli_context(|| format!("Failed to write config to '{}'", path.display()))?;

    output.success(&format!("Configuration created at {}", path.display()))?;
    Ok(())
}

fn to_toml(config: &AppConfig) -> CliResult<String> {
    toml::to_string_pretty(config).map_err(|e| CliError::ConfigError {
        message: format!("Failed to serialise config: {e}"),
        source: Some(Box::new(e)),
    })
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{GlobalArgs, OutputFormat};

    fn quiet_output() -> OutputManager {
        let args = GlobalArgs {
            verbose: 0,
            quiet: true,
            no_color: true,
            config: None,
            output_format: OutputFormat::Plain,
        };
        OutputManager::new(&args, &AppConfig::default())
    }

    #[test]
    fn init_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        init(&path, false, &quiet_output()).unwrap();

        let loaded = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(loaded.output, AppConfig::default().output);
        assert_eq!(loaded.generate, AppConfig::default().generate);
    }

    #[test]
    fn init_keeps_existing_file_without_force() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "repository = \"/mine\"\n").unwrap();

        init(&path, false, &quiet_output()).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "repository = \"/mine\"\n");

        init(&path, true, &quiet_output()).unwrap();
        assert!(!std::fs::read_to_string(&path).unwrap().contains("/mine"));
    }

    #[test]
    fn toml_round_trips_repository() {
        let config = AppConfig {
            repository: Some("/srv/blueprints".into()),
            ..AppConfig::default()
        };
        assert!(to_toml(&config).unwrap().contains("repository = \"/srv/blueprints\""));
    }
}
