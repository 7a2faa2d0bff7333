//! `blueprint`: generate project files from a repository of blueprints.
//!
//! Every failure ends up in [`report`], which prints it and maps its
//! category to the process exit code:
//!
//! | Code | Category            |
//! |------|---------------------|
//! |  0   | success             |
//! |  1   | internal            |
//! |  2   | user input          |
//! |  3   | not found           |
//! |  4   | configuration       |

use std::io::IsTerminal as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, Commands, GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
mod prompt;

fn main() -> ExitCode {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();

    let Cli { global, command } = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            eprintln!("{}", e.render().ansi());
            return ExitCode::from(2);
        }
        // --help and --version
        Err(e) => {
            print!("{}", e.render().ansi());
            return ExitCode::SUCCESS;
        }
    };

    if let Err(e) = init_logging(&global) {
        eprintln!("Failed to initialise logging: {e:#}");
        return ExitCode::from(1);
    }
    debug!(?global, "arguments parsed");

    let config = match AppConfig::load(global.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            let err = CliError::ConfigError {
                message: format!("{e:#}"),
                source: None,
            };
            return report(&err, global.is_verbose());
        }
    };
    let output = OutputManager::new(&global, &config);

    let verbose = global.is_verbose();
    match run(command, global, config, output) {
        Ok(()) => {
            info!("done");
            ExitCode::SUCCESS
        }
        Err(e) => report(&e, verbose),
    }
}

#[instrument(skip_all)]
fn run(
    command: Commands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    match command {
        Commands::Generate(args) => commands::generate::execute(args, global, config, output),
        Commands::Inspect(args) => commands::inspect::execute(args, config, output),
        Commands::List(args) => commands::list::execute(args, config, output),
        Commands::Completions(args) => commands::completions::execute(args),
        Commands::Config(args) => {
            commands::config::execute(args, global.config.as_deref(), config, output)
        }
    }
}

/// Log, print to stderr, and turn the error into an exit code.
fn report(err: &CliError, verbose: bool) -> ExitCode {
    err.log();
    let message = if std::io::stderr().is_terminal() {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{message}");
    ExitCode::from(err.exit_code())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn metadata_comes_from_cargo() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_version(), Some(env!("CARGO_PKG_VERSION")));
        assert!(cmd.get_author().is_some());
    }
}
