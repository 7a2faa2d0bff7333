//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "blueprint",
    bin_name = "blueprint",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Resolve, compose and generate blueprints",
    long_about = "blueprint resolves a blueprint definition from a repository, \
                  composes it with everything it includes, asks for the missing \
                  values and writes the resulting project files.",
    after_help = "EXAMPLES:\n\
        \x20 blueprint generate aws/basic -r ./blueprints\n\
        \x20 blueprint generate aws/basic -a answers.yaml --strict-answers -o ./out\n\
        \x20 blueprint inspect aws/basic --output-format json\n\
        \x20 blueprint completions bash > /usr/share/bash-completion/completions/blueprint",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a project from a blueprint.
    #[command(
        visible_alias = "g",
        about = "Generate files from a blueprint",
        after_help = "EXAMPLES:\n\
            \x20 blueprint generate aws/basic\n\
            \x20 blueprint generate aws/basic -a answers.yaml -s -o ./out\n\
            \x20 blueprint generate aws/basic -d --dry-run"
    )]
    Generate(GenerateArgs),

    /// Show the composed include sequence of a blueprint.
    #[command(
        about = "Show how a blueprint composes",
        after_help = "EXAMPLES:\n\
            \x20 blueprint inspect aws/basic\n\
            \x20 blueprint inspect aws/basic --output-format json"
    )]
    Inspect(InspectArgs),

    /// List blueprints in a repository.
    #[command(
        visible_alias = "ls",
        about = "List available blueprints",
        after_help = "EXAMPLES:\n\
            \x20 blueprint list\n\
            \x20 blueprint list -r ./blueprints --output-format json"
    )]
    List(ListArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 blueprint completions bash > ~/.local/share/bash-completion/completions/blueprint\n\
            \x20 blueprint completions zsh  > ~/.zfunc/_blueprint\n\
            \x20 blueprint completions fish > ~/.config/fish/completions/blueprint.fish"
    )]
    Completions(CompletionsArgs),

    /// Show, locate or initialise the configuration file.
    #[command(
        about = "Configuration management",
        after_help = "EXAMPLES:\n\
            \x20 blueprint config --show\n\
            \x20 blueprint config --path\n\
            \x20 blueprint config --init"
    )]
    Config(ConfigArgs),
}

// ── shared ────────────────────────────────────────────────────────────────────

/// Where blueprints are looked up.
#[derive(Debug, Clone, Args)]
pub struct RepositoryArgs {
    /// Repository root directory.
    #[arg(
        short = 'r',
        long = "repository",
        value_name = "DIR",
        env = "BLUEPRINT_REPOSITORY",
        help = "Blueprint repository root (default: from config, else current directory)"
    )]
    pub repository: Option<PathBuf>,
}

// ── generate ──────────────────────────────────────────────────────────────────

/// Arguments for `blueprint generate`.
#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Repository path of the blueprint, e.g. `aws/basic`.
    #[arg(value_name = "BLUEPRINT", help = "Blueprint path inside the repository")]
    pub blueprint: String,

    #[command(flatten)]
    pub repository: RepositoryArgs,

    /// YAML map of answers used instead of prompting.
    #[arg(
        short = 'a',
        long = "answers",
        value_name = "FILE",
        help = "Answers file used instead of asking questions"
    )]
    pub answers: Option<PathBuf>,

    /// A parameter missing from the answers file is an error.
    #[arg(
        short = 's',
        long = "strict-answers",
        requires = "answers",
        help = "Fail when an answer is missing instead of asking"
    )]
    pub strict_answers: bool,

    /// Accept every non-empty default without asking.
    #[arg(short = 'd', long = "use-defaults", help = "Use default values without asking")]
    pub use_defaults: bool,

    /// Output directory.
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        help = "Output directory (default: from config, else current directory)"
    )]
    pub output: Option<PathBuf>,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip the final confirmation")]
    pub yes: bool,

    /// Overwrite existing files (destructive).
    #[arg(long = "force", help = "Overwrite existing files")]
    pub force: bool,

    /// Resolve and render without writing any files.
    #[arg(long = "dry-run", help = "Show what would be generated without writing")]
    pub dry_run: bool,
}

// ── inspect ───────────────────────────────────────────────────────────────────

/// Arguments for `blueprint inspect`.
#[derive(Debug, Args)]
pub struct InspectArgs {
    #[arg(value_name = "BLUEPRINT", help = "Blueprint path inside the repository")]
    pub blueprint: String,

    #[command(flatten)]
    pub repository: RepositoryArgs,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `blueprint list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub repository: RepositoryArgs,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `blueprint completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config ────────────────────────────────────────────────────────────────────

/// Arguments for `blueprint config`.
#[derive(Debug, Args)]
#[group(id = "action", multiple = false)]
pub struct ConfigArgs {
    /// Print the effective configuration.
    #[arg(long = "show", group = "action", help = "Print the effective configuration")]
    pub show: bool,

    /// Print the path of the configuration file.
    #[arg(long = "path", group = "action", help = "Print the configuration file path")]
    pub path: bool,

    /// Write a default configuration file.
    #[arg(long = "init", group = "action", help = "Create a default configuration file")]
    pub init: bool,

    /// Overwrite an existing file with `--init`.
    #[arg(short = 'f', long = "force", requires = "init", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── tests ─────────────────────────────────────────────────────────────────────
