//! Tracing setup for the binary.
//!
//! The library crates only emit events; this is the one place a subscriber
//! gets installed. `RUST_LOG` replaces the level picked from `-v`/`-q`.

use std::io::IsTerminal as _;

use anyhow::Context as _;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{GlobalArgs, OutputFormat};

const CRATES: [&str; 3] = ["blueprint", "blueprint_core", "blueprint_adapters"];

/// Install the global subscriber. Events go to stderr so stdout stays
/// reserved for command output.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directives(args.log_level())));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match args.output_format {
        OutputFormat::Json => registry
            .with(fmt::layer().json().with_target(false).with_writer(std::io::stderr))
            .try_init(),
        _ => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(!args.no_color && std::io::stderr().is_terminal())
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };
    installed.context("a tracing subscriber is already installed")
}

/// `crate=level` for each blueprint crate, comma separated.
fn directives(level: &str) -> String {
    CRATES
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_crate_gets_the_level() {
        assert_eq!(
            directives("debug"),
            "blueprint=debug,blueprint_core=debug,blueprint_adapters=debug"
        );
    }

    #[test]
    fn directives_parse_as_a_filter() {
        assert!(EnvFilter::try_new(directives("trace")).is_ok());
    }
}
