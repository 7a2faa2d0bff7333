//! Command handlers, one module per subcommand.
//!
//! Each handler turns parsed arguments into calls on the core service or the
//! adapters and renders the result through [`crate::output::OutputManager`].

pub mod completions;
pub mod config;
pub mod generate;
pub mod inspect;
pub mod list;
