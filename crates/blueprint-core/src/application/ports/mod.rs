//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `blueprint-adapters` and the CLI
//! implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `BlueprintResolver`: Fetch + normalize a blueprint by path
//!   - `InputSource`: Interactive questions and final confirmation
//!   - `FunctionProvider`: One `!fn` domain
//!   - `TemplateRenderer`: File body rendering
//!   - `Filesystem`: File operations

pub mod output;

pub use output::{
    AnswerValidator, BlueprintResolver, Filesystem, FunctionProvider, InputSource,
    TemplateRenderer,
};

#[cfg(test)]
pub use output::{MockBlueprintResolver, MockFunctionProvider};
