//! Resolution and composition engine for blueprints.
//!
//! A blueprint is a YAML definition plus template files living in a
//! repository. This crate knows how to merge a blueprint with the
//! blueprints it includes, evaluate `!expr` and `!fn` fields, collect a
//! value for every parameter and pick the files to render. It performs no
//! I/O itself; everything external sits behind the traits in
//! [`application::ports`]:
//!
//! ```text
//!   blueprint-cli ──► BlueprintService ──► Composer ─► DataPreparer ─► file selection
//!                          │
//!                          ├── BlueprintResolver   (repository lookup)
//!                          ├── InputSource         (prompts / answers)
//!                          ├── TemplateRenderer    (.tmpl files)
//!                          └── Filesystem          (reads and writes)
//! ```
//!
//! `domain` holds the canonical model and its rules, `expression` the
//! `!expr` language and `functions` the `!fn` registry.
//!
//! ```rust,no_run
//! use blueprint_core::prelude::*;
//!
//! # fn run(resolver: Box<dyn BlueprintResolver>, renderer: Box<dyn TemplateRenderer>,
//! #        filesystem: Box<dyn Filesystem>, input: &mut dyn InputSource) -> BlueprintResult<()> {
//! let service = BlueprintService::new(resolver, renderer, filesystem, FunctionRegistry::new());
//! let report = service.generate("aws/monolith", &GenerateRequest::new("./out"), input)?;
//! println!("{} files", report.files.len());
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod error;
pub mod expression;
pub mod functions;

/// Everything needed to wire a [`BlueprintService`](application::BlueprintService)
/// and drive it.
pub mod prelude {
    pub use crate::application::{
        Answers, BlueprintService, Composer, Composition, DataPreparer, GenerateReport,
        GenerateRequest, PipelineConfig, PreparedComposition,
        ports::{BlueprintResolver, Filesystem, FunctionProvider, InputSource, TemplateRenderer},
    };
    pub use crate::domain::{
        BlueprintConfig, ComposedBlueprint, PreparedData, Value, VarField, Variable,
        VariableType,
    };
    pub use crate::error::{BlueprintError, BlueprintResult};
    pub use crate::expression::Evaluator;
    pub use crate::functions::{FnResult, FunctionRegistry};
}

