//! Use cases over the domain model.
//!
//! [`BlueprintService`] runs a whole generation: [`Composer`] resolves the
//! include tree through a [`BlueprintResolver`], [`DataPreparer`] fills in
//! parameter values from answers, defaults and an [`InputSource`], and the
//! file selection step turns template configs into output paths.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    Answers, BlueprintService, Composer, Composition, DataPreparer, FieldResolver,
    GenerateReport, GenerateRequest, PipelineConfig, PreparedComposition,
};

pub use ports::{
    AnswerValidator, BlueprintResolver, Filesystem, FunctionProvider, InputSource,
    TemplateRenderer,
};

pub use error::ApplicationError;
