//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "compose a blueprint" or "generate its files".

pub mod blueprint_service;
pub mod composition;
pub mod field_resolver;
pub mod file_selection;
pub mod pipeline;

pub use blueprint_service::{
    BlueprintService, GENERATED_DIR, GenerateReport, GenerateRequest, GeneratedFile,
    SECRETS_FILE, VALUES_FILE, display_path,
};
pub use composition::{Composer, Composition, PreparedComposition};
pub use field_resolver::{FieldResolver, Params};
pub use file_selection::{SelectedFile, select_files, should_skip};
pub use pipeline::{Answers, DataPreparer, PipelineConfig};
