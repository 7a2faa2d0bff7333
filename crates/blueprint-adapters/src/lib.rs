//! Infrastructure adapters for blueprints.
//!
//! This crate implements the ports defined in `blueprint-core::application::ports`.
//! It contains all external dependencies and I/O operations: YAML schema
//! parsing, the directory repository, answers files, function providers,
//! the placeholder renderer and filesystems.

pub mod answers;
pub mod filesystem;
pub mod functions;
pub mod renderer;
pub mod repository;
pub mod schema;

// Re-export commonly used adapters
pub use answers::load_answers;
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use functions::default_registry;
pub use renderer::PlaceholderRenderer;
pub use repository::{BlueprintSummary, LocalRepository};
pub use schema::parse_blueprint;
