pub mod blueprint;
pub mod common;
pub mod field;
pub mod prepared;
pub mod value;
pub mod variable;

pub use crate::domain::DomainError;
pub use blueprint::{BlueprintConfig, ComposedBlueprint, TemplateConfig};
pub use prepared::PreparedData;
pub use variable::Variable;
