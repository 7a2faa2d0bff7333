//! [`Filesystem`](blueprint_core::application::ports::Filesystem) backends:
//! the real disk for the CLI and an in-memory map for tests and dry
//! pipelines.

mod local;
mod memory;

pub use local::LocalFilesystem;
pub use memory::MemoryFilesystem;
