//! Template body renderers.

mod placeholder;

pub use placeholder::PlaceholderRenderer;
