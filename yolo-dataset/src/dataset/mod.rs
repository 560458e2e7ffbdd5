//! Dataset indexing and sample loading.

mod dataset;
mod loader;
mod manifest;
mod record;

pub use dataset::*;
pub use loader::*;
pub use manifest::*;
pub use record::*;
