//! Application use cases: the fact-check pipeline and its helpers.

pub mod format;
pub mod pipeline;
pub mod validate;

pub use pipeline::FactCheckPipeline;
pub use validate::SizeLimits;
