//! Content-analysis adapters: section-tagged output parsing plus the Gemini
//! gateway and its mock.

pub mod extractor;
pub mod gemini_adapter;
pub mod mock_adapter;

pub use extractor::{ClaimExtractor, Extraction};
pub use gemini_adapter::GeminiAdapter;
pub use mock_adapter::MockAnalysisAdapter;
