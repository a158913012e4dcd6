//! The classification pipeline stages.
//!
//! - **resolve**: normalize any `ImageInput` variant to canonical pixels
//! - **prompt**: map the label set to natural-language prompts
//! - **scorer**: similarity → softmax → ranked result
//! - **classify**: the request-scoped facade composing the stages

pub mod classify;
pub mod prompt;
pub mod resolve;
pub mod scorer;

// Re-exports for convenient access
pub use classify::ClassificationPipeline;
pub use prompt::PromptBuilder;
pub use resolve::{FormatResolver, ResolvedImage, DEFAULT_MIME};
pub use scorer::SimilarityScorer;
