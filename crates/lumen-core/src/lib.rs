//! Lumen Core - zero-shot image classification library.
//!
//! Lumen classifies an image against an arbitrary, caller-supplied set of
//! text labels by comparing image and text embeddings from a
//! vision-language model, returning a ranked confidence distribution.
//! Callers do not need to know labels in advance.
//!
//! # Architecture
//!
//! ```text
//! ImageInput → FormatResolver → PixelBuffer ─┐
//!                                            ├→ EmbeddingProvider → SimilarityScorer → RankedResult
//! Labels → PromptBuilder → Prompts ──────────┘
//! ```
//!
//! Data flows strictly left to right per request. No component keeps
//! cross-request state except the provider's immutable loaded weights.
//!
//! # Usage
//!
//! ```rust,ignore
//! use lumen_core::{Config, ImageInput, Lumen};
//!
//! #[tokio::main]
//! async fn main() -> lumen_core::Result<()> {
//!     let config = Config::load()?;
//!     let lumen = Lumen::new(config)?;
//!
//!     let labels = vec!["biryani".into(), "cake".into(), "other food".into()];
//!     let result = lumen
//!         .classify(ImageInput::from_text("./dish.jpg"), &labels)
//!         .await?;
//!     println!("{} ({:.2})", result.prediction.label, result.prediction.confidence);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod math;
pub mod pipeline;
pub mod provider;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{
    ClassifyError, ClassifyResult, ConfigError, ConfigurationError, DecodeError, LumenError,
    NumericError, ProviderError, Result,
};
pub use pipeline::{ClassificationPipeline, FormatResolver, PromptBuilder, SimilarityScorer};
pub use provider::{ClipOnnxProvider, EmbeddingProvider, ModelRegistry};
pub use types::{ImageInput, InputKind, PixelBuffer, RankedResult, ScoreEntry};

use std::sync::Arc;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lumen facade - loads the configured model and serves classification.
pub struct Lumen {
    pipeline: ClassificationPipeline,
    config: Config,
}

impl Lumen {
    /// Create a Lumen instance, loading the configured CLIP model from the
    /// model directory into the registry.
    pub fn new(config: Config) -> Result<Self> {
        tracing::debug!("Initializing Lumen v{}", VERSION);

        let model_id = config.embedding.model.clone();
        let model_dir = config.model_dir().join(&model_id);
        let provider = ClipOnnxProvider::load(&model_dir, &config.embedding)?;

        let mut registry = ModelRegistry::new();
        registry.register(model_id, Arc::new(provider));

        Ok(Self {
            pipeline: ClassificationPipeline::new(registry),
            config,
        })
    }

    /// Create a Lumen instance over an externally populated registry.
    ///
    /// Used when providers are loaded elsewhere (or mocked in tests).
    pub fn with_registry(config: Config, registry: ModelRegistry) -> Self {
        Self {
            pipeline: ClassificationPipeline::new(registry),
            config,
        }
    }

    /// Classify an image against labels using the configured default model.
    pub async fn classify(
        &self,
        input: ImageInput,
        labels: &[String],
    ) -> ClassifyResult<RankedResult> {
        self.pipeline
            .classify(input, labels, &self.config.embedding.model)
            .await
    }

    /// Classify with an explicit model identifier.
    pub async fn classify_with_model(
        &self,
        input: ImageInput,
        labels: &[String],
        model_id: &str,
    ) -> ClassifyResult<RankedResult> {
        self.pipeline.classify(input, labels, model_id).await
    }

    /// Get a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
