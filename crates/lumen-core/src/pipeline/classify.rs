//! Pipeline facade - composes resolution, prompting, embedding, and
//! scoring into one request-scoped operation.

use std::sync::Arc;

use crate::error::{ClassifyError, ProviderError};
use crate::provider::{EmbeddingProvider, ModelRegistry};
use crate::types::{ImageInput, RankedResult};

use super::prompt::PromptBuilder;
use super::resolve::FormatResolver;
use super::scorer::SimilarityScorer;

/// The classification pipeline: resolve → prompt → embed → score.
///
/// A single instance is shared across concurrent requests. Everything
/// request-scoped (labels, prompts, pixels, embeddings) lives in locals of
/// `classify` and flows as explicit parameters — no field of this struct
/// changes between construction and drop, which rules out label
/// cross-contamination between in-flight requests by construction.
pub struct ClassificationPipeline {
    resolver: FormatResolver,
    registry: ModelRegistry,
}

impl ClassificationPipeline {
    /// Create a pipeline over a pre-populated model registry.
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            resolver: FormatResolver::new(),
            registry,
        }
    }

    /// Classify an image against the caller's labels using the named model.
    ///
    /// Either a full `RankedResult` is produced or an error is returned;
    /// there is no partial result and nothing is retried internally.
    pub async fn classify(
        &self,
        input: ImageInput,
        labels: &[String],
        model_id: &str,
    ) -> Result<RankedResult, ClassifyError> {
        let start = std::time::Instant::now();

        // Cheap request validation first: prompts and provider lookup
        // before any I/O.
        let prompts = PromptBuilder::build(labels)?;
        let provider: Arc<dyn EmbeddingProvider> = self.registry.get(model_id)?;

        let resolved = self.resolver.resolve(input).await?;
        tracing::debug!(
            "Resolved input to {}x{} pixels ({})",
            resolved.pixels.width(),
            resolved.pixels.height(),
            resolved.mime_type
        );

        let image_embedding = provider.embed_image(&resolved.pixels)?;
        let text_embeddings = provider.embed_texts(&prompts)?;
        if text_embeddings.len() != prompts.len() {
            // Contract violation by the provider, not a core rejection.
            return Err(ProviderError::new(format!(
                "Provider returned {} text embeddings for {} prompts",
                text_embeddings.len(),
                prompts.len()
            ))
            .into());
        }

        let result = SimilarityScorer::score(&image_embedding, &text_embeddings, labels, model_id)?;

        tracing::debug!(
            "Classified against {} labels in {:?}: '{}'",
            labels.len(),
            start.elapsed(),
            result.prediction.label
        );
        Ok(result)
    }

    /// Identifiers of the models this pipeline can serve.
    pub fn model_ids(&self) -> Vec<&str> {
        self.registry.model_ids()
    }
}
