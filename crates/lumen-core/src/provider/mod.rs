//! Embedding provider contract and model registry.
//!
//! The pipeline depends on providers only through [`EmbeddingProvider`];
//! model loading and inference internals stay behind the trait. One
//! concrete provider ships with the crate:
//! - **clip**: CLIP visual + text encoders via ONNX Runtime

pub(crate) mod preprocess;

mod clip;

pub use clip::ClipOnnxProvider;

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ConfigurationError, ProviderError};
use crate::types::PixelBuffer;

/// An object exposing image and text embedding for one loaded model.
///
/// Implementations hold weights loaded once at process start and are
/// immutable afterwards; `embed_*` must be callable concurrently (either
/// reentrant or internally serialized — `ClipOnnxProvider` serializes via
/// a session mutex).
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Embed a canonical pixel buffer into the shared semantic space.
    fn embed_image(&self, pixels: &PixelBuffer) -> Result<Vec<f32>, ProviderError>;

    /// Embed prompts, order-aligned with the input.
    fn embed_texts(&self, prompts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError>;
}

/// Maps model identifiers to loaded providers.
///
/// Populated before the pipeline starts serving; lookups afterwards are
/// read-only, so concurrent requests need no locking here.
#[derive(Default)]
pub struct ModelRegistry {
    providers: HashMap<String, Arc<dyn EmbeddingProvider>>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider under a model identifier.
    pub fn register(&mut self, model_id: impl Into<String>, provider: Arc<dyn EmbeddingProvider>) {
        let model_id = model_id.into();
        tracing::info!("Registered embedding provider for model '{}'", model_id);
        self.providers.insert(model_id, provider);
    }

    /// Look up a provider; unknown identifiers are a configuration error.
    pub fn get(&self, model_id: &str) -> Result<Arc<dyn EmbeddingProvider>, ConfigurationError> {
        self.providers
            .get(model_id)
            .cloned()
            .ok_or_else(|| ConfigurationError::UnknownModel {
                model: model_id.to_string(),
            })
    }

    /// Identifiers of all registered models.
    pub fn model_ids(&self) -> Vec<&str> {
        self.providers.keys().map(String::as_str).collect()
    }
}
