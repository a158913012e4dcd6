//! Error types for the Lumen classification pipeline.
//!
//! The request-level taxonomy deliberately separates "the core understood
//! and rejected the input" (decode, configuration, numeric) from "a
//! dependency misbehaved" (provider), so callers can map them to different
//! failure responses.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::InputKind;

/// Top-level error type for Lumen operations.
#[derive(Error, Debug)]
pub enum LumenError {
    /// Configuration file errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Classification request errors
    #[error(transparent)]
    Classify(#[from] ClassifyError),

    /// Embedding provider errors outside of a request (e.g. model load)
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration file errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Everything that can terminate a classification request.
///
/// All of these are terminal: no variant is retried internally and no
/// partial result is produced alongside one.
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// The image input could not be resolved to a pixel buffer
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The request itself is unusable (empty labels, unknown model)
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Degenerate embedding arithmetic
    #[error(transparent)]
    Numeric(#[from] NumericError),

    /// The embedding provider failed; propagated unchanged rather than
    /// coerced into one of the core error kinds
    #[error("Embedding provider error: {0}")]
    Provider(#[from] ProviderError),
}

/// Image resolution failures, one variant per attempted input kind.
///
/// Resolution follows a fixed precedence chain, so each failure names the
/// branch that was attempted — there is no fallback between branches.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Network fetch of a remote image failed
    #[error("Failed to fetch image from {url}: {message}")]
    Fetch { url: String, message: String },

    /// Local image file could not be read
    #[error("Failed to read image file {path:?}: {message}")]
    FileRead { path: PathBuf, message: String },

    /// Input was treated as base64 text and did not decode
    #[error("Invalid base64 image payload: {message}")]
    Base64 { message: String },

    /// Bytes were obtained but do not decode as a supported image format
    #[error("Cannot decode {kind} input as an image: {message}")]
    Malformed { kind: InputKind, message: String },
}

/// Request configuration errors.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// The caller supplied no labels to score against
    #[error("Label set is empty: at least one label is required")]
    EmptyLabels,

    /// The model identifier does not name a loaded provider
    #[error("Unknown model identifier: {model}")]
    UnknownModel { model: String },
}

/// Degenerate numeric conditions in the scoring stage.
#[derive(Error, Debug)]
pub enum NumericError {
    /// An embedding had zero Euclidean norm and cannot be normalized
    #[error("Zero-norm {which} embedding cannot be L2-normalized")]
    ZeroNorm { which: &'static str },

    /// Image and text embeddings disagree on dimensionality
    #[error("Embedding dimension mismatch: image has {image_dim}, text has {text_dim}")]
    DimensionMismatch { image_dim: usize, text_dim: usize },
}

/// Opaque fault from an embedding provider.
///
/// Providers are external collaborators; their failures carry whatever
/// context the provider chose to report and nothing is inferred from them.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct ProviderError {
    pub message: String,
}

impl ProviderError {
    /// Create a provider error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Lumen results.
pub type Result<T> = std::result::Result<T, LumenError>;

/// Convenience type alias for request-scoped results.
pub type ClassifyResult<T> = std::result::Result<T, ClassifyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_names_attempted_branch() {
        let err = DecodeError::Base64 {
            message: "invalid padding".to_string(),
        };
        assert!(err.to_string().contains("base64"));

        let err = DecodeError::Fetch {
            url: "https://example.com/cat.jpg".to_string(),
            message: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("https://example.com/cat.jpg"));
    }

    #[test]
    fn test_provider_error_is_distinct_variant() {
        let err: ClassifyError = ProviderError::new("session crashed").into();
        assert!(matches!(err, ClassifyError::Provider(_)));
        assert_eq!(err.to_string(), "Embedding provider error: session crashed");
    }

    #[test]
    fn test_empty_labels_message() {
        let err = ConfigurationError::EmptyLabels;
        assert!(err.to_string().contains("at least one label"));
    }
}
