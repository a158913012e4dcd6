//! CLIP ONNX provider: visual and text encoder sessions plus tokenizer.
//!
//! Loads a CLIP model exported to ONNX (`visual.onnx`, `text_model.onnx`,
//! `tokenizer.json` in the model directory) and serves both sides of the
//! embedding comparison. Weights load once; `Mutex<Session>` is needed
//! because `Session::run` requires `&mut self`, which also satisfies the
//! "reentrant or internally serialized" half of the provider contract.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::Value;

use crate::config::EmbeddingConfig;
use crate::error::ProviderError;
use crate::types::PixelBuffer;

use super::preprocess::preprocess;
use super::EmbeddingProvider;

/// The visual encoder ONNX model filename.
const VISUAL_MODEL_FILENAME: &str = "visual.onnx";

/// The text encoder ONNX model filename.
const TEXT_MODEL_FILENAME: &str = "text_model.onnx";

/// The tokenizer definition filename.
const TOKENIZER_FILENAME: &str = "tokenizer.json";

/// Embedding output names, in preference order. Exports differ: HF optimum
/// emits `image_embeds`/`text_embeds`, older conversions `pooler_output`.
const OUTPUT_NAMES: [&str; 3] = ["image_embeds", "text_embeds", "pooler_output"];

/// CLIP embedding provider backed by ONNX Runtime.
#[derive(Debug)]
pub struct ClipOnnxProvider {
    visual: Mutex<Session>,
    text: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
    /// Name of the visual input tensor (detected from model metadata).
    visual_input: String,
    /// Whether the text model declares an `attention_mask` input.
    text_wants_attention_mask: bool,
    image_size: u32,
    sequence_length: usize,
}

impl ClipOnnxProvider {
    /// Load both encoders and the tokenizer from the model directory.
    pub fn load(model_dir: &Path, config: &EmbeddingConfig) -> Result<Self, ProviderError> {
        let visual_path = model_dir.join(VISUAL_MODEL_FILENAME);
        let text_path = model_dir.join(TEXT_MODEL_FILENAME);
        let tokenizer_path = model_dir.join(TOKENIZER_FILENAME);

        for path in [&visual_path, &text_path, &tokenizer_path] {
            if !path.exists() {
                return Err(ProviderError::new(format!(
                    "Model file not found: {path:?}"
                )));
            }
        }

        tracing::info!("Loading CLIP model from {:?}", model_dir);

        let visual = Self::load_session(&visual_path)?;
        let visual_input = visual
            .inputs()
            .first()
            .map(|i| i.name().to_string())
            .unwrap_or_else(|| "pixel_values".to_string());

        let text = Self::load_session(&text_path)?;
        let text_wants_attention_mask = text
            .inputs()
            .iter()
            .any(|i| i.name() == "attention_mask");

        let tokenizer = tokenizers::Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| ProviderError::new(format!("Failed to load tokenizer: {e}")))?;

        tracing::debug!(
            "CLIP sessions ready (visual input: {:?}, text inputs: {:?})",
            visual_input,
            text.inputs().iter().map(|i| i.name()).collect::<Vec<_>>()
        );

        Ok(Self {
            visual: Mutex::new(visual),
            text: Mutex::new(text),
            tokenizer,
            visual_input,
            text_wants_attention_mask,
            image_size: config.image_size,
            sequence_length: config.text_sequence_length,
        })
    }

    fn load_session(path: &Path) -> Result<Session, ProviderError> {
        Session::builder()
            .map_err(|e| ProviderError::new(format!("Failed to create ONNX session builder: {e}")))?
            .commit_from_file(path)
            .map_err(|e| ProviderError::new(format!("Failed to load ONNX model {path:?}: {e}")))
    }

    /// Files every model directory must contain.
    pub const MODEL_FILES: [&'static str; 3] =
        [VISUAL_MODEL_FILENAME, TEXT_MODEL_FILENAME, TOKENIZER_FILENAME];

    /// Model files absent from the directory, in load order.
    pub fn missing_files(model_dir: &Path) -> Vec<&'static str> {
        Self::MODEL_FILES
            .into_iter()
            .filter(|f| !model_dir.join(f).exists())
            .collect()
    }

    /// Check whether all model files exist in the directory.
    pub fn model_exists(model_dir: &Path) -> bool {
        Self::missing_files(model_dir).is_empty()
    }
}

impl EmbeddingProvider for ClipOnnxProvider {
    fn embed_image(&self, pixels: &PixelBuffer) -> Result<Vec<f32>, ProviderError> {
        let tensor = preprocess(pixels, self.image_size);

        // Convert ndarray to (shape, flat_data) for ort.
        let shape: Vec<i64> = tensor.shape().iter().map(|&d| d as i64).collect();
        let flat_data: Vec<f32> = tensor.iter().copied().collect();

        let input_value = Value::from_array((shape, flat_data))
            .map_err(|e| ProviderError::new(format!("Failed to create input tensor: {e}")))?;

        let mut session = self
            .visual
            .lock()
            .map_err(|e| ProviderError::new(format!("Visual session lock poisoned: {e}")))?;

        let outputs = session
            .run(ort::inputs![self.visual_input.as_str() => input_value])
            .map_err(|e| ProviderError::new(format!("Visual inference failed: {e}")))?;

        let output = outputs
            .iter()
            .find(|(name, _)| OUTPUT_NAMES.contains(name))
            .or_else(|| outputs.iter().next())
            .ok_or_else(|| ProviderError::new("Visual encoder produced no outputs"))?;
        let (shape, data) = output
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| ProviderError::new(format!("Failed to extract embedding tensor: {e}")))?;

        let mut embeddings = split_embeddings(&shape, data, 1)?;
        embeddings
            .pop()
            .ok_or_else(|| ProviderError::new("Visual encoder returned no embedding"))
    }

    fn embed_texts(&self, prompts: &[String]) -> Result<Vec<Vec<f32>>, ProviderError> {
        let batch_size = prompts.len();
        if batch_size == 0 {
            return Ok(vec![]);
        }

        let encodings = self
            .tokenizer
            .encode_batch(prompts.to_vec(), true)
            .map_err(|e| ProviderError::new(format!("Tokenization failed: {e}")))?;

        // Flat [batch, seq_len] tensors, zero-padded to the fixed length.
        let seq_len = self.sequence_length;
        let mut input_ids = vec![0i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let ids = encoding.get_ids();
            for (j, &id) in ids.iter().take(seq_len).enumerate() {
                input_ids[i * seq_len + j] = id as i64;
                attention_mask[i * seq_len + j] = 1;
            }
        }

        let dims = vec![batch_size as i64, seq_len as i64];
        let ids_value = Value::from_array((dims.clone(), input_ids))
            .map_err(|e| ProviderError::new(format!("Failed to create input_ids tensor: {e}")))?;

        let mut session = self
            .text
            .lock()
            .map_err(|e| ProviderError::new(format!("Text session lock poisoned: {e}")))?;

        let outputs = if self.text_wants_attention_mask {
            let mask_value = Value::from_array((dims, attention_mask)).map_err(|e| {
                ProviderError::new(format!("Failed to create attention_mask tensor: {e}"))
            })?;
            session
                .run(ort::inputs!["input_ids" => ids_value, "attention_mask" => mask_value])
                .map_err(|e| ProviderError::new(format!("Text inference failed: {e}")))?
        } else {
            session
                .run(ort::inputs!["input_ids" => ids_value])
                .map_err(|e| ProviderError::new(format!("Text inference failed: {e}")))?
        };

        let output = outputs
            .iter()
            .find(|(name, _)| OUTPUT_NAMES.contains(name))
            .or_else(|| outputs.iter().next())
            .ok_or_else(|| ProviderError::new("Text encoder produced no outputs"))?;
        let (shape, data) = output
            .1
            .try_extract_tensor::<f32>()
            .map_err(|e| ProviderError::new(format!("Failed to extract embedding tensor: {e}")))?;

        split_embeddings(&shape, data, batch_size)
    }
}

/// Split a flat embedding tensor into `batch_size` raw vectors.
/// Normalization is the scorer's job, not ours.
fn split_embeddings(
    shape: &[i64],
    data: &[f32],
    batch_size: usize,
) -> Result<Vec<Vec<f32>>, ProviderError> {
    let embedding_dim = match shape.len() {
        1 => data.len(),
        2 => shape[1] as usize,
        _ => {
            return Err(ProviderError::new(format!(
                "Unexpected embedding output shape: {shape:?}"
            )));
        }
    };

    if embedding_dim == 0 || data.len() < batch_size * embedding_dim {
        return Err(ProviderError::new(format!(
            "Embedding output too small: {} floats for batch of {batch_size}",
            data.len()
        )));
    }

    Ok(data
        .chunks(embedding_dim)
        .take(batch_size)
        .map(|chunk| chunk.to_vec())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_exists_requires_all_files() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!ClipOnnxProvider::model_exists(dir.path()));

        std::fs::write(dir.path().join(VISUAL_MODEL_FILENAME), b"x").unwrap();
        std::fs::write(dir.path().join(TEXT_MODEL_FILENAME), b"x").unwrap();
        assert!(!ClipOnnxProvider::model_exists(dir.path()));

        std::fs::write(dir.path().join(TOKENIZER_FILENAME), b"x").unwrap();
        assert!(ClipOnnxProvider::model_exists(dir.path()));
    }

    #[test]
    fn test_missing_files_names_the_gaps() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(VISUAL_MODEL_FILENAME), b"x").unwrap();

        let missing = ClipOnnxProvider::missing_files(dir.path());
        assert_eq!(missing, vec![TEXT_MODEL_FILENAME, TOKENIZER_FILENAME]);
    }

    #[test]
    fn test_split_embeddings_2d() {
        let data = [1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0];
        let out = split_embeddings(&[2, 3], &data, 2).unwrap();
        assert_eq!(out, vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
    }

    #[test]
    fn test_split_embeddings_1d_single() {
        let data = [0.5f32, 0.25];
        let out = split_embeddings(&[2], &data, 1).unwrap();
        assert_eq!(out, vec![vec![0.5, 0.25]]);
    }

    #[test]
    fn test_split_embeddings_short_output_rejected() {
        let data = [1.0f32, 2.0, 3.0];
        assert!(split_embeddings(&[2, 3], &data, 2).is_err());
    }

    #[test]
    fn test_load_missing_model_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err =
            ClipOnnxProvider::load(dir.path(), &EmbeddingConfig::default()).unwrap_err();
        assert!(err.to_string().contains("visual.onnx"));
    }
}
