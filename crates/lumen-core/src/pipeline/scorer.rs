//! Similarity scoring: embeddings in, ranked confidence distribution out.
//!
//! Both image and text embeddings are L2-normalized here (not in the
//! provider), so the dot product is cosine similarity and the zero-norm
//! guard lives in exactly one place.

use crate::error::NumericError;
use crate::math;
use crate::types::{RankedResult, ScoreEntry};

/// Computes per-label similarity and the ranked result.
///
/// Stateless: every call receives the full label context as parameters,
/// so a single scorer is safe to share across concurrent requests.
pub struct SimilarityScorer;

impl SimilarityScorer {
    /// Score an image embedding against order-aligned text embeddings.
    ///
    /// `prediction` is chosen by argmax over the RAW similarity vector,
    /// before any sorting; `other_predictions` is the full list ordered by
    /// softmax confidence descending. Softmax is monotonic in its input,
    /// so the two agree for non-tied inputs — a property the tests verify
    /// rather than assume. Confidence ties keep original label order
    /// (stable sort).
    ///
    /// `labels` and `text_embeddings` must be non-empty and equal-length;
    /// `PromptBuilder` and the pipeline's alignment check enforce both
    /// before this stage runs.
    pub fn score(
        image_embedding: &[f32],
        text_embeddings: &[Vec<f32>],
        labels: &[String],
        model_id: &str,
    ) -> Result<RankedResult, NumericError> {
        debug_assert_eq!(text_embeddings.len(), labels.len());

        let image = math::l2_normalize(image_embedding)
            .ok_or(NumericError::ZeroNorm { which: "image" })?;

        let mut similarities = Vec::with_capacity(text_embeddings.len());
        for text_embedding in text_embeddings {
            if text_embedding.len() != image.len() {
                return Err(NumericError::DimensionMismatch {
                    image_dim: image.len(),
                    text_dim: text_embedding.len(),
                });
            }
            let text = math::l2_normalize(text_embedding)
                .ok_or(NumericError::ZeroNorm { which: "text" })?;
            similarities.push(math::dot(&image, &text));
        }

        // Argmax over raw similarities is the single source of truth for
        // the top prediction; first index wins ties.
        let top_idx = similarities
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
            .unwrap_or(0);

        let confidences = math::softmax(&similarities);

        let entries: Vec<ScoreEntry> = labels
            .iter()
            .zip(confidences.iter())
            .map(|(label, confidence)| ScoreEntry {
                label: label.clone(),
                confidence: *confidence,
            })
            .collect();

        let prediction = entries[top_idx].clone();

        // Independently order the full list; Rust's sort is stable, so
        // equal confidences retain label order.
        let mut ranked = entries;
        ranked.sort_by(|a, b| {
            b.confidence
                .partial_cmp(&a.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        tracing::debug!(
            "Top prediction '{}' at confidence {:.4} over {} labels",
            prediction.label,
            prediction.confidence,
            ranked.len()
        );

        Ok(RankedResult {
            prediction,
            other_predictions: ranked,
            model_name: model_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_score_ranks_by_similarity() {
        // Image embedding points at the "cake" axis.
        let image = vec![0.0, 1.0, 0.0];
        let texts = vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![0.5, 0.5, 0.0],
        ];
        let result = SimilarityScorer::score(
            &image,
            &texts,
            &labels(&["biryani", "cake", "other food"]),
            "test-model",
        )
        .unwrap();

        assert_eq!(result.prediction.label, "cake");
        assert_eq!(result.other_predictions.len(), 3);
        assert_eq!(result.other_predictions[0].label, "cake");
        assert_eq!(result.model_name, "test-model");

        let sum: f32 = result.other_predictions.iter().map(|e| e.confidence).sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(result
            .other_predictions
            .iter()
            .all(|e| (0.0..=1.0).contains(&e.confidence)));
    }

    #[test]
    fn test_prediction_agrees_with_sorted_head() {
        // Softmax is monotonic, so the raw-similarity argmax and the
        // confidence-sorted head must name the same label when there are
        // no ties. Verified, not assumed.
        let image = vec![0.4, 0.9, 0.1, 0.3];
        let texts = vec![
            vec![0.9, 0.1, 0.2, 0.1],
            vec![0.2, 0.8, 0.1, 0.4],
            vec![0.1, 0.2, 0.9, 0.3],
        ];
        let result =
            SimilarityScorer::score(&image, &texts, &labels(&["a", "b", "c"]), "m").unwrap();
        assert_eq!(result.prediction.label, result.other_predictions[0].label);
    }

    #[test]
    fn test_sorted_descending() {
        let image = vec![0.7, 0.3];
        let texts = vec![
            vec![0.1, 0.9],
            vec![0.9, 0.1],
            vec![0.5, 0.5],
            vec![0.7, 0.3],
        ];
        let result =
            SimilarityScorer::score(&image, &texts, &labels(&["w", "x", "y", "z"]), "m").unwrap();
        for pair in result.other_predictions.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_ties_keep_label_order() {
        // Two identical text embeddings tie exactly; the stable sort must
        // keep them in original label order, and argmax picks the first.
        let image = vec![1.0, 0.0];
        let texts = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
        let result =
            SimilarityScorer::score(&image, &texts, &labels(&["first", "second", "third"]), "m")
                .unwrap();
        assert_eq!(result.prediction.label, "first");
        assert_eq!(result.other_predictions[0].label, "first");
        assert_eq!(result.other_predictions[1].label, "second");
    }

    #[test]
    fn test_zero_norm_image_embedding() {
        let err = SimilarityScorer::score(
            &[0.0, 0.0, 0.0],
            &[vec![1.0, 0.0, 0.0]],
            &labels(&["a"]),
            "m",
        )
        .unwrap_err();
        assert!(matches!(err, NumericError::ZeroNorm { which: "image" }));
    }

    #[test]
    fn test_zero_norm_text_embedding() {
        let err = SimilarityScorer::score(
            &[1.0, 0.0, 0.0],
            &[vec![0.0, 0.0, 0.0]],
            &labels(&["a"]),
            "m",
        )
        .unwrap_err();
        assert!(matches!(err, NumericError::ZeroNorm { which: "text" }));
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = SimilarityScorer::score(&[1.0, 0.0], &[vec![1.0, 0.0, 0.0]], &labels(&["a"]), "m")
            .unwrap_err();
        assert!(matches!(err, NumericError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_unnormalized_inputs_are_normalized_here() {
        // Same direction, wildly different magnitudes: cosine similarity
        // must be identical after internal normalization.
        let image = vec![10.0, 0.0];
        let texts_a = vec![vec![100.0, 0.0], vec![0.0, 0.001]];
        let texts_b = vec![vec![1.0, 0.0], vec![0.0, 1.0]];

        let a = SimilarityScorer::score(&image, &texts_a, &labels(&["x", "y"]), "m").unwrap();
        let b = SimilarityScorer::score(&image, &texts_b, &labels(&["x", "y"]), "m").unwrap();
        for (ea, eb) in a.other_predictions.iter().zip(b.other_predictions.iter()) {
            assert!((ea.confidence - eb.confidence).abs() < 1e-6);
        }
    }
}
