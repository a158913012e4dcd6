//! Prompt construction: one natural-language prompt per label.
//!
//! Prompts are derived from the fixed template on every request and never
//! cached keyed by label — the template is part of the prompt's meaning.

use crate::error::ConfigurationError;

/// The fixed zero-shot template. A label `cake` scores against the text
/// "a photo of a cake".
const PROMPT_TEMPLATE_PREFIX: &str = "a photo of a ";

/// Maps a label set to prompts, order-preserving.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Build one prompt per label, in label order.
    ///
    /// Labels are not deduplicated: duplicate labels yield duplicate
    /// prompts (and therefore duplicate result entries), which is the
    /// caller's responsibility. An empty label set is rejected.
    pub fn build(labels: &[String]) -> Result<Vec<String>, ConfigurationError> {
        if labels.is_empty() {
            return Err(ConfigurationError::EmptyLabels);
        }
        Ok(labels
            .iter()
            .map(|label| format!("{PROMPT_TEMPLATE_PREFIX}{label}"))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_applies_template_in_order() {
        let prompts = PromptBuilder::build(&labels(&["biryani", "cake", "other food"])).unwrap();
        assert_eq!(
            prompts,
            vec![
                "a photo of a biryani",
                "a photo of a cake",
                "a photo of a other food",
            ]
        );
    }

    #[test]
    fn test_empty_label_set_rejected() {
        assert!(matches!(
            PromptBuilder::build(&[]),
            Err(ConfigurationError::EmptyLabels)
        ));
    }

    #[test]
    fn test_duplicates_are_preserved() {
        let prompts = PromptBuilder::build(&labels(&["cat", "cat"])).unwrap();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], prompts[1]);
    }
}
