// ============================================================
// Layer 5 — Classifier Contract
// ============================================================
// The model is a black box behind SequenceClassifier: it takes a
// ModelInput bundle and returns (loss, logits).
//
// Which input schema applies is decided once per run from the
// data directory name: a path containing "baseline_" is a
// baseline dataset and never sends ambiguity scores; every other
// path always sends them.

use std::path::Path;

use burn::prelude::*;

/// Marker in data directory names for datasets without ambiguity input
pub const BASELINE_MARKER: &str = "baseline_";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputSchema {
    /// ids, mask, segments, labels
    Baseline,
    /// ids, mask, segments, labels, ambiguity scores
    WithAmbiguity,
}

impl InputSchema {
    pub fn from_data_dir(data_dir: &Path) -> Self {
        if data_dir.to_string_lossy().contains(BASELINE_MARKER) {
            InputSchema::Baseline
        } else {
            InputSchema::WithAmbiguity
        }
    }

    pub fn includes_ambiguity(&self) -> bool {
        *self == InputSchema::WithAmbiguity
    }
}

/// Everything a classifier receives for one batch
#[derive(Debug, Clone)]
pub struct ModelInput<B: Backend> {
    pub input_ids:        Tensor<B, 2, Int>,
    pub attention_mask:   Tensor<B, 2, Int>,
    pub token_type_ids:   Tensor<B, 2, Int>,
    pub labels:           Tensor<B, 1, Int>,
    pub ambiguity_scores: Option<Tensor<B, 1, Int>>,
}

/// Mean loss over the batch (shape [1]) and raw logits [batch, classes]
#[derive(Debug, Clone)]
pub struct ClassifierOutput<B: Backend> {
    pub loss:   Tensor<B, 1>,
    pub logits: Tensor<B, 2>,
}

pub trait SequenceClassifier<B: Backend> {
    /// Run one forward pass. Errors are propagated to the caller as-is.
    fn classify(&self, input: ModelInput<B>) -> anyhow::Result<ClassifierOutput<B>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_from_data_dir() {
        assert_eq!(
            InputSchema::from_data_dir(Path::new("data/baseline_humor")),
            InputSchema::Baseline
        );
        assert_eq!(
            InputSchema::from_data_dir(Path::new("data/humor")),
            InputSchema::WithAmbiguity
        );
        assert!(!InputSchema::Baseline.includes_ambiguity());
    }
}
