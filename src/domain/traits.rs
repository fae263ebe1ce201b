// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// The two capability sets the rest of the system programs against:
//
//   DataProcessor    — a source of labelled examples for one task
//                      (implemented by ProcessorKind and by the
//                      extended HumorDetectionDataset)
//   SubwordTokenizer — text → subword tokens → vocabulary ids
//                      (implemented by PretrainedTokenizer)
//
// The model contract lives in ml::classifier because it is the
// only abstraction that has to speak in burn tensors.

use std::path::Path;

use crate::domain::error::EvalError;
use crate::domain::example::InputExample;

// ─── DataProcessor ────────────────────────────────────────────────────────────
/// Reads the train/dev split of one task and names its label vocabulary.
pub trait DataProcessor {
    /// Examples from the task's training file, in file row order
    fn train_examples(&self, data_dir: &Path) -> Result<Vec<InputExample>, EvalError>;

    /// Examples from the task's dev file, in file row order
    fn dev_examples(&self, data_dir: &Path) -> Result<Vec<InputExample>, EvalError>;

    /// Ordered label strings; position defines the integer label id
    fn labels(&self) -> Vec<String>;
}

// ─── SubwordTokenizer ─────────────────────────────────────────────────────────
/// Black-box subword tokenizer.
pub trait SubwordTokenizer {
    /// Split text into subword tokens (no special tokens added)
    fn tokenize(&self, text: &str) -> Result<Vec<String>, EvalError>;

    /// Map tokens to vocabulary ids, one id per token
    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>, EvalError>;
}
