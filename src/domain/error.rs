// ============================================================
// Layer 3 — Evaluation Errors
// ============================================================
// Every failure in the pipeline is fatal and surfaces to the
// command. Nothing here is retried or silently skipped.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("data file not found: {path}")]
    DataFileNotFound { path: PathBuf },

    #[error("{path}: row {row} has {found} columns but column {needed} is required")]
    Parse {
        path:   PathBuf,
        row:    usize,
        needed: usize,
        found:  usize,
    },

    #[error("{path}: row {row} has non-integer ambiguity score {value:?}")]
    InvalidScore {
        path:  PathBuf,
        row:   usize,
        value: String,
    },

    #[error("label {label:?} of example {guid} is not in the label vocabulary {vocabulary:?}")]
    InvalidLabel {
        guid:       String,
        label:      String,
        vocabulary: Vec<String>,
    },

    #[error("example {guid} has no label")]
    MissingLabel { guid: String },

    #[error("max_seq_length {max_seq_length} cannot hold the {reserved} special tokens")]
    SequenceTooShort {
        max_seq_length: usize,
        reserved:       usize,
    },

    #[error("row {row}: field {field} has width {actual} but the dataset width is {expected}")]
    ShapeMismatch {
        field:    &'static str,
        row:      usize,
        expected: usize,
        actual:   usize,
    },

    #[error("index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("token id {max_id} does not fit a model vocabulary of {vocab_size}")]
    VocabularyTooSmall { max_id: i64, vocab_size: usize },

    #[error("sequence length {seq_len} exceeds the model's {max_seq_len} positions")]
    SequenceExceedsModel { seq_len: usize, max_seq_len: usize },

    #[error("eval batch size must be at least 1")]
    InvalidBatchSize,

    #[error("cannot evaluate an empty dataset")]
    EmptyDataset,

    #[error("model input requires ambiguity scores but the dataset has none")]
    MissingAmbiguityScores,

    #[error("unknown {kind} {value:?}")]
    UnknownVariant { kind: &'static str, value: String },

    #[error("tokenizer failure: {0}")]
    Tokenizer(String),

    #[error("failed to read tensor data: {0}")]
    TensorData(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv read failed for {path}: {source}")]
    Csv {
        path:   PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Raised by the model collaborator, passed through unchanged
    #[error(transparent)]
    ModelInvocation(anyhow::Error),
}
