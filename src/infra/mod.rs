// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
// Concerns shared by the application layer that touch disk or
// network:
//
//   checkpoint.rs      — restores weights into a fresh model with
//                        Burn's CompactRecorder; reads the model
//                        architecture from JSON
//
//   tokenizer_store.rs — resolves a vocabulary identifier into a
//                        HuggingFace tokenizer behind SubwordTokenizer
//
//   report.rs          — appends per-weights results to a CSV file
//
// Errors here are anyhow::Error with context; the caller decides
// whether a failure is fatal.

/// Model weight and architecture loading
pub mod checkpoint;

/// Pretrained tokenizer loading
pub mod tokenizer_store;

/// Results CSV logger
pub mod report;
