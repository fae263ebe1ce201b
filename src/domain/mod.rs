// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust structs, errors, and traits describing what the
// evaluator works with. No burn types and no file I/O here.
//
//   example.rs — InputExample, one raw labelled text instance
//   feature.rs — InputFeatures, its fixed-length numeric encoding
//   error.rs   — EvalError, the pipeline's error taxonomy
//   traits.rs  — DataProcessor and SubwordTokenizer capabilities

pub mod error;
pub mod example;
pub mod feature;
pub mod traits;
