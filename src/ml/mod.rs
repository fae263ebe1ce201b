// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// Everything that runs tensors through a model and turns the
// results into numbers.
//
//   classifier.rs — SequenceClassifier contract, ModelInput
//                   bundle, baseline/ambiguity input schema
//
//   model.rs      — HumorDetectionModel: transformer encoder with
//                   [CLS] pooling and an optional ambiguity
//                   embedding before the classification head
//
//   evaluator.rs  — sequential, inference-only pass over an
//                   assembled dataset
//
//   aggregator.rs — per-batch loss / correct count / logits folded
//                   into run totals
//
//   metrics.rs    — confusion matrix, precision, recall, F1
//
// Reference: Burn Book §3 (Building Blocks)
//            Devlin et al. (2019) BERT

/// Model contract shared by the evaluator and any classifier
pub mod classifier;

/// Transformer encoder classification model
pub mod model;

/// Batch evaluation loop
pub mod evaluator;

/// Running aggregates and the per-run outcome
pub mod aggregator;

/// Accuracy, precision, recall and F1
pub mod metrics;
