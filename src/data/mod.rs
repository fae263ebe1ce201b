// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// Raw delimited files all the way to device tensor batches:
//
//   *.tsv (comma-delimited)
//       │
//       ▼
//   read_delimited      → rows of string cells
//       │
//       ▼
//   ProcessorKind /     → InputExample per row
//   HumorDetectionDataset  (+ ambiguity score)
//       │
//       ▼
//   convert_examples_   → fixed-length InputFeatures
//   to_features
//       │
//       ▼
//   FeatureDataset      → rectangular rows, burn Dataset
//       │
//       ▼
//   ClassificationBatcher → tensor batches for the DataLoader
//
// DatasetSource picks the legacy or the extended path.
//
// Reference: Burn Book §4 (Datasets and Dataloaders)

/// Comma-delimited file reader
pub mod reader;

/// Legacy task processors (old, new, new_clean, mnli, sst-2)
pub mod processor;

/// Examples → fixed-length features
pub mod converter;

/// Extended humor dataset with ambiguity scores
pub mod humor_dataset;

/// Assembled dataset implementing Burn's Dataset trait
pub mod dataset;

/// Implements Burn's Batcher trait to create tensor batches
pub mod batcher;

/// Legacy vs extended example-source strategy
pub mod assembler;
