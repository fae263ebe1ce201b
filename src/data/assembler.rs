// ============================================================
// Layer 4 — Dataset Assembler
// ============================================================
// Picks one of two example-source strategies and turns its
// output into an assembled FeatureDataset:
//
//   Legacy   → ProcessorKind dev examples → features
//              → 4 fields (ids, mask, segments, label)
//
//   Extended → HumorDetectionDataset split → scored features
//              → 5 fields (ids, mask, segments, label, ambiguity)

use std::path::{Path, PathBuf};

use crate::data::converter::convert_examples_to_features;
use crate::data::dataset::FeatureDataset;
use crate::data::humor_dataset::{convert_dataset_to_features, HumorDetectionDataset};
use crate::data::processor::ProcessorKind;
use crate::domain::error::EvalError;
use crate::domain::traits::{DataProcessor, SubwordTokenizer};

#[derive(Debug, Clone)]
pub enum DatasetSource {
    Legacy {
        data_dir:       PathBuf,
        task:           ProcessorKind,
        max_seq_length: usize,
    },
    Extended(HumorDetectionDataset),
}

impl DatasetSource {
    pub fn legacy(data_dir: impl Into<PathBuf>, task: ProcessorKind, max_seq_length: usize) -> Self {
        DatasetSource::Legacy {
            data_dir: data_dir.into(),
            task,
            max_seq_length,
        }
    }

    /// Build the assembled dataset for evaluation
    pub fn build<T>(&self, tokenizer: &T) -> Result<FeatureDataset, EvalError>
    where
        T: SubwordTokenizer + ?Sized,
    {
        match self {
            DatasetSource::Legacy { data_dir, task, max_seq_length } => {
                tracing::info!("Using legacy {} loader for '{}'", task, data_dir.display());
                build_legacy(data_dir, *task, *max_seq_length, tokenizer)
            }
            DatasetSource::Extended(dataset) => {
                tracing::info!("Creating features from the humor detection dataset");
                let features = convert_dataset_to_features(dataset, tokenizer)?;
                FeatureDataset::from_features(&features, true)
            }
        }
    }
}

fn build_legacy<T>(
    data_dir:       &Path,
    task:           ProcessorKind,
    max_seq_length: usize,
    tokenizer:      &T,
) -> Result<FeatureDataset, EvalError>
where
    T: SubwordTokenizer + ?Sized,
{
    let label_list = task.labels();
    let examples   = task.dev_examples(data_dir)?;
    let features   = convert_examples_to_features(&examples, &label_list, max_seq_length, tokenizer)?;
    FeatureDataset::from_features(&features, false)
}
