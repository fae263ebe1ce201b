// ============================================================
// Layer 4 — Assembled Feature Dataset
// ============================================================
// Stacks InputFeatures into parallel, flat, row-major buffers:
//
//   input_ids      [N * S]
//   attention_mask [N * S]
//   token_type_ids [N * S]
//   labels         [N]
//   ambiguity      [N]      (extended strategy only)
//
// The shape is checked once here, at assembly time: every row
// must share the same sequence width S, and when the ambiguity
// field is present every row must carry a score.
//
// Implements burn's Dataset trait so the DataLoader can call
// .get(index) and .len() on it.

use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

use crate::domain::error::EvalError;
use crate::domain::feature::InputFeatures;

/// One row of the assembled dataset, fields aligned by index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub input_ids:      Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
    pub label:          i64,
    pub ambiguity:      Option<i64>,
}

#[derive(Debug, Clone)]
pub struct FeatureDataset {
    seq_len:        usize,
    len:            usize,
    input_ids:      Vec<i64>,
    attention_mask: Vec<i64>,
    token_type_ids: Vec<i64>,
    labels:         Vec<i64>,
    ambiguity:      Option<Vec<i64>>,
}

impl FeatureDataset {
    /// Stack features into tensors. `with_ambiguity` selects the
    /// five-field layout; otherwise any scores on the features are ignored.
    pub fn from_features(
        features:       &[InputFeatures],
        with_ambiguity: bool,
    ) -> Result<Self, EvalError> {
        let len     = features.len();
        let seq_len = features.first().map_or(0, InputFeatures::seq_len);

        let mut input_ids      = Vec::with_capacity(len * seq_len);
        let mut attention_mask = Vec::with_capacity(len * seq_len);
        let mut token_type_ids = Vec::with_capacity(len * seq_len);
        let mut labels         = Vec::with_capacity(len);
        let mut ambiguity      = with_ambiguity.then(|| Vec::with_capacity(len));

        for (row, f) in features.iter().enumerate() {
            check_width("input_ids",   row, seq_len, f.input_ids.len())?;
            check_width("input_mask",  row, seq_len, f.input_mask.len())?;
            check_width("segment_ids", row, seq_len, f.segment_ids.len())?;

            input_ids.extend(f.input_ids.iter().map(|&x| i64::from(x)));
            attention_mask.extend(f.input_mask.iter().map(|&x| i64::from(x)));
            token_type_ids.extend(f.segment_ids.iter().map(|&x| i64::from(x)));
            labels.push(f.label_id as i64);

            if let Some(scores) = ambiguity.as_mut() {
                let score = f.ambiguity.ok_or(EvalError::ShapeMismatch {
                    field:    "ambiguity",
                    row,
                    expected: 1,
                    actual:   0,
                })?;
                scores.push(score);
            }
        }

        tracing::debug!(
            "Assembled dataset: {} rows x {} tokens, ambiguity={}",
            len,
            seq_len,
            with_ambiguity
        );

        Ok(Self {
            seq_len,
            len,
            input_ids,
            attention_mask,
            token_type_ids,
            labels,
            ambiguity,
        })
    }

    pub fn seq_len(&self) -> usize {
        self.seq_len
    }

    /// Largest token id in any row
    pub fn max_input_id(&self) -> Option<i64> {
        self.input_ids.iter().copied().max()
    }

    pub fn has_ambiguity(&self) -> bool {
        self.ambiguity.is_some()
    }

    /// Number of fields per row (4 legacy, 5 extended)
    pub fn field_count(&self) -> usize {
        if self.has_ambiguity() { 5 } else { 4 }
    }

    /// Random access with an explicit out-of-range error
    pub fn row(&self, index: usize) -> Result<FeatureRow, EvalError> {
        if index >= self.len {
            return Err(EvalError::IndexOutOfRange { index, len: self.len });
        }
        let span = index * self.seq_len..(index + 1) * self.seq_len;
        Ok(FeatureRow {
            input_ids:      self.input_ids[span.clone()].to_vec(),
            attention_mask: self.attention_mask[span.clone()].to_vec(),
            token_type_ids: self.token_type_ids[span].to_vec(),
            label:          self.labels[index],
            ambiguity:      self.ambiguity.as_ref().map(|a| a[index]),
        })
    }
}

fn check_width(field: &'static str, row: usize, expected: usize, actual: usize) -> Result<(), EvalError> {
    if actual == expected {
        Ok(())
    } else {
        Err(EvalError::ShapeMismatch { field, row, expected, actual })
    }
}

impl Dataset<FeatureRow> for FeatureDataset {
    fn get(&self, index: usize) -> Option<FeatureRow> {
        self.row(index).ok()
    }

    fn len(&self) -> usize {
        self.len
    }
}
