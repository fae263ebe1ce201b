// ============================================================
// Layer 4 — Classification Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<FeatureRow>
// into device tensors.
//
//   Input:  N rows, each with sequences of length S
//   Output: ClassificationBatch with
//             input_ids / attention_mask / token_type_ids  [N, S]
//             labels                                       [N]
//             ambiguity (only if every row has a score)    [N]
//
// Rows are already padded to S by the feature converter, so the
// batcher only flattens and reshapes.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::FeatureRow;

#[derive(Debug, Clone)]
pub struct ClassificationBatch<B: Backend> {
    pub input_ids:      Tensor<B, 2, Int>,
    pub attention_mask: Tensor<B, 2, Int>,
    pub token_type_ids: Tensor<B, 2, Int>,
    pub labels:         Tensor<B, 1, Int>,
    pub ambiguity:      Option<Tensor<B, 1, Int>>,
}

impl<B: Backend> ClassificationBatch<B> {
    pub fn size(&self) -> usize {
        self.labels.dims()[0]
    }
}

/// Holds the target device so tensors land on the right GPU/CPU
#[derive(Clone, Debug)]
pub struct ClassificationBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> ClassificationBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    fn matrix(&self, flat: Vec<i64>, rows: usize, cols: usize) -> Tensor<B, 2, Int> {
        Tensor::<B, 1, Int>::from_ints(flat.as_slice(), &self.device).reshape([rows, cols])
    }
}

/// Concatenate one per-row field into a row-major buffer
fn flatten<F>(items: &[FeatureRow], field: F) -> Vec<i64>
where
    F: Fn(&FeatureRow) -> &[i64],
{
    items.iter().flat_map(|r| field(r).iter().copied()).collect()
}

impl<B: Backend> Batcher<FeatureRow, ClassificationBatch<B>> for ClassificationBatcher<B> {
    fn batch(&self, items: Vec<FeatureRow>) -> ClassificationBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map_or(0, |r| r.input_ids.len());

        let input_ids      = flatten(&items, |r| r.input_ids.as_slice());
        let attention_mask = flatten(&items, |r| r.attention_mask.as_slice());
        let token_type_ids = flatten(&items, |r| r.token_type_ids.as_slice());

        let labels: Vec<i64> = items.iter().map(|r| r.label).collect();
        let ambiguity: Option<Vec<i64>> = items.iter().map(|r| r.ambiguity).collect();

        ClassificationBatch {
            input_ids:      self.matrix(input_ids, batch_size, seq_len),
            attention_mask: self.matrix(attention_mask, batch_size, seq_len),
            token_type_ids: self.matrix(token_type_ids, batch_size, seq_len),
            labels:         Tensor::<B, 1, Int>::from_ints(labels.as_slice(), &self.device),
            ambiguity:      ambiguity
                .map(|a| Tensor::<B, 1, Int>::from_ints(a.as_slice(), &self.device)),
        }
    }
}
