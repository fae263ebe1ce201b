// ============================================================
// Layer 3 — InputFeatures Domain Type
// ============================================================
// The fixed-length numeric encoding of one InputExample:
//
//   input_ids:   [CLS] a a a [SEP] b b [SEP] 0 0 0 ... 0
//   input_mask:    1   1 1 1   1   1 1   1  0 0 0 ... 0
//   segment_ids:   0   0 0 0   0   1 1   1  0 0 0 ... 0
//
// All three sequences have length == max_seq_length.
// Padding positions carry mask 0 and token id 0.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFeatures {
    pub input_ids:   Vec<u32>,
    pub input_mask:  Vec<u32>,
    pub segment_ids: Vec<u32>,
    pub label_id:    usize,

    /// Present only for features built from the extended humor dataset
    pub ambiguity:   Option<i64>,
}

impl InputFeatures {
    /// Sequence width shared by ids, mask and segment ids
    pub fn seq_len(&self) -> usize {
        self.input_ids.len()
    }

    /// Number of real (non-padding) tokens
    pub fn real_token_count(&self) -> usize {
        self.input_mask.iter().filter(|&&m| m == 1).count()
    }

    /// True when ids, mask and segments all share one width
    pub fn is_rectangular(&self) -> bool {
        self.input_ids.len() == self.input_mask.len()
            && self.input_ids.len() == self.segment_ids.len()
    }
}
