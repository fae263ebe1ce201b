// ============================================================
// Layer 3 — InputExample Domain Type
// ============================================================
// One raw labelled (or label-less) text instance, exactly as a
// processor read it from a delimited data file.
//
// Examples are created once per raw row, handed to the feature
// converter, and dropped afterwards. Nothing mutates them.

use serde::{Deserialize, Serialize};

/// A single example for sequence classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputExample {
    /// Unique id, conventionally `"{split}-{row_index}"`
    pub guid: String,

    /// The untokenised text of the first sequence
    pub text_a: String,

    /// Optional second sequence for pair tasks.
    /// `Some("")` is treated exactly like `None`.
    pub text_b: Option<String>,

    /// Gold label string; must appear in the task's label vocabulary
    pub label: Option<String>,
}

impl InputExample {
    /// Create a single-sentence example
    pub fn single(
        guid:   impl Into<String>,
        text_a: impl Into<String>,
        label:  impl Into<String>,
    ) -> Self {
        Self {
            guid:   guid.into(),
            text_a: text_a.into(),
            text_b: None,
            label:  Some(label.into()),
        }
    }

    /// Create a sentence-pair example
    pub fn pair(
        guid:   impl Into<String>,
        text_a: impl Into<String>,
        text_b: impl Into<String>,
        label:  impl Into<String>,
    ) -> Self {
        Self {
            guid:   guid.into(),
            text_a: text_a.into(),
            text_b: Some(text_b.into()),
            label:  Some(label.into()),
        }
    }

    /// The second sequence, if present and non-empty
    pub fn second_text(&self) -> Option<&str> {
        self.text_b.as_deref().filter(|t| !t.is_empty())
    }
}
