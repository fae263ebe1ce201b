// ============================================================
// Layer 5 — Running Aggregates
// ============================================================
// Folds per-batch results into run totals.
//
//   summed_loss += batch mean loss       (one term per batch)
//   correct     += argmax hits
//   seen        += batch size
//   logits      ← appended row-major, kept for F1 at the end
//   labels      ← appended
//
// Final loss is the mean of per-batch mean losses, so a short
// last batch weighs as much as a full one.

use serde::{Deserialize, Serialize};

use crate::ml::metrics::ClassificationMetrics;

/// Result of evaluating one weights file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalOutcome {
    pub loss:      f64,
    pub accuracy:  f64,
    pub f1:        f64,
    pub precision: f64,
    pub recall:    f64,
    pub examples:  usize,
    pub metrics:   ClassificationMetrics,
}

#[derive(Debug, Clone, Default)]
pub struct RunningAggregates {
    summed_loss: f64,
    correct:     usize,
    seen:        usize,
    steps:       usize,
    num_classes: usize,
    expected:    usize,
    logits:      Vec<f32>,
    labels:      Vec<i64>,
}

impl RunningAggregates {
    /// Pre-size the logits/labels buffers for `examples` rows.
    /// A `num_classes` of 0 is inferred from the first batch, and the
    /// logits buffer is sized then.
    pub fn with_capacity(examples: usize, num_classes: usize) -> Self {
        Self {
            num_classes,
            expected: examples,
            logits: Vec::with_capacity(examples * num_classes),
            labels: Vec::with_capacity(examples),
            ..Self::default()
        }
    }

    /// Add one batch. `logits` is row-major with one row per label.
    pub fn fold_batch(&mut self, batch_loss: f64, correct: usize, logits: &[f32], labels: &[i64]) {
        if self.num_classes == 0 && !labels.is_empty() {
            self.num_classes = logits.len() / labels.len();
            self.logits.reserve(self.expected.max(labels.len()) * self.num_classes);
        }
        self.summed_loss += batch_loss;
        self.correct     += correct;
        self.seen        += labels.len();
        self.steps       += 1;
        self.logits.extend_from_slice(logits);
        self.labels.extend_from_slice(labels);
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn finalize(self) -> EvalOutcome {
        let loss     = if self.steps == 0 { 0.0 } else { self.summed_loss / self.steps as f64 };
        let accuracy = if self.seen == 0 { 0.0 } else { self.correct as f64 / self.seen as f64 };
        let metrics  = ClassificationMetrics::from_logits(&self.logits, self.num_classes, &self.labels);

        EvalOutcome {
            loss,
            accuracy,
            f1:        metrics.f1,
            precision: metrics.precision,
            recall:    metrics.recall,
            examples:  self.seen,
            metrics,
        }
    }
}
