// ============================================================
// Layer 5 — Classification Metrics
// ============================================================
// Reduces the full logits matrix and label vector of a run to
// precision, recall and F1.
//
//   2 classes  → binary scores with positive class = 1
//   >2 classes → macro average of one-vs-rest per-class scores
//
// Any ratio with a zero denominator resolves to 0.0.

use serde::{Deserialize, Serialize};

/// Square confusion matrix, rows = gold class, columns = predicted class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    num_classes: usize,
    cells:       Vec<usize>,
}

impl ConfusionMatrix {
    pub fn new(num_classes: usize) -> Self {
        Self { num_classes, cells: vec![0; num_classes * num_classes] }
    }

    /// Build from predicted and gold class ids. The matrix grows to
    /// cover any id beyond `num_classes` and is never smaller than 2x2.
    pub fn from_predictions(predictions: &[usize], gold: &[usize], num_classes: usize) -> Self {
        let largest = predictions.iter().chain(gold).copied().max().map_or(0, |m| m + 1);
        let mut matrix = Self::new(num_classes.max(largest).max(2));
        for (&pred, &truth) in predictions.iter().zip(gold) {
            matrix.cells[truth * matrix.num_classes + pred] += 1;
        }
        matrix
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    pub fn count(&self, gold: usize, predicted: usize) -> usize {
        self.cells[gold * self.num_classes + predicted]
    }

    pub fn total(&self) -> usize {
        self.cells.iter().sum()
    }

    pub fn correct(&self) -> usize {
        (0..self.num_classes).map(|c| self.count(c, c)).sum()
    }

    pub fn true_positives(&self, class: usize) -> usize {
        self.count(class, class)
    }

    pub fn false_positives(&self, class: usize) -> usize {
        (0..self.num_classes)
            .filter(|&g| g != class)
            .map(|g| self.count(g, class))
            .sum()
    }

    pub fn false_negatives(&self, class: usize) -> usize {
        (0..self.num_classes)
            .filter(|&p| p != class)
            .map(|p| self.count(class, p))
            .sum()
    }

    /// TP / (TP + FP) for one class
    pub fn precision(&self, class: usize) -> f64 {
        ratio(self.true_positives(class), self.true_positives(class) + self.false_positives(class))
    }

    /// TP / (TP + FN) for one class
    pub fn recall(&self, class: usize) -> f64 {
        ratio(self.true_positives(class), self.true_positives(class) + self.false_negatives(class))
    }

    pub fn f1(&self, class: usize) -> f64 {
        harmonic_mean(self.precision(class), self.recall(class))
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    let denom = precision + recall;
    if denom == 0.0 {
        return 0.0;
    }
    2.0 * precision * recall / denom
}

/// Index of the largest value in a row (first one wins on ties)
pub fn argmax(row: &[f32]) -> usize {
    row.iter()
        .enumerate()
        .fold((0, f32::NEG_INFINITY), |(best_i, best_v), (i, &v)| {
            if v > best_v { (i, v) } else { (best_i, best_v) }
        })
        .0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Averaging {
    /// Positive class is label 1
    Binary,
    /// Unweighted mean over classes
    Macro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    pub accuracy:  f64,
    pub precision: f64,
    pub recall:    f64,
    pub f1:        f64,
    pub averaging: Averaging,
    pub confusion: ConfusionMatrix,
}

impl ClassificationMetrics {
    /// `logits` is row-major with `num_classes` columns; `labels` has one
    /// entry per row.
    pub fn from_logits(logits: &[f32], num_classes: usize, labels: &[i64]) -> Self {
        let predictions: Vec<usize> = logits.chunks(num_classes.max(1)).map(argmax).collect();
        let gold: Vec<usize> = labels.iter().map(|&l| l.max(0) as usize).collect();
        Self::from_predictions(&predictions, &gold, num_classes)
    }

    pub fn from_predictions(predictions: &[usize], gold: &[usize], num_classes: usize) -> Self {
        let confusion = ConfusionMatrix::from_predictions(predictions, gold, num_classes);
        let accuracy  = ratio(confusion.correct(), confusion.total());

        let (averaging, precision, recall, f1) = if confusion.num_classes() <= 2 {
            (Averaging::Binary, confusion.precision(1), confusion.recall(1), confusion.f1(1))
        } else {
            let k    = confusion.num_classes() as f64;
            let mean = |score: &dyn Fn(usize) -> f64| {
                (0..confusion.num_classes()).map(score).sum::<f64>() / k
            };
            (
                Averaging::Macro,
                mean(&|c| confusion.precision(c)),
                mean(&|c| confusion.recall(c)),
                mean(&|c| confusion.f1(c)),
            )
        };

        Self { accuracy, precision, recall, f1, averaging, confusion }
    }
}
