// ============================================================
// Layer 5 — Batch Evaluator
// ============================================================
// One sequential, inference-only pass over an assembled dataset.
//
//   FeatureDataset
//       │  DataLoader (no shuffle, batch_size = eval batch size)
//       ▼
//   ClassificationBatch ──► ModelInput ──► SequenceClassifier
//                                              │ (loss, logits)
//                                              ▼
//                                      RunningAggregates
//                                              │
//                                              ▼
//                                         EvalOutcome
//
// Whether ambiguity scores go into the ModelInput is fixed by the
// InputSchema chosen before the loop starts. Any classifier error
// aborts the pass.
//
// No autodiff backend is involved, so nothing records gradients.

use burn::{data::dataloader::DataLoaderBuilder, prelude::*};
use indicatif::{ProgressBar, ProgressStyle};

use crate::data::batcher::{ClassificationBatch, ClassificationBatcher};
use crate::data::dataset::FeatureDataset;
use crate::domain::error::EvalError;
use crate::ml::aggregator::{EvalOutcome, RunningAggregates};
use crate::ml::classifier::{InputSchema, ModelInput, SequenceClassifier};

pub struct BatchEvaluator<B: Backend> {
    device:        B::Device,
    batch_size:    usize,
    show_progress: bool,
}

impl<B: Backend> BatchEvaluator<B> {
    pub fn new(device: B::Device, batch_size: usize) -> Result<Self, EvalError> {
        if batch_size == 0 {
            return Err(EvalError::InvalidBatchSize);
        }
        Ok(Self { device, batch_size, show_progress: true })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn evaluate<M>(
        &self,
        model:   &M,
        dataset: FeatureDataset,
        schema:  InputSchema,
    ) -> Result<EvalOutcome, EvalError>
    where
        M: SequenceClassifier<B>,
    {
        use burn::data::dataset::Dataset;

        let total = dataset.len();
        if total == 0 {
            return Err(EvalError::EmptyDataset);
        }
        if schema.includes_ambiguity() && !dataset.has_ambiguity() {
            return Err(EvalError::MissingAmbiguityScores);
        }

        tracing::info!("***** Running evaluation *****");
        tracing::info!("  Num examples = {}", total);
        tracing::info!("  Batch size = {}", self.batch_size);

        let loader = DataLoaderBuilder::new(ClassificationBatcher::<B>::new(self.device.clone()))
            .batch_size(self.batch_size)
            .build(dataset);

        let progress = self.progress_bar(total);
        let mut aggregates = RunningAggregates::with_capacity(total, 0);

        for batch in loader.iter() {
            let size = batch.size();
            self.step(model, batch, schema, &mut aggregates)?;
            progress.inc(size as u64);
        }
        progress.finish_and_clear();

        tracing::debug!("Folded {} batches, {} examples", aggregates.steps(), aggregates.seen());
        Ok(aggregates.finalize())
    }

    fn step<M>(
        &self,
        model:      &M,
        batch:      ClassificationBatch<B>,
        schema:     InputSchema,
        aggregates: &mut RunningAggregates,
    ) -> Result<(), EvalError>
    where
        M: SequenceClassifier<B>,
    {
        let ambiguity_scores = if schema.includes_ambiguity() {
            Some(batch.ambiguity.ok_or(EvalError::MissingAmbiguityScores)?)
        } else {
            None
        };

        let input = ModelInput {
            input_ids:      batch.input_ids,
            attention_mask: batch.attention_mask,
            token_type_ids: batch.token_type_ids,
            labels:         batch.labels.clone(),
            ambiguity_scores,
        };
        let output = model.classify(input).map_err(EvalError::ModelInvocation)?;

        // argmax(1) returns [batch, 1]; flatten to [batch] before comparing
        let correct = output.logits.clone()
            .argmax(1)
            .flatten::<1>(0, 1)
            .equal(batch.labels.clone())
            .int().sum().into_scalar().elem::<i64>();
        let batch_loss = output.loss.into_scalar().elem::<f64>();

        let logits = output.logits
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| EvalError::TensorData(format!("{e:?}")))?;
        let labels = batch.labels
            .into_data()
            .convert::<i64>()
            .to_vec::<i64>()
            .map_err(|e| EvalError::TensorData(format!("{e:?}")))?;

        aggregates.fold_batch(batch_loss, correct.max(0) as usize, &logits, &labels);
        Ok(())
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("Evaluating [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::feature::InputFeatures;
    use crate::ml::classifier::ClassifierOutput;
    use burn::backend::NdArray;
    use std::cell::RefCell;

    type TestBackend = NdArray;

    /// Always scores class 1 higher; remembers whether scores were sent
    #[derive(Default)]
    struct AlwaysPositive {
        saw_scores: RefCell<Vec<bool>>,
    }

    impl SequenceClassifier<TestBackend> for AlwaysPositive {
        fn classify(&self, input: ModelInput<TestBackend>) -> anyhow::Result<ClassifierOutput<TestBackend>> {
            self.saw_scores.borrow_mut().push(input.ambiguity_scores.is_some());
            let n      = input.labels.dims()[0];
            let device = input.labels.device();
            let row: Vec<f32> = (0..n).flat_map(|_| [0.0, 1.0]).collect();
            let logits = Tensor::<TestBackend, 1>::from_floats(row.as_slice(), &device).reshape([n, 2]);
            let loss   = Tensor::<TestBackend, 1>::from_floats([0.5], &device);
            Ok(ClassifierOutput { loss, logits })
        }
    }

    struct Exploding;

    impl SequenceClassifier<TestBackend> for Exploding {
        fn classify(&self, _input: ModelInput<TestBackend>) -> anyhow::Result<ClassifierOutput<TestBackend>> {
            anyhow::bail!("out of device memory")
        }
    }

    fn dataset(labels: &[usize], with_ambiguity: bool) -> FeatureDataset {
        let features: Vec<InputFeatures> = labels
            .iter()
            .map(|&label| InputFeatures {
                input_ids:   vec![101, 2000 + label as u32, 102, 0],
                input_mask:  vec![1, 1, 1, 0],
                segment_ids: vec![0; 4],
                label_id:    label,
                ambiguity:   Some(label as i64),
            })
            .collect();
        FeatureDataset::from_features(&features, with_ambiguity).unwrap()
    }

    fn evaluator(batch_size: usize) -> BatchEvaluator<TestBackend> {
        BatchEvaluator::new(Default::default(), batch_size).unwrap().with_progress(false)
    }

    const SIX_POS_FOUR_NEG: [usize; 10] = [1, 0, 1, 1, 0, 1, 0, 1, 1, 0];

    #[test]
    fn test_always_positive_model() {
        let out = evaluator(8)
            .evaluate(&AlwaysPositive::default(), dataset(&SIX_POS_FOUR_NEG, false), InputSchema::Baseline)
            .unwrap();
        assert!((out.accuracy  - 0.6).abs()  < 1e-9);
        assert!((out.recall    - 1.0).abs()  < 1e-9);
        assert!((out.precision - 0.6).abs()  < 1e-9);
        assert!((out.f1        - 0.75).abs() < 1e-9);
        assert!((out.loss      - 0.5).abs()  < 1e-6);
        assert_eq!(out.examples, 10);
    }

    #[test]
    fn test_metrics_independent_of_batch_size() {
        let model = AlwaysPositive::default();
        let one   = evaluator(1).evaluate(&model, dataset(&SIX_POS_FOUR_NEG, false), InputSchema::Baseline).unwrap();
        let all   = evaluator(10).evaluate(&model, dataset(&SIX_POS_FOUR_NEG, false), InputSchema::Baseline).unwrap();
        assert_eq!(one.accuracy, all.accuracy);
        assert_eq!(one.f1, all.f1);
        assert_eq!(model.saw_scores.borrow().len(), 11);
    }

    #[test]
    fn test_baseline_schema_sends_no_scores() {
        let model = AlwaysPositive::default();
        evaluator(3).evaluate(&model, dataset(&[1, 0, 1, 0], true), InputSchema::Baseline).unwrap();
        assert!(model.saw_scores.borrow().iter().all(|&s| !s));
    }

    #[test]
    fn test_ambiguity_schema_always_sends_scores() {
        let model = AlwaysPositive::default();
        evaluator(3).evaluate(&model, dataset(&[1, 0, 1, 0], true), InputSchema::WithAmbiguity).unwrap();
        let seen = model.saw_scores.borrow();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_ambiguity_schema_without_scores_fails_fast() {
        let model = AlwaysPositive::default();
        let err = evaluator(3)
            .evaluate(&model, dataset(&[1, 0], false), InputSchema::WithAmbiguity)
            .unwrap_err();
        assert!(matches!(err, EvalError::MissingAmbiguityScores));
        assert!(model.saw_scores.borrow().is_empty());
    }

    #[test]
    fn test_empty_dataset_is_an_error() {
        let err = evaluator(8)
            .evaluate(&AlwaysPositive::default(), dataset(&[], false), InputSchema::Baseline)
            .unwrap_err();
        assert!(matches!(err, EvalError::EmptyDataset));
    }

    #[test]
    fn test_model_failure_propagates() {
        let err = evaluator(2)
            .evaluate(&Exploding, dataset(&[1, 0, 1], false), InputSchema::Baseline)
            .unwrap_err();
        assert!(matches!(err, EvalError::ModelInvocation(_)));
        assert_eq!(err.to_string(), "out of device memory");
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let err = BatchEvaluator::<TestBackend>::new(Default::default(), 0).err();
        assert!(matches!(err, Some(EvalError::InvalidBatchSize)));
    }
}
