// ============================================================
// Layer 2 — EvalUseCase
// ============================================================
// Evaluates one or more weights files against the same data:
//
//   Step 1: Derive the run plan once     (task, ambiguity fn, schema)
//   Step 2: Load tokenizer               (Layer 6 - infra)
//   Step 3: Assemble the feature dataset (Layer 4 - data)
//   Step 4: For each weights file, inside its own tracing span:
//             build a fresh model        (Layer 5 - ml)
//             load weights               (Layer 6 - infra)
//             run the batch evaluator    (Layer 5 - ml)
//             append to results CSV      (Layer 6 - infra)
//
// Runs share only the read-only dataset; the model and the
// running aggregates are rebuilt for every weights file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use burn::{data::dataset::Dataset, prelude::*};

use crate::data::{
    assembler::DatasetSource,
    dataset::FeatureDataset,
    humor_dataset::{AmbiguityFn, HumorDetectionDataset, Split},
    processor::ProcessorKind,
};
use crate::domain::traits::DataProcessor;
use crate::infra::{
    checkpoint::CheckpointManager,
    report::ResultsLogger,
    tokenizer_store::TokenizerStore,
};
use crate::ml::{
    aggregator::EvalOutcome,
    classifier::InputSchema,
    evaluator::BatchEvaluator,
    model::HumorDetectionConfig,
};

// ─── Evaluation Configuration ────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub data_dir:        String,
    pub bert_model:      String,
    pub model_weights:   Vec<String>,
    pub max_seq_length:  usize,
    pub eval_batch_size: usize,
    pub do_lower_case:   bool,
    pub old_load:        bool,
    pub use_clean_data:  bool,
    pub bert_base:       bool,
    pub no_cuda:         bool,
    pub fp16:            bool,
    pub loss_scale:      f32,
    /// Overrides the task picked from the weights names
    pub task_name:       Option<String>,
    /// Overrides the ambiguity function picked from the weights names
    pub ambiguity_fn:    Option<String>,
    pub model_config:    Option<String>,
    pub d_model:         usize,
    pub num_heads:       usize,
    pub num_layers:      usize,
    pub d_ff:            usize,
    /// Defaults to the tokenizer's vocabulary size
    pub vocab_size:      Option<usize>,
    pub results_csv:     Option<String>,
    pub quiet:           bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            data_dir:        "data".to_string(),
            bert_model:      "bert-base-uncased".to_string(),
            model_weights:   Vec::new(),
            max_seq_length:  128,
            eval_batch_size: 8,
            do_lower_case:   false,
            old_load:        false,
            use_clean_data:  false,
            bert_base:       false,
            no_cuda:         false,
            fp16:            false,
            loss_scale:      0.0,
            task_name:       None,
            ambiguity_fn:    None,
            model_config:    None,
            d_model:         256,
            num_heads:       8,
            num_layers:      6,
            d_ff:            1024,
            vocab_size:      None,
            results_csv:     None,
            quiet:           false,
        }
    }
}

// ─── Run Plan ────────────────────────────────────────────────────────────────
/// Choices made once per invocation, before any weights file is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalPlan {
    pub task:          ProcessorKind,
    pub ambiguity_fn:  AmbiguityFn,
    pub schema:        InputSchema,
    pub use_ambiguity: bool,
}

impl EvalPlan {
    pub fn from_config(cfg: &EvalConfig) -> Result<Self> {
        let weights = cfg.model_weights.join(",");

        let task = match &cfg.task_name {
            Some(name) => name.parse()?,
            None       => ProcessorKind::from_weights_name(&weights),
        };
        let ambiguity_fn = match &cfg.ambiguity_fn {
            Some(name) => name.parse()?,
            None       => AmbiguityFn::from_weights_name(&weights),
        };

        Ok(Self {
            task,
            ambiguity_fn,
            schema:        InputSchema::from_data_dir(Path::new(&cfg.data_dir)),
            use_ambiguity: !cfg.bert_base && !ambiguity_fn.is_none(),
        })
    }

    pub fn num_labels(&self, old_load: bool) -> usize {
        if old_load { self.task.labels().len() } else { 2 }
    }
}

/// Outcome of evaluating one weights file
#[derive(Debug, Clone)]
pub struct RunReport {
    pub weights: PathBuf,
    pub outcome: EvalOutcome,
}

// ─── EvalUseCase ─────────────────────────────────────────────────────────────
pub struct EvalUseCase {
    config: EvalConfig,
}

impl EvalUseCase {
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }

    /// Evaluate every weights file; `on_report` sees each result as
    /// soon as its run finishes.
    pub fn execute<F>(&self, on_report: F) -> Result<Vec<RunReport>>
    where
        F: FnMut(&RunReport),
    {
        if self.config.no_cuda {
            tracing::info!("Using NdArray CPU device");
            self.execute_on::<burn::backend::NdArray, F>(Default::default(), on_report)
        } else {
            let device = burn::backend::wgpu::WgpuDevice::default();
            tracing::info!("Using WGPU device: {:?}", device);
            self.execute_on::<burn::backend::Wgpu, F>(device, on_report)
        }
    }

    pub fn execute_on<B, F>(&self, device: B::Device, mut on_report: F) -> Result<Vec<RunReport>>
    where
        B: Backend,
        F: FnMut(&RunReport),
    {
        let cfg = &self.config;
        if cfg.model_weights.is_empty() {
            anyhow::bail!("no model weights given");
        }
        if cfg.fp16 || cfg.loss_scale != 0.0 {
            tracing::info!(
                "fp16={}, loss_scale={} are left to the backend's default precision",
                cfg.fp16,
                cfg.loss_scale
            );
        }

        // ── Step 1: Run plan ─────────────────────────────────────────────────
        let plan = EvalPlan::from_config(cfg)?;
        tracing::info!(
            "task={}, ambiguity_fn={}, schema={:?}, ambiguity embedding={}",
            plan.task,
            plan.ambiguity_fn,
            plan.schema,
            plan.use_ambiguity
        );

        // ── Step 2: Tokenizer ────────────────────────────────────────────────
        let tokenizer = TokenizerStore::load(&cfg.bert_model, cfg.do_lower_case)?;

        // ── Step 3: Assembled dataset (built once, shared by all runs) ───────
        let dataset = self.source(&plan).build(&tokenizer)?;
        tracing::info!("Assembled {} examples ({} fields each)", dataset.len(), dataset.field_count());

        let model_cfg = self.model_config(&plan, tokenizer.vocab_size())?;
        model_cfg.check_inputs(dataset.max_input_id(), dataset.seq_len())?;
        let evaluator = BatchEvaluator::<B>::new(device.clone(), cfg.eval_batch_size)?
            .with_progress(!cfg.quiet);
        let ckpt      = CheckpointManager::new();
        let results   = cfg.results_csv.as_ref().map(ResultsLogger::new).transpose()?;

        // ── Step 4: One independent run per weights file ─────────────────────
        let mut reports = Vec::with_capacity(cfg.model_weights.len());
        for weights in &cfg.model_weights {
            let weights = PathBuf::from(weights.trim());
            let span    = tracing::info_span!("evaluation", weights = %weights.display());
            let _guard  = span.enter();

            tracing::info!("Evaluating model: {}", weights.display());
            let model = model_cfg.init::<B>(&device);
            let model = ckpt.load_weights(model, &weights, &device)?;

            let outcome = evaluator
                .evaluate(&model, dataset.clone(), plan.schema)
                .with_context(|| format!("Evaluation of '{}' failed", weights.display()))?;
            tracing::info!(
                "loss={:.4}, accuracy={:.4}, f1={:.4}",
                outcome.loss,
                outcome.accuracy,
                outcome.f1
            );

            if let Some(logger) = &results {
                logger.log(&weights, &outcome)?;
            }

            let report = RunReport { weights, outcome };
            on_report(&report);
            reports.push(report);
        }

        Ok(reports)
    }

    fn source(&self, plan: &EvalPlan) -> DatasetSource {
        let cfg = &self.config;
        if cfg.old_load {
            DatasetSource::legacy(&cfg.data_dir, plan.task, cfg.max_seq_length)
        } else {
            DatasetSource::Extended(HumorDetectionDataset::new(
                &cfg.data_dir,
                cfg.max_seq_length,
                Split::Test,
                plan.ambiguity_fn,
                cfg.use_clean_data,
            ))
        }
    }

    fn model_config(&self, plan: &EvalPlan, tokenizer_vocab: usize) -> Result<HumorDetectionConfig> {
        let cfg  = &self.config;
        let base = match &cfg.model_config {
            Some(path) => CheckpointManager::load_model_config(Path::new(path))?,
            None => HumorDetectionConfig::new(
                cfg.vocab_size.unwrap_or(tokenizer_vocab),
                cfg.max_seq_length,
                cfg.d_model,
                cfg.num_heads,
                cfg.num_layers,
                cfg.d_ff,
            )
            .with_num_labels(plan.num_labels(cfg.old_load)),
        };
        Ok(base.with_use_ambiguity(plan.use_ambiguity))
    }

    /// The assembled dataset alone, without any model
    pub fn assemble(&self) -> Result<FeatureDataset> {
        let plan      = EvalPlan::from_config(&self.config)?;
        let tokenizer = TokenizerStore::load(&self.config.bert_model, self.config.do_lower_case)?;
        Ok(self.source(&plan).build(&tokenizer)?)
    }
}
