// ============================================================
// Layer 1 — CLI Arguments
// ============================================================
// Every flag of the evaluation command. Weights files are given
// as one comma-separated list and evaluated in order.
//
// clap's derive macros generate --help, missing-argument errors
// and string → number conversion.

use clap::Args;
use crate::application::eval_use_case::EvalConfig;

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Directory holding the split files. A path containing
    /// "baseline_" evaluates without ambiguity scores.
    #[arg(long)]
    pub data_dir: String,

    /// Tokenizer: a tokenizer.json, a directory holding one, or a
    /// hub model name such as bert-base-uncased
    #[arg(long)]
    pub bert_model: String,

    /// Comma-separated weights files to evaluate
    #[arg(long, required = true, value_delimiter = ',')]
    pub model_weights: Vec<String>,

    /// Total tokens per sequence after WordPiece tokenisation,
    /// including [CLS]/[SEP]; shorter inputs are padded
    #[arg(long, default_value_t = 128)]
    pub max_seq_length: usize,

    #[arg(long, default_value_t = 8)]
    pub eval_batch_size: usize,

    /// Lowercase text before tokenising (uncased vocabularies)
    #[arg(long)]
    pub do_lower_case: bool,

    /// Read dev examples through the legacy task processors
    #[arg(long)]
    pub old_load: bool,

    /// Read *_clean.tsv instead of *_wordnet_amb.tsv
    #[arg(long)]
    pub use_clean_data: bool,

    /// Plain classifier without the ambiguity embedding
    #[arg(long)]
    pub bert_base: bool,

    /// Run on CPU even when a GPU is available
    #[arg(long)]
    pub no_cuda: bool,

    /// Accepted for compatibility; precision follows the backend
    #[arg(long)]
    pub fp16: bool,

    /// Accepted for compatibility; 0 means dynamic scaling
    #[arg(long, default_value_t = 0.0)]
    pub loss_scale: f32,

    /// Legacy task (old, new, new_clean, mnli, sst-2); derived from
    /// the weights names when absent
    #[arg(long)]
    pub task_name: Option<String>,

    /// Ambiguity function (none, csi, wn, tf-idf); derived from the
    /// weights names when absent
    #[arg(long)]
    pub ambiguity_fn: Option<String>,

    /// JSON model architecture; overrides the flags below
    #[arg(long)]
    pub model_config: Option<String>,

    #[arg(long, default_value_t = 256)]
    pub d_model: usize,

    /// d_model must be divisible by num_heads
    #[arg(long, default_value_t = 8)]
    pub num_heads: usize,

    #[arg(long, default_value_t = 6)]
    pub num_layers: usize,

    #[arg(long, default_value_t = 1024)]
    pub d_ff: usize,

    /// Defaults to the tokenizer's vocabulary size
    #[arg(long)]
    pub vocab_size: Option<usize>,

    /// Append one row per weights file to this CSV
    #[arg(long)]
    pub results_csv: Option<String>,

    /// Hide the progress bar
    #[arg(long)]
    pub quiet: bool,
}

/// The application layer never sees clap types.
impl From<EvalArgs> for EvalConfig {
    fn from(a: EvalArgs) -> Self {
        EvalConfig {
            data_dir:        a.data_dir,
            bert_model:      a.bert_model,
            model_weights:   a.model_weights,
            max_seq_length:  a.max_seq_length,
            eval_batch_size: a.eval_batch_size,
            do_lower_case:   a.do_lower_case,
            old_load:        a.old_load,
            use_clean_data:  a.use_clean_data,
            bert_base:       a.bert_base,
            no_cuda:         a.no_cuda,
            fp16:            a.fp16,
            loss_scale:      a.loss_scale,
            task_name:       a.task_name,
            ambiguity_fn:    a.ambiguity_fn,
            model_config:    a.model_config,
            d_model:         a.d_model,
            num_heads:       a.num_heads,
            num_layers:      a.num_layers,
            d_ff:            a.d_ff,
            vocab_size:      a.vocab_size,
            results_csv:     a.results_csv,
            quiet:           a.quiet,
        }
    }
}
