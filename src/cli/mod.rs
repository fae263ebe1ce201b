// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Parses arguments with clap, hands an EvalConfig to Layer 2 and
// prints each result as it arrives:
//
//   Evaluating model: <path>
//   Loss: <loss>
//   Accuracy: <accuracy>
//   F1 <f1>

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::EvalArgs;

use crate::application::eval_use_case::{EvalUseCase, RunReport};

#[derive(Parser, Debug)]
#[command(
    name = "humor-eval",
    version = "0.1.0",
    about = "Evaluate trained humor/ambiguity classifiers: loss, accuracy and F1 per weights file."
)]
pub struct Cli {
    #[command(flatten)]
    pub args: EvalArgs,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        tracing::info!("Evaluating against data in: {}", self.args.data_dir);

        let use_case = EvalUseCase::new(self.args.into());
        use_case.execute(print_report)?;
        Ok(())
    }
}

fn print_report(report: &RunReport) {
    println!("Evaluating model: {}", report.weights.display());
    println!("Loss: {}", report.outcome.loss);
    println!("Accuracy: {}", report.outcome.accuracy);
    println!("F1 {}", report.outcome.f1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::eval_use_case::EvalConfig;

    #[test]
    fn test_weights_list_and_defaults() {
        let cli = Cli::try_parse_from([
            "humor-eval",
            "--data-dir", "data/humor",
            "--bert-model", "bert-base-uncased",
            "--model-weights", "out/m_csi_1,out/m_csi_2",
        ])
        .unwrap();

        let cfg: EvalConfig = cli.args.into();
        assert_eq!(cfg.model_weights, vec!["out/m_csi_1", "out/m_csi_2"]);
        assert_eq!(cfg.max_seq_length, 128);
        assert_eq!(cfg.eval_batch_size, 8);
        assert_eq!(cfg.loss_scale, 0.0);
        assert!(!cfg.old_load && !cfg.no_cuda && !cfg.quiet);
    }

    #[test]
    fn test_weights_are_required() {
        assert!(Cli::try_parse_from([
            "humor-eval", "--data-dir", "d", "--bert-model", "b",
        ])
        .is_err());
    }
}
