// ============================================================
// Layer 6 — Results Logger
// ============================================================
// Appends one CSV row per evaluated weights file.
//
// Example CSV output:
//   weights,loss,accuracy,f1,precision,recall
//   out/model_csi_1.mpk,0.512300,0.781000,0.802100,0.774000,0.832300
//   out/model_csi_2.mpk,0.498700,0.790000,0.811000,0.780100,0.844600
//
// The header is written only when the file is new, so repeated
// runs accumulate in the same file.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::ml::aggregator::EvalOutcome;

pub const RESULTS_HEADER: &str = "weights,loss,accuracy,f1,precision,recall";

pub struct ResultsLogger {
    csv_path: PathBuf,
}

impl ResultsLogger {
    pub fn new(csv_path: impl Into<PathBuf>) -> Result<Self> {
        let csv_path = csv_path.into();

        if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create '{}'", parent.display()))?;
        }

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create results CSV '{}'", csv_path.display()))?;
            writeln!(f, "{RESULTS_HEADER}")?;
            tracing::debug!("Created results CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    pub fn log(&self, weights: &Path, outcome: &EvalOutcome) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)
            .with_context(|| format!("Cannot open results CSV '{}'", self.csv_path.display()))?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6},{:.6}",
            weights.display(),
            outcome.loss,
            outcome.accuracy,
            outcome.f1,
            outcome.precision,
            outcome.recall,
        )?;

        tracing::debug!("Logged results for '{}'", weights.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::metrics::ClassificationMetrics;

    fn outcome(loss: f64) -> EvalOutcome {
        let metrics = ClassificationMetrics::from_predictions(&[1, 1], &[1, 0], 2);
        EvalOutcome {
            loss,
            accuracy:  metrics.accuracy,
            f1:        metrics.f1,
            precision: metrics.precision,
            recall:    metrics.recall,
            examples:  2,
            metrics,
        }
    }

    #[test]
    fn test_header_written_once_and_rows_appended() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs").join("results.csv");

        ResultsLogger::new(&path).unwrap().log(Path::new("w1.mpk"), &outcome(0.25)).unwrap();
        ResultsLogger::new(&path).unwrap().log(Path::new("w2.mpk"), &outcome(0.5)).unwrap();

        let text  = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], RESULTS_HEADER);
        assert_eq!(lines[1], "w1.mpk,0.250000,0.500000,0.666667,0.500000,1.000000");
        assert!(lines[2].starts_with("w2.mpk,0.500000,"));
    }
}
