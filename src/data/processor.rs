// ============================================================
// Layer 4 — Task Processors
// ============================================================
// The closed set of legacy example sources. Each variant knows
// its file names, its column layout, whether row 0 is a header,
// and its label vocabulary.
//
//   Variant    task name    files                                   header
//   ────────   ─────────    ──────────────────────────────────────  ──────
//   Old        "old"        train.tsv / dev.tsv                     no
//   NewClean   "new_clean"  train_clean.tsv / dev_clean.tsv         no
//   New        "new"        train_wordnet_amb.tsv / dev_wordnet_... no
//   Mnli       "mnli"       train.tsv / dev_matched.tsv             yes
//   Sst2       "sst-2"      train.tsv / dev.tsv                     yes

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::data::reader::{read_delimited, RawRows};
use crate::domain::error::EvalError;
use crate::domain::example::InputExample;
use crate::domain::traits::DataProcessor;

/// Column of the label in the humor layouts
pub const HUMOR_LABEL_COL: usize = 1;
/// Column of the text in the humor layouts
pub const HUMOR_TEXT_COL:  usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorKind {
    Old,
    NewClean,
    New,
    Mnli,
    Sst2,
}

impl ProcessorKind {
    /// Pick the legacy task from the weight-file naming convention:
    /// `new_clean` wins over `new`, anything else is `old`.
    pub fn from_weights_name(weights: &str) -> Self {
        if weights.contains("new_clean") {
            ProcessorKind::NewClean
        } else if weights.contains("new") {
            ProcessorKind::New
        } else {
            ProcessorKind::Old
        }
    }

    fn file_names(&self) -> (&'static str, &'static str) {
        match self {
            ProcessorKind::Old      => ("train.tsv", "dev.tsv"),
            ProcessorKind::NewClean => ("train_clean.tsv", "dev_clean.tsv"),
            ProcessorKind::New      => ("train_wordnet_amb.tsv", "dev_wordnet_amb.tsv"),
            ProcessorKind::Mnli     => ("train.tsv", "dev_matched.tsv"),
            ProcessorKind::Sst2     => ("train.tsv", "dev.tsv"),
        }
    }

    fn dev_set_type(&self) -> &'static str {
        match self {
            ProcessorKind::Mnli => "dev_matched",
            _                   => "dev",
        }
    }

    fn skips_header(&self) -> bool {
        matches!(self, ProcessorKind::Mnli | ProcessorKind::Sst2)
    }

    fn read_split(&self, path: &Path, set_type: &str) -> Result<Vec<InputExample>, EvalError> {
        let raw = read_delimited(path, None)?;
        let examples = self.create_examples(&raw, set_type)?;
        tracing::info!(
            "{} examples read from '{}' ({:?})",
            examples.len(),
            path.display(),
            self
        );
        Ok(examples)
    }

    /// Turn raw rows into examples, in row order.
    pub fn create_examples(
        &self,
        raw:      &RawRows,
        set_type: &str,
    ) -> Result<Vec<InputExample>, EvalError> {
        let first = usize::from(self.skips_header());
        let mut examples = Vec::with_capacity(raw.len().saturating_sub(first));

        for i in first..raw.len() {
            let example = match self {
                ProcessorKind::Old | ProcessorKind::NewClean | ProcessorKind::New => {
                    InputExample::single(
                        format!("{set_type}-{i}"),
                        raw.cell(i, HUMOR_TEXT_COL)?,
                        raw.cell(i, HUMOR_LABEL_COL)?,
                    )
                }
                ProcessorKind::Mnli => InputExample::pair(
                    format!("{set_type}-{}", raw.cell(i, 0)?),
                    raw.cell(i, 8)?,
                    raw.cell(i, 9)?,
                    raw.last_cell(i)?,
                ),
                ProcessorKind::Sst2 => InputExample::single(
                    format!("{set_type}-{i}"),
                    raw.cell(i, 0)?,
                    raw.cell(i, 1)?,
                ),
            };
            examples.push(example);
        }

        Ok(examples)
    }
}

impl DataProcessor for ProcessorKind {
    fn train_examples(&self, data_dir: &Path) -> Result<Vec<InputExample>, EvalError> {
        let (train, _) = self.file_names();
        self.read_split(&data_dir.join(train), "train")
    }

    fn dev_examples(&self, data_dir: &Path) -> Result<Vec<InputExample>, EvalError> {
        let (_, dev) = self.file_names();
        self.read_split(&data_dir.join(dev), self.dev_set_type())
    }

    fn labels(&self) -> Vec<String> {
        let labels: &[&str] = match self {
            ProcessorKind::Mnli => &["contradiction", "entailment", "neutral"],
            _                   => &["0", "1"],
        };
        labels.iter().map(|l| l.to_string()).collect()
    }
}

impl FromStr for ProcessorKind {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "old"       => Ok(ProcessorKind::Old),
            "new_clean" => Ok(ProcessorKind::NewClean),
            "new"       => Ok(ProcessorKind::New),
            "mnli"      => Ok(ProcessorKind::Mnli),
            "sst-2"     => Ok(ProcessorKind::Sst2),
            other       => Err(EvalError::UnknownVariant {
                kind:  "task",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ProcessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessorKind::Old      => "old",
            ProcessorKind::NewClean => "new_clean",
            ProcessorKind::New      => "new",
            ProcessorKind::Mnli     => "mnli",
            ProcessorKind::Sst2     => "sst-2",
        };
        f.write_str(name)
    }
}
