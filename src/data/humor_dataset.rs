// ============================================================
// Layer 4 — Extended Humor Detection Dataset
// ============================================================
// The richer example source used when the legacy loader is off.
// Besides the text and label it carries a per-example integer
// ambiguity score, precomputed by an external scorer and stored
// as extra columns after the text:
//
//   col:   0    1      2    3      4     5    6
//          id   label  ...  text   csi   wn   tf-idf
//
// File per split:
//   clean data → {split}_clean.tsv
//   otherwise  → {split}_wordnet_amb.tsv
//
// The ambiguity function picks the score column; `none` reads no
// column and scores every example 0.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::data::converter::convert_examples_to_features;
use crate::data::processor::{HUMOR_LABEL_COL, HUMOR_TEXT_COL};
use crate::data::reader::{read_delimited, RawRows};
use crate::domain::error::EvalError;
use crate::domain::example::InputExample;
use crate::domain::feature::InputFeatures;
use crate::domain::traits::{DataProcessor, SubwordTokenizer};

// ─── AmbiguityFn ──────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AmbiguityFn {
    #[default]
    None,
    Csi,
    WordNet,
    TfIdf,
}

impl AmbiguityFn {
    /// Pick the ambiguity function from weight-file naming:
    /// `_csi_`, then `_wn_`, then `_tf-idf_`, else none.
    pub fn from_weights_name(weights: &str) -> Self {
        if weights.contains("_csi_") {
            AmbiguityFn::Csi
        } else if weights.contains("_wn_") {
            AmbiguityFn::WordNet
        } else if weights.contains("_tf-idf_") {
            AmbiguityFn::TfIdf
        } else {
            AmbiguityFn::None
        }
    }

    /// Column holding this function's precomputed score
    pub fn score_column(&self) -> Option<usize> {
        match self {
            AmbiguityFn::None    => None,
            AmbiguityFn::Csi     => Some(4),
            AmbiguityFn::WordNet => Some(5),
            AmbiguityFn::TfIdf   => Some(6),
        }
    }

    pub fn is_none(&self) -> bool {
        *self == AmbiguityFn::None
    }
}

impl FromStr for AmbiguityFn {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none"   => Ok(AmbiguityFn::None),
            "csi"    => Ok(AmbiguityFn::Csi),
            "wn"     => Ok(AmbiguityFn::WordNet),
            "tf-idf" => Ok(AmbiguityFn::TfIdf),
            other    => Err(EvalError::UnknownVariant {
                kind:  "ambiguity function",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for AmbiguityFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AmbiguityFn::None    => "none",
            AmbiguityFn::Csi     => "csi",
            AmbiguityFn::WordNet => "wn",
            AmbiguityFn::TfIdf   => "tf-idf",
        })
    }
}

// ─── Split ────────────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Dev,
    Test,
}

impl Split {
    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Dev   => "dev",
            Split::Test  => "test",
        }
    }
}

/// An example paired with its ambiguity score
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredExample {
    pub example:   InputExample,
    pub ambiguity: i64,
}

// ─── HumorDetectionDataset ────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct HumorDetectionDataset {
    data_dir:       PathBuf,
    max_seq_length: usize,
    split:          Split,
    ambiguity_fn:   AmbiguityFn,
    use_clean_data: bool,
}

impl HumorDetectionDataset {
    pub fn new(
        data_dir:       impl Into<PathBuf>,
        max_seq_length: usize,
        split:          Split,
        ambiguity_fn:   AmbiguityFn,
        use_clean_data: bool,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_seq_length,
            split,
            ambiguity_fn,
            use_clean_data,
        }
    }

    pub fn max_seq_length(&self) -> usize {
        self.max_seq_length
    }

    pub fn split_path(&self, data_dir: &Path, split: Split) -> PathBuf {
        let suffix = if self.use_clean_data { "clean" } else { "wordnet_amb" };
        data_dir.join(format!("{}_{}.tsv", split.as_str(), suffix))
    }

    /// Scored examples for the split this dataset was built for
    pub fn scored_examples(&self) -> Result<Vec<ScoredExample>, EvalError> {
        self.read_scored(&self.data_dir, self.split)
    }

    fn read_scored(&self, data_dir: &Path, split: Split) -> Result<Vec<ScoredExample>, EvalError> {
        let path = self.split_path(data_dir, split);
        let raw  = read_delimited(&path, None)?;

        let scored = (0..raw.len())
            .map(|row| self.scored_row(&raw, row, split))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!(
            "{} scored examples read from '{}' (ambiguity_fn={})",
            scored.len(),
            path.display(),
            self.ambiguity_fn
        );
        Ok(scored)
    }

    fn scored_row(&self, raw: &RawRows, row: usize, split: Split) -> Result<ScoredExample, EvalError> {
        let example = InputExample::single(
            format!("{}-{}", split.as_str(), row),
            raw.cell(row, HUMOR_TEXT_COL)?,
            raw.cell(row, HUMOR_LABEL_COL)?,
        );

        let ambiguity = match self.ambiguity_fn.score_column() {
            None      => 0,
            Some(col) => {
                let value = raw.cell(row, col)?.trim();
                value.parse::<i64>().map_err(|_| EvalError::InvalidScore {
                    path:  raw.path.clone(),
                    row,
                    value: value.to_string(),
                })?
            }
        };

        Ok(ScoredExample { example, ambiguity })
    }
}

impl DataProcessor for HumorDetectionDataset {
    fn train_examples(&self, data_dir: &Path) -> Result<Vec<InputExample>, EvalError> {
        Ok(self.read_scored(data_dir, Split::Train)?.into_iter().map(|s| s.example).collect())
    }

    fn dev_examples(&self, data_dir: &Path) -> Result<Vec<InputExample>, EvalError> {
        Ok(self.read_scored(data_dir, Split::Dev)?.into_iter().map(|s| s.example).collect())
    }

    fn labels(&self) -> Vec<String> {
        vec!["0".to_string(), "1".to_string()]
    }
}

/// Encode the dataset's split into features carrying ambiguity scores.
pub fn convert_dataset_to_features<T>(
    dataset:   &HumorDetectionDataset,
    tokenizer: &T,
) -> Result<Vec<InputFeatures>, EvalError>
where
    T: SubwordTokenizer + ?Sized,
{
    let scored = dataset.scored_examples()?;
    let (examples, scores): (Vec<_>, Vec<_>) = scored
        .into_iter()
        .map(|s| (s.example, s.ambiguity))
        .unzip();

    let mut features = convert_examples_to_features(
        &examples,
        &dataset.labels(),
        dataset.max_seq_length(),
        tokenizer,
    )?;
    for (feature, score) in features.iter_mut().zip(scores) {
        feature.ambiguity = Some(score);
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::converter::tests::WhitespaceTokenizer;
    use std::fs;

    const ROWS: &str = "\
a,1,x,a pun about bread,3,7,2
b,0,x,the bread is fresh,0,1,0
";

    #[test]
    fn test_ambiguity_fn_from_weights_name() {
        assert_eq!(AmbiguityFn::from_weights_name("m_new_csi_1.mpk"),    AmbiguityFn::Csi);
        assert_eq!(AmbiguityFn::from_weights_name("m_new_wn_1.mpk"),     AmbiguityFn::WordNet);
        assert_eq!(AmbiguityFn::from_weights_name("m_new_tf-idf_1.mpk"), AmbiguityFn::TfIdf);
        assert_eq!(AmbiguityFn::from_weights_name("m_new_1.mpk"),        AmbiguityFn::None);
        assert_eq!("tf-idf".parse::<AmbiguityFn>().unwrap(), AmbiguityFn::TfIdf);
    }

    #[test]
    fn test_scores_follow_selected_function() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test_wordnet_amb.tsv"), ROWS).unwrap();

        let wn = HumorDetectionDataset::new(dir.path(), 16, Split::Test, AmbiguityFn::WordNet, false);
        let scored = wn.scored_examples().unwrap();
        assert_eq!(scored[0].ambiguity, 7);
        assert_eq!(scored[1].ambiguity, 1);
        assert_eq!(scored[0].example.guid, "test-0");

        let none = HumorDetectionDataset::new(dir.path(), 16, Split::Test, AmbiguityFn::None, false);
        assert!(none.scored_examples().unwrap().iter().all(|s| s.ambiguity == 0));
    }

    #[test]
    fn test_clean_flag_switches_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test_clean.tsv"), "a,1,x,clean joke\n").unwrap();

        let clean = HumorDetectionDataset::new(dir.path(), 16, Split::Test, AmbiguityFn::None, true);
        assert_eq!(clean.scored_examples().unwrap().len(), 1);

        let amb = HumorDetectionDataset::new(dir.path(), 16, Split::Test, AmbiguityFn::None, false);
        assert!(matches!(amb.scored_examples(), Err(EvalError::DataFileNotFound { .. })));
    }

    #[test]
    fn test_missing_score_column_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test_clean.tsv"), "a,1,x,clean joke,4\n").unwrap();
        let ds = HumorDetectionDataset::new(dir.path(), 16, Split::Test, AmbiguityFn::TfIdf, true);
        assert!(matches!(ds.scored_examples(), Err(EvalError::Parse { needed: 6, .. })));
    }

    #[test]
    fn test_non_integer_score() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test_clean.tsv"), "a,1,x,joke,high\n").unwrap();
        let ds = HumorDetectionDataset::new(dir.path(), 16, Split::Test, AmbiguityFn::Csi, true);
        assert!(matches!(ds.scored_examples(), Err(EvalError::InvalidScore { .. })));
    }

    #[test]
    fn test_features_carry_scores() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test_wordnet_amb.tsv"), ROWS).unwrap();
        let ds = HumorDetectionDataset::new(dir.path(), 10, Split::Test, AmbiguityFn::Csi, false);

        let features = convert_dataset_to_features(&ds, &WhitespaceTokenizer).unwrap();
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].ambiguity, Some(3));
        assert_eq!(features[1].ambiguity, Some(0));
        assert_eq!(features[0].label_id, 1);
        assert_eq!(features[0].seq_len(), 10);
    }

    #[test]
    fn test_processor_capabilities() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dev_clean.tsv"), "a,0,x,dev text\n").unwrap();
        let ds = HumorDetectionDataset::new(dir.path(), 16, Split::Test, AmbiguityFn::None, true);

        let dev = ds.dev_examples(dir.path()).unwrap();
        assert_eq!(dev[0].guid, "dev-0");
        assert!(matches!(ds.train_examples(dir.path()), Err(EvalError::DataFileNotFound { .. })));
        assert_eq!(ds.labels(), vec!["0", "1"]);
    }
}
