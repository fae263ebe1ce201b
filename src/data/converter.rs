// ============================================================
// Layer 4 — Feature Converter
// ============================================================
// Turns InputExamples into fixed-length InputFeatures.
//
// Per example:
//   1. Tokenise text_a (and text_b when present and non-empty)
//   2. Truncate to leave room for special tokens:
//        pair:   len(a) + len(b) <= max_seq_length - 3
//        single: len(a)          <= max_seq_length - 2
//   3. Lay out  [CLS] a [SEP] (b [SEP])?
//        segment 0 covers [CLS], a and the first [SEP]
//        segment 1 covers b and the closing [SEP]
//   4. Convert to ids, mask = 1 for real tokens, right-pad
//      ids / mask / segments with 0 up to max_seq_length
//   5. Map the label through the vocabulary by position
//
// Output order always matches input order.

use std::collections::HashMap;

use crate::domain::error::EvalError;
use crate::domain::example::InputExample;
use crate::domain::feature::InputFeatures;
use crate::domain::traits::SubwordTokenizer;

pub const CLS_TOKEN: &str = "[CLS]";
pub const SEP_TOKEN: &str = "[SEP]";

const PAIR_RESERVED:   usize = 3;
const SINGLE_RESERVED: usize = 2;

/// Convert a batch of examples, failing on the first bad label.
pub fn convert_examples_to_features<T>(
    examples:       &[InputExample],
    label_list:     &[String],
    max_seq_length: usize,
    tokenizer:      &T,
) -> Result<Vec<InputFeatures>, EvalError>
where
    T: SubwordTokenizer + ?Sized,
{
    let label_map: HashMap<&str, usize> = label_list
        .iter()
        .enumerate()
        .map(|(i, label)| (label.as_str(), i))
        .collect();

    let mut features = Vec::with_capacity(examples.len());

    for (index, example) in examples.iter().enumerate() {
        if index % 10_000 == 0 {
            tracing::debug!("Writing example {} of {}", index, examples.len());
        }
        let feature = convert_single(example, &label_map, label_list, max_seq_length, tokenizer)?;
        features.push(feature);
    }

    Ok(features)
}

fn convert_single<T>(
    example:        &InputExample,
    label_map:      &HashMap<&str, usize>,
    label_list:     &[String],
    max_seq_length: usize,
    tokenizer:      &T,
) -> Result<InputFeatures, EvalError>
where
    T: SubwordTokenizer + ?Sized,
{
    let mut tokens_a = tokenizer.tokenize(&example.text_a)?;

    let tokens_b = match example.second_text() {
        Some(text_b) => {
            let budget = reserve(max_seq_length, PAIR_RESERVED)?;
            let mut tokens_b = tokenizer.tokenize(text_b)?;
            truncate_seq_pair(&mut tokens_a, &mut tokens_b, budget);
            Some(tokens_b)
        }
        None => {
            let budget = reserve(max_seq_length, SINGLE_RESERVED)?;
            tokens_a.truncate(budget);
            None
        }
    };

    // ── Assemble token and segment sequences ──────────────────────────────────
    let mut tokens      = Vec::with_capacity(max_seq_length);
    let mut segment_ids = Vec::with_capacity(max_seq_length);

    tokens.push(CLS_TOKEN.to_string());
    tokens.extend(tokens_a);
    tokens.push(SEP_TOKEN.to_string());
    segment_ids.resize(tokens.len(), 0u32);

    if let Some(tokens_b) = tokens_b {
        tokens.extend(tokens_b);
        tokens.push(SEP_TOKEN.to_string());
        segment_ids.resize(tokens.len(), 1u32);
    }

    // ── Ids, mask, padding ────────────────────────────────────────────────────
    let mut input_ids = tokenizer.convert_tokens_to_ids(&tokens)?;
    if input_ids.len() != tokens.len() {
        return Err(EvalError::Tokenizer(format!(
            "{} tokens converted to {} ids",
            tokens.len(),
            input_ids.len()
        )));
    }
    let mut input_mask = vec![1u32; input_ids.len()];

    input_ids.resize(max_seq_length, 0);
    input_mask.resize(max_seq_length, 0);
    segment_ids.resize(max_seq_length, 0);

    // ── Label ─────────────────────────────────────────────────────────────────
    let label = example
        .label
        .as_deref()
        .ok_or_else(|| EvalError::MissingLabel { guid: example.guid.clone() })?;
    let label_id = *label_map.get(label).ok_or_else(|| EvalError::InvalidLabel {
        guid:       example.guid.clone(),
        label:      label.to_string(),
        vocabulary: label_list.to_vec(),
    })?;

    Ok(InputFeatures {
        input_ids,
        input_mask,
        segment_ids,
        label_id,
        ambiguity: None,
    })
}

fn reserve(max_seq_length: usize, reserved: usize) -> Result<usize, EvalError> {
    max_seq_length
        .checked_sub(reserved)
        .ok_or(EvalError::SequenceTooShort { max_seq_length, reserved })
}

/// Truncate a sequence pair in place to at most `max_length` tokens,
/// one token at a time from whichever sequence is currently longer.
pub fn truncate_seq_pair(tokens_a: &mut Vec<String>, tokens_b: &mut Vec<String>, max_length: usize) {
    while tokens_a.len() + tokens_b.len() > max_length {
        if tokens_a.len() > tokens_b.len() {
            tokens_a.pop();
        } else {
            tokens_b.pop();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Whitespace tokenizer with ids assigned by a fixed vocabulary.
    /// [PAD]=0, [UNK]=1, [CLS]=101, [SEP]=102, words from 1000 up.
    pub(crate) struct WhitespaceTokenizer;

    impl SubwordTokenizer for WhitespaceTokenizer {
        fn tokenize(&self, text: &str) -> Result<Vec<String>, EvalError> {
            Ok(text.split_whitespace().map(str::to_lowercase).collect())
        }

        fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>, EvalError> {
            Ok(tokens
                .iter()
                .map(|t| match t.as_str() {
                    CLS_TOKEN => 101,
                    SEP_TOKEN => 102,
                    word      => 1000 + word.bytes().map(u32::from).sum::<u32>(),
                })
                .collect())
        }
    }

    fn labels() -> Vec<String> {
        vec!["0".to_string(), "1".to_string()]
    }

    fn convert(examples: &[InputExample], max_len: usize) -> Vec<InputFeatures> {
        convert_examples_to_features(examples, &labels(), max_len, &WhitespaceTokenizer).unwrap()
    }

    #[test]
    fn test_single_sentence_layout_and_padding() {
        let ex = InputExample::single("dev-0", "a b c", "1");
        let f  = &convert(&[ex], 8)[0];

        assert_eq!(f.input_ids.len(),   8);
        assert_eq!(f.input_mask.len(),  8);
        assert_eq!(f.segment_ids.len(), 8);
        assert_eq!(f.input_ids[0], 101);
        assert_eq!(f.input_ids[4], 102);
        assert_eq!(f.input_mask, vec![1, 1, 1, 1, 1, 0, 0, 0]);
        assert_eq!(&f.input_ids[5..], &[0, 0, 0]);
        assert_eq!(f.segment_ids, vec![0; 8]);
        assert_eq!(f.label_id, 1);
    }

    #[test]
    fn test_padding_count_for_short_sentence() {
        // L = 4 words, max 10 → 10 - 4 - 2 = 4 padded positions
        let ex = InputExample::single("dev-0", "w x y z", "0");
        let f  = &convert(&[ex], 10)[0];
        let padded = f.input_mask.iter().filter(|&&m| m == 0).count();
        assert_eq!(padded, 4);
        assert_eq!(f.real_token_count(), 6);
    }

    #[test]
    fn test_single_truncates_to_reserved_budget() {
        let ex = InputExample::single("dev-0", "one two three four five six", "0");
        let f  = &convert(&[ex], 5)[0];
        // [CLS] one two three [SEP]
        assert_eq!(f.real_token_count(), 5);
        assert_eq!(f.input_ids[4], 102);
    }

    #[test]
    fn test_no_truncation_at_exact_budget() {
        let ex = InputExample::single("dev-0", "one two three", "0");
        let f  = &convert(&[ex], 5)[0];
        assert_eq!(f.real_token_count(), 5);
        assert!(f.input_mask.iter().all(|&m| m == 1));
    }

    #[test]
    fn test_pair_segments_and_joint_truncation() {
        let ex = InputExample::pair("dev-0", "a b c d e", "x y", "1");
        let f  = &convert(&[ex], 8)[0];
        // budget 5: a trimmed to 3, b keeps 2
        // [CLS] a b c [SEP] x y [SEP]
        assert_eq!(f.real_token_count(), 8);
        assert_eq!(f.segment_ids, vec![0, 0, 0, 0, 0, 1, 1, 1]);
        assert_eq!(f.input_ids[4], 102);
        assert_eq!(f.input_ids[7], 102);
    }

    #[test]
    fn test_empty_second_text_matches_single() {
        let single = InputExample::single("dev-0", "knock knock", "1");
        let empty  = InputExample::pair("dev-0", "knock knock", "", "1");
        assert_eq!(convert(&[single], 6), convert(&[empty], 6));
    }

    #[test]
    fn test_padding_positions_have_zero_ids() {
        let examples = vec![
            InputExample::single("dev-0", "short", "0"),
            InputExample::pair("dev-1", "a longer first text", "and a second", "1"),
        ];
        for f in convert(&examples, 12) {
            assert!(f.is_rectangular());
            assert_eq!(f.seq_len(), 12);
            for (id, mask) in f.input_ids.iter().zip(&f.input_mask) {
                if *mask == 0 {
                    assert_eq!(*id, 0);
                }
            }
        }
    }

    #[test]
    fn test_conversion_is_idempotent_and_ordered() {
        let examples: Vec<_> = (0..5)
            .map(|i| InputExample::single(format!("dev-{i}"), format!("joke number {i}"), "1"))
            .collect();
        let first  = convert(&examples, 16);
        let second = convert(&examples, 16);
        assert_eq!(first, second);
        assert_ne!(first[0].input_ids, first[4].input_ids);
    }

    #[test]
    fn test_invalid_label() {
        let ex  = InputExample::single("dev-3", "text", "2");
        let err = convert_examples_to_features(&[ex], &labels(), 8, &WhitespaceTokenizer).unwrap_err();
        assert!(matches!(err, EvalError::InvalidLabel { ref label, .. } if label == "2"));
    }

    #[test]
    fn test_missing_label() {
        let mut ex = InputExample::single("dev-3", "text", "0");
        ex.label   = None;
        let err = convert_examples_to_features(&[ex], &labels(), 8, &WhitespaceTokenizer).unwrap_err();
        assert!(matches!(err, EvalError::MissingLabel { .. }));
    }

    #[test]
    fn test_max_len_too_small_for_pair() {
        let ex  = InputExample::pair("dev-0", "a", "b", "0");
        let err = convert_examples_to_features(&[ex], &labels(), 2, &WhitespaceTokenizer).unwrap_err();
        assert!(matches!(err, EvalError::SequenceTooShort { reserved: 3, .. }));
    }

    #[test]
    fn test_truncate_pair_pops_longer_first() {
        let mut a: Vec<String> = ["1", "2", "3", "4"].iter().map(|s| s.to_string()).collect();
        let mut b: Vec<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        truncate_seq_pair(&mut a, &mut b, 3);
        assert_eq!(a.len(), 2);
        assert_eq!(b.len(), 1);
    }
}
