// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Resolves a pretrained vocabulary identifier into a
// SubwordTokenizer backed by HuggingFace tokenizers.
//
// The identifier may be:
//   - a tokenizer.json file
//   - a directory containing tokenizer.json
//   - a hub model name ("bert-base-uncased"), fetched over http
//
// Special tokens follow BERT ids: [PAD]=0 [UNK]=1 [CLS]=101
// [SEP]=102 [MASK]=103.
//
// In tokenizers 0.15, train_from_files requires Trainer::Model
// to equal ModelWrapper, so offline vocabularies are written as
// tokenizer JSON by hand and loaded back (build_word_level).

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokenizers::Tokenizer;

use crate::domain::error::EvalError;
use crate::domain::traits::SubwordTokenizer;

pub const UNK_TOKEN: &str = "[UNK]";
const TOKENIZER_FILE: &str = "tokenizer.json";

pub struct PretrainedTokenizer {
    inner:     Tokenizer,
    lowercase: bool,
    unk_id:    Option<u32>,
}

impl PretrainedTokenizer {
    pub fn new(inner: Tokenizer, lowercase: bool) -> Self {
        let unk_id = inner.token_to_id(UNK_TOKEN);
        Self { inner, lowercase, unk_id }
    }

    /// Embedding rows needed to cover every id (ids may be sparse)
    pub fn vocab_size(&self) -> usize {
        self.inner
            .get_vocab(true)
            .values()
            .max()
            .map_or(0, |&max_id| max_id as usize + 1)
    }
}

impl SubwordTokenizer for PretrainedTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<String>, EvalError> {
        let text = if self.lowercase { text.to_lowercase() } else { text.to_string() };
        let encoding = self
            .inner
            .encode(text, false)
            .map_err(|e| EvalError::Tokenizer(e.to_string()))?;
        Ok(encoding.get_tokens().to_vec())
    }

    fn convert_tokens_to_ids(&self, tokens: &[String]) -> Result<Vec<u32>, EvalError> {
        tokens
            .iter()
            .map(|t| {
                self.inner
                    .token_to_id(t)
                    .or(self.unk_id)
                    .ok_or_else(|| EvalError::Tokenizer(format!("token {t:?} not in vocabulary and no {UNK_TOKEN}")))
            })
            .collect()
    }
}

pub struct TokenizerStore;

impl TokenizerStore {
    /// Resolve `identifier` to a tokenizer (see module docs)
    pub fn load(identifier: &str, lowercase: bool) -> Result<PretrainedTokenizer> {
        let path = Path::new(identifier);
        let inner = if path.is_file() {
            Self::from_file(path)?
        } else if path.join(TOKENIZER_FILE).is_file() {
            Self::from_file(&path.join(TOKENIZER_FILE))?
        } else {
            tracing::info!("Fetching pretrained tokenizer '{}'", identifier);
            Tokenizer::from_pretrained(identifier, None)
                .map_err(|e| anyhow::anyhow!("Cannot load pretrained tokenizer '{identifier}': {e}"))?
        };
        let tokenizer = PretrainedTokenizer::new(inner, lowercase);
        tracing::debug!(
            "Tokenizer ready: vocab_size={}, lowercase={}",
            tokenizer.vocab_size(),
            lowercase
        );
        Ok(tokenizer)
    }

    fn from_file(path: &Path) -> Result<Tokenizer> {
        Tokenizer::from_file(path)
            .map_err(|e| anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e))
    }

    /// Build a word-level vocabulary from `texts` (most frequent words
    /// first, at most `vocab_size` entries including special tokens)
    /// and write it to `{dir}/tokenizer.json`.
    pub fn build_word_level(dir: &Path, texts: &[String], vocab_size: usize) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create '{}'", dir.display()))?;

        let mut freq: HashMap<String, usize> = HashMap::new();
        for text in texts {
            for word in text.split_whitespace() {
                let w = word.to_lowercase();
                let w = w.trim_matches(|c: char| !c.is_alphanumeric());
                if !w.is_empty() {
                    *freq.entry(w.to_string()).or_insert(0) += 1;
                }
            }
        }

        // ties broken alphabetically so ids are stable
        let mut words: Vec<(String, usize)> = freq.into_iter().collect();
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        words.truncate(vocab_size.saturating_sub(5));

        let mut vocab = serde_json::json!({
            "[PAD]":  0,
            "[UNK]":  1,
            "[CLS]":  101,
            "[SEP]":  102,
            "[MASK]": 103,
        });
        let mut next_id = 104usize;
        for (word, _) in &words {
            if vocab.get(word).is_none() {
                vocab[word] = serde_json::json!(next_id);
                next_id += 1;
            }
        }

        let special = |id: u32, content: &str| serde_json::json!({
            "id": id, "content": content, "single_word": false, "lstrip": false,
            "rstrip": false, "normalized": false, "special": true
        });
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                special(0, "[PAD]"),
                special(1, UNK_TOKEN),
                special(101, "[CLS]"),
                special(102, "[SEP]"),
                special(103, "[MASK]"),
            ],
            "normalizer": null,
            "pre_tokenizer": { "type": "Whitespace" },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab,
                "unk_token": UNK_TOKEN
            }
        });

        let tok_path = dir.join(TOKENIZER_FILE);
        std::fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer JSON to '{}'", tok_path.display()))?;

        tracing::info!("Tokenizer built with {} words at '{}'", words.len(), tok_path.display());
        Ok(tok_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::converter::{convert_examples_to_features, CLS_TOKEN, SEP_TOKEN};
    use crate::domain::example::InputExample;

    fn store() -> (tempfile::TempDir, PathBuf) {
        let dir  = tempfile::tempdir().unwrap();
        let path = TokenizerStore::build_word_level(
            dir.path(),
            &["the pun is mightier".to_string(), "the sword".to_string()],
            100,
        )
        .unwrap();
        (dir, path)
    }

    #[test]
    fn test_load_from_file_or_dir() {
        let (dir, path) = store();
        assert!(TokenizerStore::load(path.to_str().unwrap(), true).is_ok());
        assert!(TokenizerStore::load(dir.path().to_str().unwrap(), true).is_ok());
    }

    #[test]
    fn test_lowercase_flag_applies_before_encoding() {
        let (dir, _) = store();
        let ident = dir.path().to_str().unwrap();

        let lower = TokenizerStore::load(ident, true).unwrap();
        let ids   = lower.convert_tokens_to_ids(&lower.tokenize("The PUN").unwrap()).unwrap();
        assert!(ids.iter().all(|&id| id >= 104));

        let cased = TokenizerStore::load(ident, false).unwrap();
        let ids   = cased.convert_tokens_to_ids(&cased.tokenize("The PUN").unwrap()).unwrap();
        assert_eq!(ids, vec![1, 1]);
    }

    #[test]
    fn test_special_tokens_use_bert_ids() {
        let (dir, _) = store();
        let tok = TokenizerStore::load(dir.path().to_str().unwrap(), true).unwrap();
        let ids = tok
            .convert_tokens_to_ids(&[CLS_TOKEN.to_string(), SEP_TOKEN.to_string(), "zebra".to_string()])
            .unwrap();
        assert_eq!(ids, vec![101, 102, 1]);
    }

    #[test]
    fn test_drives_feature_converter() {
        let (dir, _) = store();
        let tok = TokenizerStore::load(dir.path().to_str().unwrap(), true).unwrap();
        let examples = vec![InputExample::single("dev-0", "The sword", "1")];
        let labels   = vec!["0".to_string(), "1".to_string()];

        let features = convert_examples_to_features(&examples, &labels, 6, &tok).unwrap();
        assert_eq!(features[0].input_ids[0], 101);
        assert_eq!(features[0].input_ids[3], 102);
        assert_eq!(features[0].input_mask, vec![1, 1, 1, 1, 0, 0]);
        assert_eq!(features[0].label_id, 1);
    }

    #[test]
    fn test_vocab_size_covers_sparse_ids() {
        let (dir, _) = store();
        let tok = TokenizerStore::load(dir.path().to_str().unwrap(), true).unwrap();
        // 5 words after the special tokens: ids 104..=108
        assert_eq!(tok.vocab_size(), 109);
    }
}
