// ============================================================
// Layer 5 — Humor Detection Model
// ============================================================
// Transformer encoder classifier:
//
//   token + position + segment embeddings
//       → N encoder blocks (self-attention with padding mask, GELU FFN)
//       → [CLS] vector
//       → (optional) concat ambiguity embedding
//       → linear head → logits [batch, num_labels]
//
// Reference: Vaswani et al. (2017), Devlin et al. (2019) BERT

use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

use crate::domain::error::EvalError;
use crate::ml::classifier::{ClassifierOutput, ModelInput, SequenceClassifier};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize;
// adding them again gives conflicting impls.
#[derive(Config, Debug)]
pub struct HumorDetectionConfig {
    pub vocab_size:  usize,
    pub max_seq_len: usize,
    pub d_model:     usize,
    pub num_heads:   usize,
    pub num_layers:  usize,
    pub d_ff:        usize,
    #[config(default = 2)]
    pub num_labels:  usize,
    #[config(default = 0.1)]
    pub dropout:     f64,
    #[config(default = 2)]
    pub type_vocab_size: usize,
    /// Concatenate an ambiguity embedding to the pooled output
    #[config(default = false)]
    pub use_ambiguity: bool,
    /// Scores are clamped into [0, ambiguity_buckets)
    #[config(default = 32)]
    pub ambiguity_buckets: usize,
}

impl HumorDetectionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> HumorDetectionModel<B> {
        let token_embedding    = EmbeddingConfig::new(self.vocab_size, self.d_model).init(device);
        let position_embedding = EmbeddingConfig::new(self.max_seq_len, self.d_model).init(device);
        let segment_embedding  = EmbeddingConfig::new(self.type_vocab_size, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);

        let ambiguity_embedding = self
            .use_ambiguity
            .then(|| EmbeddingConfig::new(self.ambiguity_buckets, self.d_model).init(device));
        let head_inputs = if self.use_ambiguity { 2 * self.d_model } else { self.d_model };
        let classifier  = LinearConfig::new(head_inputs, self.num_labels).init(device);
        let dropout     = DropoutConfig::new(self.dropout).init();

        HumorDetectionModel {
            token_embedding, position_embedding, segment_embedding, layers,
            final_norm, ambiguity_embedding, classifier, dropout,
            ambiguity_buckets: self.ambiguity_buckets,
        }
    }

    /// Token ids must index the token embedding and every position
    /// must index the position embedding.
    pub fn check_inputs(&self, max_input_id: Option<i64>, seq_len: usize) -> Result<(), EvalError> {
        if let Some(max_id) = max_input_id {
            if max_id < 0 || max_id as u64 >= self.vocab_size as u64 {
                return Err(EvalError::VocabularyTooSmall { max_id, vocab_size: self.vocab_size });
            }
        }
        if seq_len > self.max_seq_len {
            return Err(EvalError::SequenceExceedsModel { seq_len, max_seq_len: self.max_seq_len });
        }
        Ok(())
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    /// mask_pad: [batch, seq_len], true at padding positions
    pub fn forward(&self, x: Tensor<B, 3>, mask_pad: Tensor<B, 2, Bool>) -> Tensor<B, 3> {
        let attn_input  = MhaInput::self_attn(x.clone()).mask_pad(mask_pad);
        let attn_output = self.self_attn.forward(attn_input).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct HumorDetectionModel<B: Backend> {
    pub token_embedding:     Embedding<B>,
    pub position_embedding:  Embedding<B>,
    pub segment_embedding:   Embedding<B>,
    pub layers:              Vec<EncoderBlock<B>>,
    pub final_norm:          LayerNorm<B>,
    pub ambiguity_embedding: Option<Embedding<B>>,
    pub classifier:          Linear<B>,
    pub dropout:             Dropout,
    pub ambiguity_buckets:   usize,
}

impl<B: Backend> HumorDetectionModel<B> {
    pub fn uses_ambiguity(&self) -> bool {
        self.ambiguity_embedding.is_some()
    }

    /// [batch, seq_len] inputs → logits [batch, num_labels]
    pub fn forward(
        &self,
        input_ids:      Tensor<B, 2, Int>,
        attention_mask: Tensor<B, 2, Int>,
        token_type_ids: Tensor<B, 2, Int>,
        ambiguity:      Option<Tensor<B, 1, Int>>,
    ) -> Tensor<B, 2> {
        let [batch_size, seq_len] = input_ids.dims();
        let device = input_ids.device();

        let tok_emb = self.token_embedding.forward(input_ids);
        let positions = Tensor::<B, 1, Int>::arange(0..seq_len as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, seq_len]);
        let pos_emb = self.position_embedding.forward(positions);
        let seg_emb = self.segment_embedding.forward(token_type_ids);

        let mask_pad = attention_mask.equal_elem(0);
        let mut x = self.dropout.forward(tok_emb + pos_emb + seg_emb);
        for layer in &self.layers {
            x = layer.forward(x, mask_pad.clone());
        }
        let x = self.final_norm.forward(x); // [batch, seq_len, d_model]
        let [_, _, d_model] = x.dims();

        // [CLS] is always position 0.
        let pooled = x
            .slice([0..batch_size, 0..1, 0..d_model])
            .reshape([batch_size, d_model]);

        let features = match (&self.ambiguity_embedding, ambiguity) {
            (Some(embedding), Some(scores)) => {
                let top    = self.ambiguity_buckets.saturating_sub(1) as i64;
                let scores = scores.clamp(0, top).reshape([batch_size, 1]);
                let amb    = embedding.forward(scores).reshape([batch_size, d_model]);
                Tensor::cat(vec![pooled, amb], 1)
            }
            _ => pooled,
        };

        self.classifier.forward(self.dropout.forward(features))
    }
}

impl<B: Backend> SequenceClassifier<B> for HumorDetectionModel<B> {
    fn classify(&self, input: ModelInput<B>) -> anyhow::Result<ClassifierOutput<B>> {
        if self.uses_ambiguity() && input.ambiguity_scores.is_none() {
            anyhow::bail!("model was built with ambiguity input but the batch carries no ambiguity scores");
        }

        let logits = self.forward(
            input.input_ids,
            input.attention_mask,
            input.token_type_ids,
            input.ambiguity_scores,
        );
        let ce   = CrossEntropyLossConfig::new().init(&logits.device());
        let loss = ce.forward(logits.clone(), input.labels);
        Ok(ClassifierOutput { loss, logits })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn tiny(use_ambiguity: bool) -> HumorDetectionConfig {
        HumorDetectionConfig::new(128, 8, 16, 2, 1, 32)
            .with_dropout(0.0)
            .with_use_ambiguity(use_ambiguity)
            .with_ambiguity_buckets(4)
    }

    fn input(with_scores: bool) -> ModelInput<TestBackend> {
        let device = Default::default();
        let ids    = Tensor::<TestBackend, 1, Int>::from_ints([101, 5, 6, 102, 0, 0, 0, 0,
                                                              101, 7, 102, 0, 0, 0, 0, 0], &device)
            .reshape([2, 8]);
        let mask   = ids.clone().not_equal_elem(0).int();
        let segs   = Tensor::<TestBackend, 2, Int>::zeros([2, 8], &device);
        let labels = Tensor::<TestBackend, 1, Int>::from_ints([1, 0], &device);
        let scores = with_scores.then(|| Tensor::<TestBackend, 1, Int>::from_ints([9, 1], &device));
        ModelInput {
            input_ids: ids,
            attention_mask: mask,
            token_type_ids: segs,
            labels,
            ambiguity_scores: scores,
        }
    }

    #[test]
    fn test_logits_shape() {
        let model = tiny(false).init::<TestBackend>(&Default::default());
        let out   = model.classify(input(false)).unwrap();
        assert_eq!(out.logits.dims(), [2, 2]);
        assert_eq!(out.loss.dims(), [1]);
    }

    #[test]
    fn test_ambiguity_model_accepts_out_of_range_scores() {
        let model = tiny(true).init::<TestBackend>(&Default::default());
        assert!(model.uses_ambiguity());
        let out = model.classify(input(true)).unwrap();
        assert_eq!(out.logits.dims(), [2, 2]);
    }

    #[test]
    fn test_ambiguity_model_rejects_missing_scores() {
        let model = tiny(true).init::<TestBackend>(&Default::default());
        assert!(model.classify(input(false)).is_err());
    }

    #[test]
    fn test_base_model_ignores_scores() {
        let model = tiny(false).init::<TestBackend>(&Default::default());
        assert!(model.classify(input(true)).is_ok());
    }

    #[test]
    fn test_check_inputs_against_embedding_sizes() {
        let cfg = tiny(false);
        assert!(cfg.check_inputs(Some(127), 8).is_ok());
        assert!(cfg.check_inputs(None, 8).is_ok());
        assert!(matches!(
            cfg.check_inputs(Some(128), 8),
            Err(EvalError::VocabularyTooSmall { max_id: 128, vocab_size: 128 })
        ));
        assert!(matches!(
            cfg.check_inputs(Some(5), 9),
            Err(EvalError::SequenceExceedsModel { seq_len: 9, max_seq_len: 8 })
        ));
    }
}
