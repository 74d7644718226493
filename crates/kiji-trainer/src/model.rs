//! Topic classifier model.
//!
//! A small candle network: embedding lookup, length-masked mean pooling
//! over the sequence, and a two-layer classification head. Deliberately
//! minimal — the pipeline, not the architecture, is the point of this
//! crate.

use candle_core::{Result, Tensor};
use candle_nn::{embedding, linear, Embedding, Linear, Module, VarBuilder};

/// Hyperparameters for [`TopicClassifier`].
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Vocabulary size, reserved tokens included.
    pub vocab_size: usize,
    /// Embedding dimension. Must match any pretrained matrix.
    pub embed_dim: usize,
    /// Hidden layer width.
    pub hidden_dim: usize,
    /// Number of target classes.
    pub num_classes: usize,
}

impl ModelConfig {
    /// Config for a vocabulary/label pair with default layer sizes.
    pub fn new(vocab_size: usize, num_classes: usize) -> Self {
        Self {
            vocab_size,
            embed_dim: 300,
            hidden_dim: 128,
            num_classes,
        }
    }
}

/// Embedding + masked mean pooling + linear head.
pub struct TopicClassifier {
    embedding: Embedding,
    fc1: Linear,
    fc2: Linear,
}

impl TopicClassifier {
    /// Build the model's variables under `vb`.
    ///
    /// The embedding table lives at `embedding.weight`, so a pretrained
    /// matrix can be written over it before training starts.
    pub fn new(vb: VarBuilder, config: &ModelConfig) -> Result<Self> {
        let embedding = embedding(config.vocab_size, config.embed_dim, vb.pp("embedding"))?;
        let fc1 = linear(config.embed_dim, config.hidden_dim, vb.pp("fc1"))?;
        let fc2 = linear(config.hidden_dim, config.num_classes, vb.pp("fc2"))?;
        Ok(Self {
            embedding,
            fc1,
            fc2,
        })
    }

    /// Forward pass producing logits.
    ///
    /// * `input_ids` — `[batch, pad_size]`, U32
    /// * `mask` — `[batch, pad_size]`, F32, 1.0 inside the pre-padding
    ///   length, 0.0 over padding
    /// * `lens` — `[batch, 1]`, F32, pre-padding lengths clamped to at
    ///   least 1 so empty documents pool to zero instead of dividing by
    ///   zero
    ///
    /// Returns `[batch, num_classes]` logits.
    pub fn forward(&self, input_ids: &Tensor, mask: &Tensor, lens: &Tensor) -> Result<Tensor> {
        let embedded = self.embedding.forward(input_ids)?; // [B, T, D]
        let masked = embedded.broadcast_mul(&mask.unsqueeze(2)?)?;
        let pooled = masked.sum(1)?.broadcast_div(lens)?; // [B, D]

        let hidden = self.fc1.forward(&pooled)?.relu()?;
        self.fc2.forward(&hidden)
    }
}
