//! Training loop for the topic classifier.
//!
//! Epochs over shuffled batches with AdamW and cross-entropy, periodic
//! dev evaluation, best-checkpoint saving and early stopping, then a
//! final report on the held-out test split.

use std::path::PathBuf;

use anyhow::{bail, Context};
use candle_core::{Device, Tensor, D};
use candle_nn::{loss, AdamW, Optimizer, ParamsAdamW, VarBuilder, VarMap};
use oorandom::Rand32;
use tracing::{debug, info};

use kiji_core::pipeline::{Batch, BatchIterator, EncodedExample};

use crate::dataset::{build_dataset, DatasetConfig};
use crate::metrics::{accuracy, ClassificationReport};
use crate::model::{ModelConfig, TopicClassifier};

/// Training hyperparameters and artifact paths.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Full passes over the training split.
    pub epochs: usize,
    /// Examples per batch.
    pub batch_size: usize,
    /// AdamW learning rate.
    pub learning_rate: f64,
    /// Dev evaluation cadence, in batches.
    pub eval_interval: usize,
    /// Stop after this many batches without a dev-loss improvement.
    pub require_improvement: usize,
    /// Where the best checkpoint is written.
    pub checkpoint_path: PathBuf,
    /// Optional pretrained embedding matrix (safetensors, key
    /// `embeddings`) aligned with the vocabulary.
    pub embedding_path: Option<PathBuf>,
    /// Embedding dimension.
    pub embed_dim: usize,
    /// Hidden layer width.
    pub hidden_dim: usize,
    /// Shuffle seed, fixed for reproducible runs.
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            batch_size: 128,
            learning_rate: 1e-3,
            eval_interval: 100,
            require_improvement: 1000,
            checkpoint_path: PathBuf::from("models/best.safetensors"),
            embedding_path: None,
            embed_dim: 300,
            hidden_dim: 128,
            seed: 1,
        }
    }
}

/// One batch lifted onto the device.
struct TrainBatch {
    input_ids: Tensor,
    mask: Tensor,
    lens: Tensor,
    labels: Tensor,
}

fn to_tensors(batch: &Batch, device: &Device) -> candle_core::Result<TrainBatch> {
    let rows = batch.len();
    let pad_size = batch.input_ids.first().map_or(0, Vec::len);

    let ids: Vec<u32> = batch.input_ids.iter().flatten().copied().collect();
    let mut mask = Vec::with_capacity(rows * pad_size);
    for &seq_len in &batch.seq_lens {
        for pos in 0..pad_size {
            mask.push(if pos < seq_len { 1f32 } else { 0f32 });
        }
    }
    // Clamp so empty documents pool to zero instead of dividing by zero.
    let lens: Vec<f32> = batch.seq_lens.iter().map(|&l| l.max(1) as f32).collect();
    let labels: Vec<u32> = batch.labels.iter().map(|&l| l as u32).collect();

    Ok(TrainBatch {
        input_ids: Tensor::from_vec(ids, (rows, pad_size), device)?,
        mask: Tensor::from_vec(mask, (rows, pad_size), device)?,
        lens: Tensor::from_vec(lens, (rows, 1), device)?,
        labels: Tensor::from_vec(labels, rows, device)?,
    })
}

/// Fisher-Yates shuffle over the training examples.
fn shuffle(examples: &mut [EncodedExample], rng: &mut Rand32) {
    for i in (1..examples.len()).rev() {
        let j = rng.rand_range(0..(i as u32 + 1)) as usize;
        examples.swap(i, j);
    }
}

/// Owns the model, its variables, and the training state.
pub struct Trainer {
    model: TopicClassifier,
    varmap: VarMap,
    device: Device,
    config: TrainConfig,
    class_names: Vec<String>,
}

impl Trainer {
    /// Build a fresh model, optionally seeding the embedding table from a
    /// pretrained matrix.
    pub fn new(
        model_config: &ModelConfig,
        config: TrainConfig,
        class_names: Vec<String>,
    ) -> anyhow::Result<Self> {
        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, candle_core::DType::F32, &device);
        let model = TopicClassifier::new(vb, model_config)?;

        let mut trainer = Self {
            model,
            varmap,
            device,
            config,
            class_names,
        };
        if let Some(path) = trainer.config.embedding_path.clone() {
            trainer.load_pretrained_embeddings(&path, model_config)?;
        }
        Ok(trainer)
    }

    fn load_pretrained_embeddings(
        &mut self,
        path: &std::path::Path,
        model_config: &ModelConfig,
    ) -> anyhow::Result<()> {
        let tensors = candle_core::safetensors::load(path, &self.device)
            .with_context(|| format!("loading pretrained embeddings from {}", path.display()))?;
        let matrix = tensors
            .get("embeddings")
            .with_context(|| format!("no `embeddings` tensor in {}", path.display()))?;
        let expected = (model_config.vocab_size, model_config.embed_dim);
        if matrix.dims() != [expected.0, expected.1] {
            bail!(
                "pretrained embedding shape {:?} does not match model {:?}",
                matrix.dims(),
                expected
            );
        }
        self.varmap.set_one("embedding.weight", matrix.clone())?;
        info!(path = %path.display(), "embedding table initialized from pretrained vectors");
        Ok(())
    }

    /// Run the full training loop. Shuffles `train` in place each epoch.
    pub fn train(
        &mut self,
        train: &mut [EncodedExample],
        dev: &[EncodedExample],
    ) -> anyhow::Result<()> {
        if train.is_empty() {
            bail!("training split is empty");
        }
        if let Some(parent) = self.config.checkpoint_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let params = ParamsAdamW {
            lr: self.config.learning_rate,
            ..Default::default()
        };
        let mut optimizer = AdamW::new(self.varmap.all_vars(), params)?;
        let mut rng = Rand32::new(self.config.seed);

        let mut best_dev_loss = f32::INFINITY;
        let mut last_improve = 0usize;
        let mut total_batch = 0usize;
        let mut stop = false;

        for epoch in 0..self.config.epochs {
            shuffle(train, &mut rng);

            for batch in BatchIterator::new(train, self.config.batch_size) {
                let tensors = to_tensors(&batch, &self.device)?;
                let logits = self
                    .model
                    .forward(&tensors.input_ids, &tensors.mask, &tensors.lens)?;
                let batch_loss = loss::cross_entropy(&logits, &tensors.labels)?;
                optimizer.backward_step(&batch_loss)?;

                if total_batch % self.config.eval_interval == 0 {
                    let predictions = argmax_to_vec(&logits)?;
                    let train_acc = accuracy(&predictions, &batch.labels);
                    let (dev_acc, dev_loss) = self.evaluate(dev)?;

                    let improved = dev_loss < best_dev_loss;
                    if improved {
                        best_dev_loss = dev_loss;
                        last_improve = total_batch;
                        self.varmap.save(&self.config.checkpoint_path)?;
                    }
                    info!(
                        batch = total_batch,
                        train_loss = format!("{:.4}", batch_loss.to_scalar::<f32>()?),
                        train_acc = format!("{train_acc:.2}"),
                        dev_loss = format!("{dev_loss:.4}"),
                        dev_acc = format!("{dev_acc:.2}"),
                        improved,
                        "eval"
                    );
                }
                total_batch += 1;

                if total_batch - last_improve > self.config.require_improvement {
                    info!(
                        stagnant_batches = total_batch - last_improve,
                        "no dev improvement for too long, stopping early"
                    );
                    stop = true;
                    break;
                }
            }
            if stop {
                break;
            }
            debug!(epoch = epoch + 1, epochs = self.config.epochs, "epoch complete");
        }
        Ok(())
    }

    /// Mean loss and accuracy over a split.
    pub fn evaluate(&self, data: &[EncodedExample]) -> anyhow::Result<(f32, f32)> {
        if data.is_empty() {
            bail!("cannot evaluate an empty split");
        }
        let (predictions, truths, mean_loss) = self.predict_split(data)?;
        Ok((accuracy(&predictions, &truths), mean_loss))
    }

    /// Reload the best checkpoint and report on the test split.
    pub fn test(&mut self, data: &[EncodedExample]) -> anyhow::Result<ClassificationReport> {
        if data.is_empty() {
            bail!("cannot evaluate an empty split");
        }
        self.varmap
            .load(&self.config.checkpoint_path)
            .with_context(|| {
                format!(
                    "loading checkpoint {}",
                    self.config.checkpoint_path.display()
                )
            })?;

        let (predictions, truths, mean_loss) = self.predict_split(data)?;
        let report = ClassificationReport::compute(&predictions, &truths, &self.class_names);
        info!(
            test_loss = format!("{mean_loss:.4}"),
            test_acc = format!("{:.4}", report.accuracy()),
            "test evaluation"
        );
        Ok(report)
    }

    fn predict_split(
        &self,
        data: &[EncodedExample],
    ) -> anyhow::Result<(Vec<usize>, Vec<usize>, f32)> {
        let mut predictions = Vec::with_capacity(data.len());
        let mut truths = Vec::with_capacity(data.len());
        let mut loss_total = 0f32;
        let mut batches = 0usize;

        for batch in BatchIterator::new(data, self.config.batch_size) {
            let tensors = to_tensors(&batch, &self.device)?;
            let logits = self
                .model
                .forward(&tensors.input_ids, &tensors.mask, &tensors.lens)?;
            loss_total += loss::cross_entropy(&logits, &tensors.labels)?.to_scalar::<f32>()?;
            predictions.extend(argmax_to_vec(&logits)?);
            truths.extend_from_slice(&batch.labels);
            batches += 1;
        }
        Ok((predictions, truths, loss_total / batches.max(1) as f32))
    }
}

fn argmax_to_vec(logits: &Tensor) -> candle_core::Result<Vec<usize>> {
    Ok(logits
        .argmax(D::Minus1)?
        .to_vec1::<u32>()?
        .into_iter()
        .map(|p| p as usize)
        .collect())
}

/// End-to-end entry point: assemble the dataset, train, report on test.
pub fn run_training(
    dataset_config: &DatasetConfig,
    train_config: TrainConfig,
) -> anyhow::Result<ClassificationReport> {
    let bundle = build_dataset(dataset_config)?;

    let model_config = ModelConfig {
        vocab_size: bundle.vocab.len(),
        embed_dim: train_config.embed_dim,
        hidden_dim: train_config.hidden_dim,
        num_classes: bundle.labels.len(),
    };
    let mut trainer = Trainer::new(
        &model_config,
        train_config,
        bundle.labels.names().to_vec(),
    )?;

    let mut train = bundle.train;
    trainer.train(&mut train, &bundle.dev)?;
    let report = trainer.test(&bundle.test)?;
    info!("\n{report}");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two trivially separable classes keyed by the first token.
    fn synthetic_split(n: usize, pad_size: usize) -> Vec<EncodedExample> {
        (0..n)
            .map(|i| {
                let class = i % 2;
                let token = 1 + class as u32;
                let mut input_ids = vec![token, token];
                input_ids.resize(pad_size, 9);
                EncodedExample {
                    input_ids,
                    label: class,
                    seq_len: 2,
                }
            })
            .collect()
    }

    fn tiny_trainer(checkpoint: PathBuf) -> Trainer {
        let model_config = ModelConfig {
            vocab_size: 10,
            embed_dim: 8,
            hidden_dim: 8,
            num_classes: 2,
        };
        let config = TrainConfig {
            epochs: 30,
            batch_size: 4,
            learning_rate: 5e-2,
            eval_interval: 10,
            require_improvement: 10_000,
            checkpoint_path: checkpoint,
            embed_dim: 8,
            hidden_dim: 8,
            ..TrainConfig::default()
        };
        Trainer::new(
            &model_config,
            config,
            vec!["even".to_string(), "odd".to_string()],
        )
        .unwrap()
    }

    #[test]
    fn test_to_tensors_shapes() {
        let data = synthetic_split(3, 4);
        let batch = Batch::from_examples(&data);
        let tensors = to_tensors(&batch, &Device::Cpu).unwrap();
        assert_eq!(tensors.input_ids.dims(), &[3, 4]);
        assert_eq!(tensors.mask.dims(), &[3, 4]);
        assert_eq!(tensors.lens.dims(), &[3, 1]);
        assert_eq!(tensors.labels.dims(), &[3]);

        let mask = tensors.mask.to_vec2::<f32>().unwrap();
        assert_eq!(mask[0], vec![1.0, 1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut data = synthetic_split(10, 4);
        let original = data.clone();
        let mut rng = Rand32::new(7);
        shuffle(&mut data, &mut rng);
        assert_eq!(data.len(), original.len());
        for example in &original {
            assert!(data.contains(example));
        }
    }

    #[test]
    fn test_training_reduces_dev_loss() {
        let dir = std::env::temp_dir().join(format!("kiji_trainer_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let checkpoint = dir.join("best.safetensors");

        let mut trainer = tiny_trainer(checkpoint.clone());
        let mut train = synthetic_split(16, 4);
        let dev = synthetic_split(8, 4);

        let (_, loss_before) = trainer.evaluate(&dev).unwrap();
        trainer.train(&mut train, &dev).unwrap();
        let (_, loss_after) = trainer.evaluate(&dev).unwrap();

        assert!(loss_after.is_finite());
        assert!(loss_after < loss_before, "{loss_after} !< {loss_before}");
        assert!(checkpoint.exists());

        let report = trainer.test(&dev).unwrap();
        assert!(report.accuracy() >= 0.5);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_evaluate_empty_split_errors() {
        let dir = std::env::temp_dir().join(format!("kiji_trainer_empty_{}", std::process::id()));
        let trainer = tiny_trainer(dir.join("best.safetensors"));
        assert!(trainer.evaluate(&[]).is_err());
    }
}
