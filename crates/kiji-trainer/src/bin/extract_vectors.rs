use std::collections::HashMap;
use std::path::PathBuf;

use candle_core::{Device, Tensor};
use clap::Parser;
use tracing::info;

use kiji_core::Vocabulary;
use kiji_trainer::embedding::{embedding_matrix, read_word_vectors_from_path};

/// Align pretrained word vectors with the vocabulary and save the
/// embedding matrix as safetensors.
#[derive(Parser, Debug)]
#[command(name = "extract-vectors", version, about)]
struct Args {
    /// Vocabulary file written by a previous training run.
    #[arg(long, default_value = "data/vocab.json")]
    vocab: PathBuf,

    /// Pretrained vector file (GloVe .txt or fastText .vec, text format).
    #[arg(long)]
    vectors: PathBuf,

    /// Vector dimension.
    #[arg(long, default_value_t = 300)]
    dim: usize,

    /// Output safetensors file (tensor key: `embeddings`).
    #[arg(short, long, default_value = "data/embeddings.safetensors")]
    output: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let vocab = Vocabulary::load(&args.vocab)?;
    info!(size = vocab.len(), vocab = %args.vocab.display(), "vocabulary loaded");

    let vectors = read_word_vectors_from_path(&args.vectors, args.dim)?;
    info!(words = vectors.len(), file = %args.vectors.display(), "pretrained vectors loaded");

    let (matrix, hits) = embedding_matrix(&vocab, &vectors, args.dim)?;
    let tensor = Tensor::from_vec(matrix, (vocab.len(), args.dim), &Device::Cpu)?;

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tensors = HashMap::from([("embeddings".to_string(), tensor)]);
    candle_core::safetensors::save(&tensors, &args.output)?;

    info!(
        hits,
        vocab_size = vocab.len(),
        output = %args.output.display(),
        "embedding matrix saved"
    );
    Ok(())
}
