use std::path::PathBuf;

use clap::Parser;

use kiji_trainer::dataset::DatasetConfig;
use kiji_trainer::trainer::{run_training, TrainConfig};

/// Train the topic classifier end to end: assemble the dataset, train
/// with periodic dev evaluation and early stopping, report on test.
#[derive(Parser, Debug)]
#[command(name = "train", version, about)]
struct Args {
    /// Training split file.
    #[arg(long, default_value = "data/train.csv")]
    train: PathBuf,

    /// Dev split file.
    #[arg(long, default_value = "data/val.csv")]
    dev: PathBuf,

    /// Test split file.
    #[arg(long, default_value = "data/test.csv")]
    test: PathBuf,

    /// Vocabulary file; built from the training split when absent.
    #[arg(long, default_value = "data/vocab.json")]
    vocab: PathBuf,

    /// Field delimiter of the split files.
    #[arg(long, default_value_t = ';')]
    delimiter: char,

    /// Fixed sequence length.
    #[arg(long, default_value_t = 32)]
    pad_size: usize,

    /// Vocabulary size cap (reserved tokens excluded).
    #[arg(long, default_value_t = 10_000)]
    max_vocab_size: usize,

    /// Minimum token frequency for vocabulary membership.
    #[arg(long, default_value_t = 1)]
    min_freq: usize,

    /// Epochs.
    #[arg(long, default_value_t = 20)]
    epochs: usize,

    /// Batch size.
    #[arg(long, default_value_t = 128)]
    batch_size: usize,

    /// AdamW learning rate.
    #[arg(long, default_value_t = 1e-3)]
    learning_rate: f64,

    /// Dev evaluation cadence, in batches.
    #[arg(long, default_value_t = 100)]
    eval_interval: usize,

    /// Early-stop patience, in batches without dev improvement.
    #[arg(long, default_value_t = 1000)]
    require_improvement: usize,

    /// Best-checkpoint output path.
    #[arg(long, default_value = "models/best.safetensors")]
    checkpoint: PathBuf,

    /// Optional pretrained embedding matrix (safetensors from
    /// extract-vectors).
    #[arg(long)]
    embeddings: Option<PathBuf>,

    /// Embedding dimension.
    #[arg(long, default_value_t = 300)]
    embed_dim: usize,

    /// Hidden layer width.
    #[arg(long, default_value_t = 128)]
    hidden_dim: usize,

    /// Shuffle seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

fn main() {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    let dataset_config = DatasetConfig {
        train_path: args.train,
        dev_path: args.dev,
        test_path: args.test,
        vocab_path: args.vocab,
        delimiter: args.delimiter,
        pad_size: args.pad_size,
        max_vocab_size: args.max_vocab_size,
        min_freq: args.min_freq,
        ..DatasetConfig::default()
    };
    let train_config = TrainConfig {
        epochs: args.epochs,
        batch_size: args.batch_size,
        learning_rate: args.learning_rate,
        eval_interval: args.eval_interval,
        require_improvement: args.require_improvement,
        checkpoint_path: args.checkpoint,
        embedding_path: args.embeddings,
        embed_dim: args.embed_dim,
        hidden_dim: args.hidden_dim,
        seed: args.seed,
    };

    match run_training(&dataset_config, train_config) {
        Ok(report) => println!("{report}"),
        Err(e) => {
            eprintln!("Training failed: {e}");
            std::process::exit(1);
        }
    }
}
