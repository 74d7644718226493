//! # Kiji Trainer
//!
//! Dataset assembly and the training workflow for the kiji topic
//! classifier: stratified splitting, vocabulary load-or-build, pretrained
//! word-vector extraction, and a candle training loop with checkpointing,
//! early stopping and a classification report.

pub mod dataset;
pub mod embedding;
pub mod metrics;
pub mod model;
pub mod split;
pub mod trainer;

pub use dataset::{build_dataset, DatasetBundle, DatasetConfig, Record};
pub use metrics::ClassificationReport;
pub use model::{ModelConfig, TopicClassifier};
pub use split::{stratified_split, SplitRatios};
pub use trainer::{run_training, TrainConfig, Trainer};
