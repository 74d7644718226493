//! # Kiji Core
//!
//! The data pipeline behind the kiji topic classifier: text
//! normalization, vocabulary construction, fixed-length sequence encoding
//! and batching. Everything here is synchronous and in-memory; the
//! training loop that consumes the batches lives in `kiji-trainer`.
//!
//! ## Quick Start
//!
//! ```rust
//! use kiji_core::pipeline::{BatchIterator, Normalizer, SequenceEncoder, Vocabulary};
//!
//! let norm = Normalizer::new();
//! let docs: Vec<Vec<String>> = ["Stocks can't rally", "Stocks slide again"]
//!     .iter()
//!     .map(|t| norm.tokenize(t))
//!     .collect();
//!
//! let vocab = Vocabulary::build(&docs, 10_000, 1);
//! let encoder = SequenceEncoder::new(&vocab, 8);
//! let (ids, seq_len) = encoder.encode(&docs[0]);
//!
//! assert_eq!(ids.len(), 8);
//! assert_eq!(seq_len, 3); // "stocks cannot rally"
//! ```
pub mod error;
pub mod pipeline;

// Re-export primary API
pub use error::{KijiError, Result};
pub use pipeline::{
    Batch, BatchIterator, EncodedExample, LabelIndex, Normalizer, SequenceEncoder, Vocabulary,
    PAD, UNK,
};
