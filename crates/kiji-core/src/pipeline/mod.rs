pub mod batch;
pub mod encode;
pub mod normalize;
pub mod vocab;

pub use batch::{Batch, BatchIterator};
pub use encode::{EncodedExample, LabelIndex, SequenceEncoder};
pub use normalize::Normalizer;
pub use vocab::{Vocabulary, PAD, UNK};
