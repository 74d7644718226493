//! # Sequence Encoder
//!
//! Turns token sequences into fixed-length ID sequences: truncate or
//! right-pad to the configured pad size, map out-of-vocabulary tokens to
//! `<UNK>`, and record the pre-padding length for downstream masking.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{KijiError, Result};
use crate::pipeline::vocab::Vocabulary;

/// A single document after encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedExample {
    /// Token IDs, exactly `pad_size` long.
    pub input_ids: Vec<u32>,
    /// Class-label index into the reference [`LabelIndex`].
    pub label: usize,
    /// Pre-padding token count, capped at `pad_size`. Used for masking.
    pub seq_len: usize,
}

/// Sorted, deduplicated class-label list with index lookup.
///
/// Built once from the training split and reused verbatim for dev/test so
/// class IDs stay aligned across splits. Labels absent from it are
/// rejected at encode time.
#[derive(Debug, Clone)]
pub struct LabelIndex {
    labels: Vec<String>,
}

impl LabelIndex {
    /// Collect the distinct labels from an iterator, sorted lexically.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> =
            labels.into_iter().map(|l| l.as_ref().to_string()).collect();
        Self {
            labels: distinct.into_iter().collect(),
        }
    }

    /// Index of `label`, or `UnknownLabel` if it was never seen at build time.
    pub fn get(&self, label: &str) -> Result<usize> {
        self.labels
            .binary_search_by(|probe| probe.as_str().cmp(label))
            .map_err(|_| KijiError::UnknownLabel {
                label: label.to_string(),
            })
    }

    /// Label name for a class index.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// All label names in index order.
    pub fn names(&self) -> &[String] {
        &self.labels
    }

    /// Number of distinct classes.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True when no labels were collected.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Encoder mapping token sequences onto a fixed vocabulary and pad size.
#[derive(Debug, Clone)]
pub struct SequenceEncoder<'a> {
    vocab: &'a Vocabulary,
    pad_size: usize,
}

impl<'a> SequenceEncoder<'a> {
    /// Create an encoder over `vocab` producing sequences of `pad_size` IDs.
    pub fn new(vocab: &'a Vocabulary, pad_size: usize) -> Self {
        Self { vocab, pad_size }
    }

    /// The fixed output length.
    pub fn pad_size(&self) -> usize {
        self.pad_size
    }

    /// Encode a token sequence to exactly `pad_size` IDs plus its
    /// pre-padding length.
    ///
    /// Longer sequences are truncated (length = `pad_size`); shorter ones
    /// are right-padded with `<PAD>`. Unknown tokens become `<UNK>`.
    pub fn encode(&self, tokens: &[String]) -> (Vec<u32>, usize) {
        let seq_len = tokens.len().min(self.pad_size);
        let mut input_ids = Vec::with_capacity(self.pad_size);
        for token in &tokens[..seq_len] {
            input_ids.push(self.vocab.id_or_unk(token));
        }
        input_ids.resize(self.pad_size, self.vocab.pad_id());
        (input_ids, seq_len)
    }

    /// Encode a document together with its class label.
    ///
    /// # Errors
    ///
    /// `UnknownLabel` when `label` is not in `labels` — an unseen class at
    /// encode time means the splits disagree and must not be renumbered
    /// silently.
    pub fn encode_example(
        &self,
        tokens: &[String],
        label: &str,
        labels: &LabelIndex,
    ) -> Result<EncodedExample> {
        let (input_ids, seq_len) = self.encode(tokens);
        Ok(EncodedExample {
            input_ids,
            label: labels.get(label)?,
            seq_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn small_vocab() -> Vocabulary {
        // a:0 b:1 c:2 UNK:3 PAD:4
        Vocabulary::build([toks(&["a", "a", "a", "b", "b", "c"])], 10, 1)
    }

    #[test]
    fn test_truncates_long_sequence() {
        let vocab = small_vocab();
        let enc = SequenceEncoder::new(&vocab, 2);
        let (ids, len) = enc.encode(&toks(&["a", "b", "c"]));
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_pads_short_sequence() {
        let vocab = small_vocab();
        let enc = SequenceEncoder::new(&vocab, 3);
        let (ids, len) = enc.encode(&toks(&["a"]));
        assert_eq!(ids, vec![0, vocab.pad_id(), vocab.pad_id()]);
        assert_eq!(len, 1);
    }

    #[test]
    fn test_exact_length() {
        let vocab = small_vocab();
        let enc = SequenceEncoder::new(&vocab, 3);
        let (ids, len) = enc.encode(&toks(&["a", "b", "c"]));
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(len, 3);
    }

    #[test]
    fn test_unknown_tokens_map_to_unk() {
        let vocab = small_vocab();
        let enc = SequenceEncoder::new(&vocab, 2);
        let (ids, _) = enc.encode(&toks(&["zzz", "a"]));
        assert_eq!(ids, vec![vocab.unk_id(), 0]);
    }

    #[test]
    fn test_empty_document() {
        let vocab = small_vocab();
        let enc = SequenceEncoder::new(&vocab, 4);
        let (ids, len) = enc.encode(&[]);
        assert_eq!(ids, vec![vocab.pad_id(); 4]);
        assert_eq!(len, 0);
    }

    #[test]
    fn test_output_length_is_always_pad_size() {
        let vocab = small_vocab();
        let enc = SequenceEncoder::new(&vocab, 5);
        for n in 0..12 {
            let tokens: Vec<String> = (0..n).map(|i| format!("t{i}")).collect();
            let (ids, len) = enc.encode(&tokens);
            assert_eq!(ids.len(), 5);
            assert!(len <= 5);
        }
    }

    #[test]
    fn test_label_index_sorted_distinct() {
        let idx = LabelIndex::from_labels(["tech", "sports", "tech", "health"]);
        assert_eq!(idx.len(), 3);
        assert_eq!(idx.get("health").unwrap(), 0);
        assert_eq!(idx.get("sports").unwrap(), 1);
        assert_eq!(idx.get("tech").unwrap(), 2);
        assert_eq!(idx.name(1), Some("sports"));
    }

    #[test]
    fn test_unknown_label_rejected() {
        let vocab = small_vocab();
        let idx = LabelIndex::from_labels(["tech", "sports"]);
        let enc = SequenceEncoder::new(&vocab, 2);
        let err = enc
            .encode_example(&toks(&["a"]), "finance", &idx)
            .unwrap_err();
        assert!(matches!(err, KijiError::UnknownLabel { .. }));
    }

    #[test]
    fn test_encode_example() {
        let vocab = small_vocab();
        let idx = LabelIndex::from_labels(["tech", "sports"]);
        let enc = SequenceEncoder::new(&vocab, 3);
        let ex = enc
            .encode_example(&toks(&["a", "b"]), "tech", &idx)
            .unwrap();
        assert_eq!(ex.input_ids, vec![0, 1, vocab.pad_id()]);
        assert_eq!(ex.label, 1);
        assert_eq!(ex.seq_len, 2);
    }
}
