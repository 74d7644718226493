//! # Batch Iterator
//!
//! Groups encoded examples into fixed-size batches of parallel arrays.
//! The final batch may be shorter; nothing is dropped. The iterator is a
//! single-consumer forward cursor that resets on exhaustion, so one
//! instance can be walked once per epoch.

use crate::pipeline::encode::EncodedExample;

/// A contiguous slice of encoded examples as three parallel arrays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    /// Token-ID matrix, one row per example, every row `pad_size` long.
    pub input_ids: Vec<Vec<u32>>,
    /// Class-label vector, aligned with `input_ids` rows.
    pub labels: Vec<usize>,
    /// Pre-padding length vector, aligned with `input_ids` rows.
    pub seq_lens: Vec<usize>,
}

impl Batch {
    /// Assemble a batch from a slice of examples.
    pub fn from_examples(examples: &[EncodedExample]) -> Self {
        let mut input_ids = Vec::with_capacity(examples.len());
        let mut labels = Vec::with_capacity(examples.len());
        let mut seq_lens = Vec::with_capacity(examples.len());
        for ex in examples {
            input_ids.push(ex.input_ids.clone());
            labels.push(ex.label);
            seq_lens.push(ex.seq_len);
        }
        Self {
            input_ids,
            labels,
            seq_lens,
        }
    }

    /// Number of examples in this batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True for a batch with no rows.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Forward-only batch cursor over a fixed example list.
///
/// Yields `ceil(N / batch_size)` batches per pass; the remainder forms one
/// shorter final batch. Returning `None` resets the cursor, so the same
/// iterator can be re-used for the next epoch. Not safe for concurrent
/// advance calls — callers serialize access.
#[derive(Debug, Clone)]
pub struct BatchIterator<'a> {
    data: &'a [EncodedExample],
    batch_size: usize,
    cursor: usize,
}

impl<'a> BatchIterator<'a> {
    /// Create an iterator yielding batches of `batch_size` examples.
    ///
    /// `batch_size` must be non-zero.
    pub fn new(data: &'a [EncodedExample], batch_size: usize) -> Self {
        assert!(batch_size > 0, "batch_size must be non-zero");
        Self {
            data,
            batch_size,
            cursor: 0,
        }
    }

    /// Batches per full pass: `ceil(N / batch_size)`.
    pub fn num_batches(&self) -> usize {
        self.data.len().div_ceil(self.batch_size)
    }
}

impl Iterator for BatchIterator<'_> {
    type Item = Batch;

    fn next(&mut self) -> Option<Batch> {
        if self.cursor >= self.data.len() {
            // Exhausted: rewind so the next pass starts from the top.
            self.cursor = 0;
            return None;
        }
        let end = (self.cursor + self.batch_size).min(self.data.len());
        let batch = Batch::from_examples(&self.data[self.cursor..end]);
        self.cursor = end;
        Some(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn examples(n: usize) -> Vec<EncodedExample> {
        (0..n)
            .map(|i| EncodedExample {
                input_ids: vec![i as u32, 0],
                label: i % 3,
                seq_len: 1,
            })
            .collect()
    }

    #[test]
    fn test_even_split() {
        let data = examples(6);
        let iter = BatchIterator::new(&data, 2);
        assert_eq!(iter.num_batches(), 3);
        let batches: Vec<Batch> = iter.collect();
        assert_eq!(batches.len(), 3);
        assert!(batches.iter().all(|b| b.len() == 2));
    }

    #[test]
    fn test_residue_batch() {
        let data = examples(7);
        let iter = BatchIterator::new(&data, 3);
        assert_eq!(iter.num_batches(), 3);
        let batches: Vec<Batch> = iter.collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].len(), 3);
        assert_eq!(batches[1].len(), 3);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn test_fewer_examples_than_batch_size() {
        let data = examples(2);
        let iter = BatchIterator::new(&data, 16);
        assert_eq!(iter.num_batches(), 1);
        let batches: Vec<Batch> = iter.collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
    }

    #[test]
    fn test_empty_input() {
        let data = examples(0);
        let mut iter = BatchIterator::new(&data, 4);
        assert_eq!(iter.num_batches(), 0);
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_concatenation_round_trips() {
        let data = examples(10);
        let iter = BatchIterator::new(&data, 4);

        let mut rebuilt = Vec::new();
        for batch in iter {
            for ((ids, label), seq_len) in batch
                .input_ids
                .into_iter()
                .zip(batch.labels)
                .zip(batch.seq_lens)
            {
                rebuilt.push(EncodedExample {
                    input_ids: ids,
                    label,
                    seq_len,
                });
            }
        }
        assert_eq!(rebuilt, data);
    }

    #[test]
    fn test_restartable_after_exhaustion() {
        let data = examples(5);
        let mut iter = BatchIterator::new(&data, 2);

        let first_pass: Vec<Batch> = iter.by_ref().collect();
        assert_eq!(first_pass.len(), 3);

        // collect() consumed the trailing None, which rewound the cursor.
        let second_pass: Vec<Batch> = iter.by_ref().collect();
        assert_eq!(second_pass, first_pass);
    }

    #[test]
    #[should_panic(expected = "batch_size must be non-zero")]
    fn test_zero_batch_size_panics() {
        let data = examples(1);
        let _ = BatchIterator::new(&data, 0);
    }
}
