//! # Vocabulary
//!
//! Maps tokens to dense integer IDs. Built once from the training split:
//! tokens are counted, filtered by minimum frequency, stable-sorted by
//! descending frequency and truncated to a maximum size; the unknown and
//! padding tokens are appended last. Immutable after construction.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use tracing::debug;

use crate::error::Result;

/// Reserved token for out-of-vocabulary words.
pub const UNK: &str = "<UNK>";
/// Reserved token used to right-pad short sequences.
pub const PAD: &str = "<PAD>";

/// Token-to-ID vocabulary with `<UNK>` and `<PAD>` as its two largest IDs.
///
/// IDs are contiguous `u32` values in `[0, len)`; position in the ordered
/// token list is the ID, which keeps persisted vocabularies and embedding
/// matrices aligned by construction.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    tokens: Vec<String>,
    index: HashMap<String, u32>,
}

impl Vocabulary {
    /// Build a vocabulary from tokenized documents.
    ///
    /// Tokens occurring fewer than `min_freq` times are discarded. The
    /// survivors are ordered by descending frequency — ties keep the order
    /// in which tokens were first encountered, so identical input order
    /// always produces identical IDs — and truncated to `max_size` before
    /// the two reserved tokens are appended.
    ///
    /// If nothing survives filtering the vocabulary is exactly
    /// `[<UNK>, <PAD>]`.
    pub fn build<D, T>(documents: D, max_size: usize, min_freq: usize) -> Self
    where
        D: IntoIterator<Item = T>,
        T: AsRef<[String]>,
    {
        let mut counts: HashMap<String, usize> = HashMap::new();
        let mut first_seen: Vec<String> = Vec::new();

        for doc in documents {
            for token in doc.as_ref() {
                match counts.get_mut(token) {
                    Some(n) => *n += 1,
                    None => {
                        counts.insert(token.clone(), 1);
                        first_seen.push(token.clone());
                    }
                }
            }
        }

        let mut surviving: Vec<(String, usize)> = first_seen
            .into_iter()
            .filter_map(|token| {
                let n = counts[&token];
                (n >= min_freq).then_some((token, n))
            })
            .collect();
        // Stable sort: equal counts keep first-encounter order.
        surviving.sort_by(|a, b| b.1.cmp(&a.1));
        surviving.truncate(max_size);

        debug!(
            distinct = counts.len(),
            kept = surviving.len(),
            min_freq,
            max_size,
            "vocabulary built"
        );

        let mut tokens: Vec<String> = surviving.into_iter().map(|(t, _)| t).collect();
        tokens.push(UNK.to_string());
        tokens.push(PAD.to_string());

        Self::from_tokens(tokens)
    }

    /// Reconstruct a vocabulary from an ordered token list (position = ID).
    pub fn from_tokens(tokens: Vec<String>) -> Self {
        let index = tokens
            .iter()
            .enumerate()
            .map(|(id, token)| (token.clone(), id as u32))
            .collect();
        Self { tokens, index }
    }

    /// Number of entries, reserved tokens included.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True only for a vocabulary with no entries at all; a built
    /// vocabulary always carries at least the two reserved tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Look up a token's ID.
    pub fn get(&self, token: &str) -> Option<u32> {
        self.index.get(token).copied()
    }

    /// Look up a token's ID, falling back to the unknown-token ID.
    pub fn id_or_unk(&self, token: &str) -> u32 {
        self.get(token).unwrap_or_else(|| self.unk_id())
    }

    /// ID of the reserved unknown token (second largest).
    pub fn unk_id(&self) -> u32 {
        self.tokens.len() as u32 - 2
    }

    /// ID of the reserved padding token (largest).
    pub fn pad_id(&self) -> u32 {
        self.tokens.len() as u32 - 1
    }

    /// The token at `id`, if in range.
    pub fn token(&self, id: u32) -> Option<&str> {
        self.tokens.get(id as usize).map(String::as_str)
    }

    /// Tokens in ID order. Embedding matrices are aligned to this order.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Persist the vocabulary as a JSON array of tokens in ID order.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer(BufWriter::new(file), &self.tokens)?;
        Ok(())
    }

    /// Load a previously persisted vocabulary. The file is trusted as-is
    /// and never re-validated against current data.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let tokens: Vec<String> = serde_json::from_reader(BufReader::new(file))?;
        Ok(Self::from_tokens(tokens))
    }
}
