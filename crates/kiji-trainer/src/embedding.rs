//! Pretrained word-vector extraction.
//!
//! Parses whitespace-separated text vector files (GloVe `.txt`, fastText
//! `.vec`) and assembles an embedding matrix aligned with the vocabulary's
//! ID order. Tokens without a pretrained vector get the zero vector.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{bail, Context};
use tracing::{info, warn};

use kiji_core::Vocabulary;

/// Parse a text-format vector file into a word → vector map.
///
/// Lines whose trailing fields do not all parse as floats, or whose
/// dimension disagrees with `dim`, are skipped. A leading fastText
/// `count dim` header line is skipped the same way.
pub fn read_word_vectors<R: BufRead>(reader: R, dim: usize) -> anyhow::Result<HashMap<String, Vec<f32>>> {
    let mut vectors = HashMap::new();
    let mut skipped = 0usize;

    for line in reader.lines() {
        let line = line?;
        let mut fields = line.split_whitespace();
        let Some(word) = fields.next() else {
            continue;
        };
        let values: std::result::Result<Vec<f32>, _> = fields.map(str::parse::<f32>).collect();
        match values {
            Ok(vector) if vector.len() == dim => {
                vectors.insert(word.to_string(), vector);
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped malformed or off-dimension vector lines");
    }
    Ok(vectors)
}

/// Load word vectors from a file path.
pub fn read_word_vectors_from_path<P: AsRef<Path>>(
    path: P,
    dim: usize,
) -> anyhow::Result<HashMap<String, Vec<f32>>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    read_word_vectors(BufReader::new(file), dim)
}

/// Build a `vocab.len() × dim` row-major embedding matrix aligned with the
/// vocabulary's ID order. Out-of-file tokens (the reserved tokens
/// included) get zero rows.
///
/// Returns the matrix and the number of vocabulary tokens that were found
/// in the pretrained file.
pub fn embedding_matrix(
    vocab: &Vocabulary,
    vectors: &HashMap<String, Vec<f32>>,
    dim: usize,
) -> anyhow::Result<(Vec<f32>, usize)> {
    if dim == 0 {
        bail!("embedding dimension must be non-zero");
    }

    let mut matrix = Vec::with_capacity(vocab.len() * dim);
    let mut hits = 0usize;
    for token in vocab.tokens() {
        match vectors.get(token) {
            Some(vector) => {
                matrix.extend_from_slice(vector);
                hits += 1;
            }
            None => matrix.extend(std::iter::repeat_n(0.0f32, dim)),
        }
    }

    info!(
        vocab_size = vocab.len(),
        hits,
        coverage = format!("{:.1}%", 100.0 * hits as f64 / vocab.len().max(1) as f64),
        "embedding matrix assembled"
    );
    Ok((matrix, hits))
}
