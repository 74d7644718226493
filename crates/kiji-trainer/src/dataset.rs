//! Dataset assembly for the topic classifier.
//!
//! Loads delimited label/text files, builds or reloads the vocabulary,
//! and encodes every split against the training split's label index.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use kiji_core::pipeline::{EncodedExample, LabelIndex, Normalizer, SequenceEncoder, Vocabulary};
use kiji_core::{KijiError, Result};

/// One raw row of a split file.
#[derive(Debug, Clone)]
pub struct Record {
    pub label: String,
    pub text: String,
}

/// Paths and pipeline parameters for one dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Training split, also the vocabulary and label-index source.
    pub train_path: PathBuf,
    /// Dev split used for periodic evaluation.
    pub dev_path: PathBuf,
    /// Held-out test split.
    pub test_path: PathBuf,
    /// Vocabulary file; loaded as-is when present, built and written when absent.
    pub vocab_path: PathBuf,
    /// Field delimiter. Fields must not contain it; the reader is line-based.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Header name of the label column.
    #[serde(default = "default_label_column")]
    pub label_column: String,
    /// Header name of the text column.
    #[serde(default = "default_text_column")]
    pub text_column: String,
    /// Fixed sequence length every document is truncated/padded to.
    #[serde(default = "default_pad_size")]
    pub pad_size: usize,
    /// Vocabulary size cap, reserved tokens excluded.
    #[serde(default = "default_max_vocab_size")]
    pub max_vocab_size: usize,
    /// Minimum token frequency for vocabulary membership.
    #[serde(default = "default_min_freq")]
    pub min_freq: usize,
}

fn default_delimiter() -> char {
    ';'
}

fn default_label_column() -> String {
    "label".to_string()
}

fn default_text_column() -> String {
    "text".to_string()
}

fn default_pad_size() -> usize {
    32
}

fn default_max_vocab_size() -> usize {
    10_000
}

fn default_min_freq() -> usize {
    1
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            train_path: PathBuf::from("data/train.csv"),
            dev_path: PathBuf::from("data/val.csv"),
            test_path: PathBuf::from("data/test.csv"),
            vocab_path: PathBuf::from("data/vocab.json"),
            delimiter: default_delimiter(),
            label_column: default_label_column(),
            text_column: default_text_column(),
            pad_size: default_pad_size(),
            max_vocab_size: default_max_vocab_size(),
            min_freq: default_min_freq(),
        }
    }
}

/// Everything the training loop needs, fully encoded.
#[derive(Debug, Clone)]
pub struct DatasetBundle {
    pub vocab: Vocabulary,
    pub labels: LabelIndex,
    pub train: Vec<EncodedExample>,
    pub dev: Vec<EncodedExample>,
    pub test: Vec<EncodedExample>,
}

/// Read label/text records from a delimited reader with a header row.
///
/// A row missing its text field yields an empty text; a row missing its
/// label field is malformed. Blank lines are skipped.
pub fn read_records<R: BufRead>(
    reader: R,
    delimiter: char,
    label_column: &str,
    text_column: &str,
) -> Result<Vec<Record>> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Ok(Vec::new()),
    };
    let columns: Vec<&str> = header
        .trim_start_matches('\u{feff}')
        .split(delimiter)
        .map(str::trim)
        .collect();

    let column_index = |name: &str| -> Result<usize> {
        columns
            .iter()
            .position(|c| *c == name)
            .ok_or_else(|| KijiError::MissingColumn {
                column: name.to_string(),
                header: header.clone(),
            })
    };
    let label_idx = column_index(label_column)?;
    let text_idx = column_index(text_column)?;

    let mut records = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(delimiter).collect();
        let label = fields
            .get(label_idx)
            .ok_or_else(|| KijiError::MalformedRecord {
                line: line_no + 2,
                expected: columns.len(),
                got: fields.len(),
            })?;
        let text = fields.get(text_idx).copied().unwrap_or("");
        records.push(Record {
            label: label.trim().to_string(),
            text: text.to_string(),
        });
    }
    Ok(records)
}

/// Read records from a file path.
pub fn read_records_from_path<P: AsRef<Path>>(path: P, config: &DatasetConfig) -> Result<Vec<Record>> {
    let file = File::open(path)?;
    read_records(
        BufReader::new(file),
        config.delimiter,
        &config.label_column,
        &config.text_column,
    )
}

/// Load the persisted vocabulary, or build it from the tokenized training
/// documents and persist it.
///
/// A present vocabulary file wins unconditionally; it is never rebuilt or
/// checked against the current data.
pub fn load_or_build_vocab(
    config: &DatasetConfig,
    train_docs: &[Vec<String>],
) -> Result<Vocabulary> {
    if config.vocab_path.exists() {
        let vocab = Vocabulary::load(&config.vocab_path)?;
        info!(
            path = %config.vocab_path.display(),
            size = vocab.len(),
            "loaded existing vocabulary"
        );
        return Ok(vocab);
    }
    let vocab = Vocabulary::build(train_docs, config.max_vocab_size, config.min_freq);
    vocab.save(&config.vocab_path)?;
    info!(
        path = %config.vocab_path.display(),
        size = vocab.len(),
        "built and saved vocabulary"
    );
    Ok(vocab)
}

/// Encode one split's tokenized documents against the shared vocabulary
/// and the training split's label index.
pub fn encode_split(
    name: &str,
    docs: &[Vec<String>],
    records: &[Record],
    encoder: &SequenceEncoder<'_>,
    labels: &LabelIndex,
) -> Result<Vec<EncodedExample>> {
    let mut examples = Vec::with_capacity(records.len());
    let mut token_count = 0usize;
    for (tokens, record) in docs.iter().zip(records) {
        token_count += tokens.len();
        examples.push(encoder.encode_example(tokens, &record.label, labels)?);
    }
    let avg = if examples.is_empty() {
        0.0
    } else {
        token_count as f64 / examples.len() as f64
    };
    info!(
        split = name,
        documents = examples.len(),
        tokens = token_count,
        avg_tokens = format!("{avg:.1}"),
        "split encoded"
    );
    Ok(examples)
}

/// Build the full dataset: read the three splits, load-or-build the
/// vocabulary from train, derive the label index from train, and encode
/// everything.
///
/// # Errors
///
/// Fails on unreadable files, a missing label/text column, or a dev/test
/// label that never appears in the training split.
pub fn build_dataset(config: &DatasetConfig) -> Result<DatasetBundle> {
    let normalizer = Normalizer::new();

    let train_records = read_records_from_path(&config.train_path, config)?;
    let dev_records = read_records_from_path(&config.dev_path, config)?;
    let test_records = read_records_from_path(&config.test_path, config)?;

    let tokenize_all = |records: &[Record]| -> Vec<Vec<String>> {
        records.iter().map(|r| normalizer.tokenize(&r.text)).collect()
    };
    let train_docs = tokenize_all(&train_records);
    let dev_docs = tokenize_all(&dev_records);
    let test_docs = tokenize_all(&test_records);

    let vocab = load_or_build_vocab(config, &train_docs)?;
    let labels = LabelIndex::from_labels(train_records.iter().map(|r| r.label.as_str()));
    info!(classes = labels.len(), names = ?labels.names(), "label index");

    let encoder = SequenceEncoder::new(&vocab, config.pad_size);
    let train = encode_split("train", &train_docs, &train_records, &encoder, &labels)?;
    let dev = encode_split("dev", &dev_docs, &dev_records, &encoder, &labels)?;
    let test = encode_split("test", &test_docs, &test_records, &encoder, &labels)?;

    Ok(DatasetBundle {
        vocab,
        labels,
        train,
        dev,
        test,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
label;text
SPORTS;City win the derby
TECH;New chip can't keep up
SPORTS;";

    fn sample_config(dir: &Path) -> DatasetConfig {
        DatasetConfig {
            train_path: dir.join("train.csv"),
            dev_path: dir.join("val.csv"),
            test_path: dir.join("test.csv"),
            vocab_path: dir.join("vocab.json"),
            pad_size: 6,
            ..DatasetConfig::default()
        }
    }

    #[test]
    fn test_read_records() {
        let records =
            read_records(Cursor::new(SAMPLE), ';', "label", "text").unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].label, "SPORTS");
        assert_eq!(records[0].text, "City win the derby");
        // Missing text field is an empty string, not an error.
        assert_eq!(records[2].text, "");
    }

    #[test]
    fn test_read_records_missing_column() {
        let err = read_records(Cursor::new(SAMPLE), ';', "label", "title").unwrap_err();
        assert!(matches!(err, KijiError::MissingColumn { .. }));
    }

    #[test]
    fn test_read_records_missing_label_field() {
        let data = "text;label\nonly one field";
        let err = read_records(Cursor::new(data), ';', "label", "text").unwrap_err();
        assert!(matches!(err, KijiError::MalformedRecord { .. }));
    }

    #[test]
    fn test_read_records_empty_file() {
        let records = read_records(Cursor::new(""), ';', "label", "text").unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_build_dataset_round_trip() {
        let dir = std::env::temp_dir().join(format!("kiji_dataset_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = sample_config(&dir);

        std::fs::write(&config.train_path, SAMPLE).unwrap();
        std::fs::write(&config.dev_path, "label;text\nTECH;chip shortage eases").unwrap();
        std::fs::write(&config.test_path, "label;text\nSPORTS;cup final tonight").unwrap();

        let bundle = build_dataset(&config).unwrap();
        assert_eq!(bundle.labels.len(), 2);
        assert_eq!(bundle.train.len(), 3);
        assert_eq!(bundle.dev.len(), 1);
        assert_eq!(bundle.test.len(), 1);
        assert!(bundle.train.iter().all(|ex| ex.input_ids.len() == 6));
        // Vocabulary was persisted for reuse.
        assert!(config.vocab_path.exists());

        // A second build must load the persisted vocabulary unchanged.
        let rebuilt = build_dataset(&config).unwrap();
        assert_eq!(rebuilt.vocab.len(), bundle.vocab.len());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_build_dataset_rejects_unseen_label() {
        let dir = std::env::temp_dir().join(format!("kiji_dataset_bad_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let config = sample_config(&dir);

        std::fs::write(&config.train_path, SAMPLE).unwrap();
        std::fs::write(&config.dev_path, "label;text\nWEATHER;storm inbound").unwrap();
        std::fs::write(&config.test_path, "label;text\nSPORTS;cup final tonight").unwrap();

        let err = build_dataset(&config).unwrap_err();
        assert!(matches!(err, KijiError::UnknownLabel { .. }));

        std::fs::remove_dir_all(&dir).ok();
    }
}
